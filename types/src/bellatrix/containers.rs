use crate::{
    bellatrix::primitives::{Gas, LogsBloom, Transaction, Wei},
    phase0::primitives::{
        ExecutionAddress, ExecutionBlockHash, ExecutionBlockNumber, UnixSeconds, H256,
    },
};

#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct ExecutionPayload {
    pub parent_hash: ExecutionBlockHash,
    pub fee_recipient: ExecutionAddress,
    pub state_root: H256,
    pub receipts_root: H256,
    pub logs_bloom: LogsBloom,
    pub prev_randao: H256,
    pub block_number: ExecutionBlockNumber,
    pub gas_limit: Gas,
    pub gas_used: Gas,
    pub timestamp: UnixSeconds,
    pub extra_data: Vec<u8>,
    pub base_fee_per_gas: Wei,
    pub block_hash: ExecutionBlockHash,
    pub transactions: Vec<Transaction>,
}

#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct ExecutionPayloadHeader {
    pub parent_hash: ExecutionBlockHash,
    pub fee_recipient: ExecutionAddress,
    pub state_root: H256,
    pub receipts_root: H256,
    pub logs_bloom: LogsBloom,
    pub prev_randao: H256,
    pub block_number: ExecutionBlockNumber,
    pub gas_limit: Gas,
    pub gas_used: Gas,
    pub timestamp: UnixSeconds,
    pub extra_data: Vec<u8>,
    pub base_fee_per_gas: Wei,
    pub block_hash: ExecutionBlockHash,
    pub transactions_root: H256,
}
