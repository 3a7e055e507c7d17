use ssz::{MerkleError, SszHash, BYTES_PER_CHUNK};

use crate::{
    bellatrix::{
        consts::MAX_BYTES_PER_TRANSACTION,
        containers::{ExecutionPayload, ExecutionPayloadHeader},
        primitives::Transaction,
    },
    collections,
    phase0::primitives::H256,
};

const TRANSACTION_CHUNK_LIMIT: u64 = MAX_BYTES_PER_TRANSACTION / BYTES_PER_CHUNK as u64;

impl SszHash for Transaction {
    fn hash_tree_root(&self) -> H256 {
        ssz::mix_in_length(
            ssz::merkleize_bytes(self, TRANSACTION_CHUNK_LIMIT),
            self.len(),
        )
    }
}

impl ExecutionPayload {
    pub fn to_header(&self) -> Result<ExecutionPayloadHeader, MerkleError> {
        let Self {
            parent_hash,
            fee_recipient,
            state_root,
            receipts_root,
            logs_bloom,
            prev_randao,
            block_number,
            gas_limit,
            gas_used,
            timestamp,
            ref extra_data,
            base_fee_per_gas,
            block_hash,
            ref transactions,
        } = *self;

        Ok(ExecutionPayloadHeader {
            parent_hash,
            fee_recipient,
            state_root,
            receipts_root,
            logs_bloom,
            prev_randao,
            block_number,
            gas_limit,
            gas_used,
            timestamp,
            extra_data: extra_data.clone(),
            base_fee_per_gas,
            block_hash,
            transactions_root: collections::transactions_root(transactions)?,
        })
    }
}

impl ExecutionPayloadHeader {
    #[must_use]
    pub fn with_transactions(self, transactions: Vec<Transaction>) -> ExecutionPayload {
        let Self {
            parent_hash,
            fee_recipient,
            state_root,
            receipts_root,
            logs_bloom,
            prev_randao,
            block_number,
            gas_limit,
            gas_used,
            timestamp,
            extra_data,
            base_fee_per_gas,
            block_hash,
            transactions_root: _,
        } = self;

        ExecutionPayload {
            parent_hash,
            fee_recipient,
            state_root,
            receipts_root,
            logs_bloom,
            prev_randao,
            block_number,
            gas_limit,
            gas_used,
            timestamp,
            extra_data,
            base_fee_per_gas,
            block_hash,
            transactions,
        }
    }
}
