use crate::phase0::primitives::{ExecutionBlockHash, H256};

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Eth1Data {
    pub deposit_root: H256,
    pub deposit_count: u64,
    pub block_hash: ExecutionBlockHash,
}
