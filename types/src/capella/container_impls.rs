use ssz::{MerkleError, SszHash};

use crate::{
    bellatrix::primitives::Transaction,
    capella::containers::{ExecutionPayload, ExecutionPayloadHeader, Withdrawal},
    collections,
    phase0::primitives::H256,
};

impl SszHash for Withdrawal {
    fn hash_tree_root(&self) -> H256 {
        let fields = [
            self.index.hash_tree_root(),
            self.validator_index.hash_tree_root(),
            self.address.hash_tree_root(),
            self.amount.hash_tree_root(),
        ];

        ssz::merkleize_fixed(&fields, 4)
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
            ref withdrawals,
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
            withdrawals_root: collections::withdrawals_root(withdrawals)?,
        })
    }
}

impl ExecutionPayloadHeader {
    #[must_use]
    pub fn with_body(
        self,
        transactions: Vec<Transaction>,
        withdrawals: Vec<Withdrawal>,
    ) -> ExecutionPayload {
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
            withdrawals_root: _,
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
            withdrawals,
        }
    }
}
