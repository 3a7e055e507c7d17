use ssz::MerkleError;

use crate::{
    bellatrix::primitives::Transaction,
    capella::containers::Withdrawal,
    collections,
    deneb::containers::{ExecutionPayload, ExecutionPayloadHeader},
};

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
            blob_gas_used,
            excess_blob_gas,
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
            blob_gas_used,
            excess_blob_gas,
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
            blob_gas_used,
            excess_blob_gas,
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
            blob_gas_used,
            excess_blob_gas,
        }
    }
}
