use ethereum_types::H64;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use types::{
    bellatrix::{
        containers::ExecutionPayload as BellatrixExecutionPayload,
        primitives::{Gas, LogsBloom, Transaction, Wei},
    },
    capella::containers::{ExecutionPayload as CapellaExecutionPayload, Withdrawal},
    combined::ExecutionPayload,
    deneb::{
        containers::ExecutionPayload as DenebExecutionPayload,
        primitives::{Blob, KzgCommitment, KzgProof},
    },
    nonstandard::Phase,
    phase0::primitives::{
        ExecutionAddress, ExecutionBlockHash, ExecutionBlockNumber, Gwei, UnixSeconds,
        ValidatorIndex, H256,
    },
};

use crate::transaction::{self, BlockTransactions};

/// [`ExecutionPayloadV1`](https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/paris.md#executionpayloadv1)
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPayloadV1 {
    pub parent_hash: ExecutionBlockHash,
    pub fee_recipient: ExecutionAddress,
    pub state_root: H256,
    pub receipts_root: H256,
    pub logs_bloom: LogsBloom,
    pub prev_randao: H256,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub block_number: ExecutionBlockNumber,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub gas_limit: Gas,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub gas_used: Gas,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub timestamp: UnixSeconds,
    #[serde(with = "serde_utils::prefixed_hex_or_bytes")]
    pub extra_data: Vec<u8>,
    pub base_fee_per_gas: Wei,
    pub block_hash: ExecutionBlockHash,
    pub transactions: Vec<Transaction>,
}

impl From<BellatrixExecutionPayload> for ExecutionPayloadV1 {
    fn from(payload: BellatrixExecutionPayload) -> Self {
        let BellatrixExecutionPayload {
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
        } = payload;

        Self {
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

impl From<ExecutionPayloadV1> for BellatrixExecutionPayload {
    fn from(payload: ExecutionPayloadV1) -> Self {
        let ExecutionPayloadV1 {
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
        } = payload;

        Self {
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

/// [`ExecutionPayloadV2`](https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/shanghai.md#executionpayloadv2)
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPayloadV2 {
    pub parent_hash: ExecutionBlockHash,
    pub fee_recipient: ExecutionAddress,
    pub state_root: H256,
    pub receipts_root: H256,
    pub logs_bloom: LogsBloom,
    pub prev_randao: H256,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub block_number: ExecutionBlockNumber,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub gas_limit: Gas,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub gas_used: Gas,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub timestamp: UnixSeconds,
    #[serde(with = "serde_utils::prefixed_hex_or_bytes")]
    pub extra_data: Vec<u8>,
    pub base_fee_per_gas: Wei,
    pub block_hash: ExecutionBlockHash,
    pub transactions: Vec<Transaction>,
    pub withdrawals: Vec<WithdrawalV1>,
}

impl From<CapellaExecutionPayload> for ExecutionPayloadV2 {
    fn from(payload: CapellaExecutionPayload) -> Self {
        let CapellaExecutionPayload {
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
        } = payload;

        Self {
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
            withdrawals: withdrawals.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<ExecutionPayloadV2> for CapellaExecutionPayload {
    fn from(payload: ExecutionPayloadV2) -> Self {
        let ExecutionPayloadV2 {
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
        } = payload;

        Self {
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
            withdrawals: withdrawals.into_iter().map(Into::into).collect(),
        }
    }
}

/// [`ExecutionPayloadV3`](https://github.com/ethereum/execution-apis/blob/fe8e13c288c592ec154ce25c534e26cb7ce0530d/src/engine/cancun.md#executionpayloadv3)
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPayloadV3 {
    pub parent_hash: ExecutionBlockHash,
    pub fee_recipient: ExecutionAddress,
    pub state_root: H256,
    pub receipts_root: H256,
    pub logs_bloom: LogsBloom,
    pub prev_randao: H256,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub block_number: ExecutionBlockNumber,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub gas_limit: Gas,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub gas_used: Gas,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub timestamp: UnixSeconds,
    #[serde(with = "serde_utils::prefixed_hex_or_bytes")]
    pub extra_data: Vec<u8>,
    pub base_fee_per_gas: Wei,
    pub block_hash: ExecutionBlockHash,
    pub transactions: Vec<Transaction>,
    pub withdrawals: Vec<WithdrawalV1>,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub blob_gas_used: Gas,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub excess_blob_gas: Gas,
}

impl From<DenebExecutionPayload> for ExecutionPayloadV3 {
    fn from(payload: DenebExecutionPayload) -> Self {
        let DenebExecutionPayload {
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
        } = payload;

        Self {
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
            withdrawals: withdrawals.into_iter().map(Into::into).collect(),
            blob_gas_used,
            excess_blob_gas,
        }
    }
}

impl From<ExecutionPayloadV3> for DenebExecutionPayload {
    fn from(payload: ExecutionPayloadV3) -> Self {
        let ExecutionPayloadV3 {
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
        } = payload;

        Self {
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
            withdrawals: withdrawals.into_iter().map(Into::into).collect(),
            blob_gas_used,
            excess_blob_gas,
        }
    }
}

/// [`BlobsBundleV1`](https://github.com/ethereum/execution-apis/blob/fe8e13c288c592ec154ce25c534e26cb7ce0530d/src/engine/cancun.md#blobsbundlev1)
#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
pub struct BlobsBundleV1 {
    pub commitments: Vec<KzgCommitment>,
    pub proofs: Vec<KzgProof>,
    pub blobs: Vec<Blob>,
}

/// [`ForkChoiceStateV1`](https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/paris.md#forkchoicestatev1)
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkChoiceStateV1 {
    pub head_block_hash: ExecutionBlockHash,
    pub safe_block_hash: ExecutionBlockHash,
    pub finalized_block_hash: ExecutionBlockHash,
}

/// [`PayloadAttributesV1`](https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/paris.md#payloadattributesv1)
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadAttributesV1 {
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub timestamp: UnixSeconds,
    pub prev_randao: H256,
    pub suggested_fee_recipient: ExecutionAddress,
}

/// [`PayloadAttributesV2`](https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/shanghai.md#payloadattributesv2)
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadAttributesV2 {
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub timestamp: UnixSeconds,
    pub prev_randao: H256,
    pub suggested_fee_recipient: ExecutionAddress,
    pub withdrawals: Vec<WithdrawalV1>,
}

/// [`PayloadAttributesV3`](https://github.com/ethereum/execution-apis/blob/fe8e13c288c592ec154ce25c534e26cb7ce0530d/src/engine/cancun.md#payloadattributesv3)
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadAttributesV3 {
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub timestamp: UnixSeconds,
    pub prev_randao: H256,
    pub suggested_fee_recipient: ExecutionAddress,
    pub withdrawals: Vec<WithdrawalV1>,
    pub parent_beacon_block_root: H256,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(untagged)]
pub enum PayloadAttributes {
    Bellatrix(PayloadAttributesV1),
    Capella(PayloadAttributesV2),
    Deneb(PayloadAttributesV3),
}

impl PayloadAttributes {
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Bellatrix(_) => Phase::Bellatrix,
            Self::Capella(_) => Phase::Capella,
            Self::Deneb(_) => Phase::Deneb,
        }
    }

    #[must_use]
    pub const fn suggested_fee_recipient(&self) -> ExecutionAddress {
        match self {
            Self::Bellatrix(attributes) => attributes.suggested_fee_recipient,
            Self::Capella(attributes) => attributes.suggested_fee_recipient,
            Self::Deneb(attributes) => attributes.suggested_fee_recipient,
        }
    }
}

/// [`engine_getPayloadV1` response](https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/paris.md#response-2).
pub type EngineGetPayloadV1Response = ExecutionPayloadV1;

/// [`engine_getPayloadV2` response] specialized for Capella.
///
/// [`execution_payload`] could also contain an [`ExecutionPayloadV1`],
/// but we never call `engine_getPayloadV2` for Bellatrix slots.
///
/// [`engine_getPayloadV2` response]: https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/shanghai.md#response-2
/// [`execution_payload`]:            #structfield.execution_payload
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineGetPayloadV2Response {
    pub execution_payload: ExecutionPayloadV2,
    pub block_value: Wei,
}

/// [`engine_getPayloadV3` response](https://github.com/ethereum/execution-apis/blob/fe8e13c288c592ec154ce25c534e26cb7ce0530d/src/engine/cancun.md#response-2)
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineGetPayloadV3Response {
    pub execution_payload: ExecutionPayloadV3,
    pub block_value: Wei,
    pub blobs_bundle: BlobsBundleV1,
    pub should_override_builder: bool,
}

/// A payload returned by any version of `engine_getPayload`.
///
/// Fields absent from older versions of the response are [`None`] or `false`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BuiltPayload {
    pub execution_payload: ExecutionPayload,
    pub blobs_bundle: Option<BlobsBundleV1>,
    pub block_value: Option<Wei>,
    pub should_override_builder: bool,
}

impl BuiltPayload {
    #[must_use]
    pub const fn new(execution_payload: ExecutionPayload) -> Self {
        Self {
            execution_payload,
            blobs_bundle: None,
            block_value: None,
            should_override_builder: false,
        }
    }
}

impl From<EngineGetPayloadV1Response> for BuiltPayload {
    fn from(response: EngineGetPayloadV1Response) -> Self {
        Self::new(ExecutionPayload::Bellatrix(response.into()))
    }
}

impl From<EngineGetPayloadV2Response> for BuiltPayload {
    fn from(response: EngineGetPayloadV2Response) -> Self {
        let EngineGetPayloadV2Response {
            execution_payload,
            block_value,
        } = response;

        Self {
            block_value: Some(block_value),
            ..Self::new(ExecutionPayload::Capella(execution_payload.into()))
        }
    }
}

impl From<EngineGetPayloadV3Response> for BuiltPayload {
    fn from(response: EngineGetPayloadV3Response) -> Self {
        let EngineGetPayloadV3Response {
            execution_payload,
            block_value,
            blobs_bundle,
            should_override_builder,
        } = response;

        Self {
            execution_payload: ExecutionPayload::Deneb(execution_payload.into()),
            blobs_bundle: Some(blobs_bundle),
            block_value: Some(block_value),
            should_override_builder,
        }
    }
}

/// [`PayloadStatusV1`](https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/paris.md#payloadstatusv1)
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Serialize))]
pub struct PayloadStatusV1 {
    pub status: PayloadValidationStatus,
    pub latest_valid_hash: Option<ExecutionBlockHash>,
    pub validation_error: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(test, derive(Serialize))]
pub enum PayloadValidationStatus {
    Valid,
    Invalid,
    Syncing,
    Accepted,
    InvalidBlockHash,
    // Execution clients have added statuses before. Reject them at the call site, not here.
    #[serde(other)]
    Unknown,
}

/// [`engine_forkchoiceUpdated` response](https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/paris.md#response-1)
///
/// `payload_status` is required by the Engine API but is optional here so that a missing status
/// can be reported as an error of its own rather than as a deserialization failure.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkChoiceUpdatedResponse {
    pub payload_status: Option<PayloadStatusV1>,
    pub payload_id: Option<PayloadId>,
}

/// Identifier of a payload build returned by `engine_forkchoiceUpdated` and passed to
/// `engine_getPayload`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PayloadId(pub H64);

impl PayloadId {
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

/// [`WithdrawalV1`](https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/shanghai.md#withdrawalv1)
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalV1 {
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub index: u64,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub validator_index: ValidatorIndex,
    pub address: ExecutionAddress,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub amount: Gwei,
}

impl From<Withdrawal> for WithdrawalV1 {
    fn from(withdrawal: Withdrawal) -> Self {
        let Withdrawal {
            index,
            validator_index,
            address,
            amount,
        } = withdrawal;

        Self {
            index,
            validator_index,
            address,
            amount,
        }
    }
}

impl From<WithdrawalV1> for Withdrawal {
    fn from(withdrawal: WithdrawalV1) -> Self {
        let WithdrawalV1 {
            index,
            validator_index,
            address,
            amount,
        } = withdrawal;

        Self {
            index,
            validator_index,
            address,
            amount,
        }
    }
}

/// [`ExecutionPayloadBodyV1`](https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/shanghai.md#executionpayloadbodyv1)
///
/// `withdrawals` is [`None`] for blocks from before Capella.
#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Serialize))]
pub struct ExecutionPayloadBodyV1 {
    pub transactions: Vec<Transaction>,
    pub withdrawals: Option<Vec<WithdrawalV1>>,
}

impl ExecutionPayloadBodyV1 {
    #[must_use]
    pub fn into_parts(self) -> (Vec<Transaction>, Vec<Withdrawal>) {
        let Self {
            transactions,
            withdrawals,
        } = self;

        let withdrawals = withdrawals
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect();

        (transactions, withdrawals)
    }
}

/// The block parameter of [`eth_getBlockByNumber`](https://ethereum.github.io/execution-apis/api-documentation/).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlockNumberOrTag {
    Number(ExecutionBlockNumber),
    Latest,
    Safe,
    Finalized,
    Earliest,
    Pending,
}

impl Serialize for BlockNumberOrTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tag = match self {
            Self::Number(number) => {
                return serde_utils::prefixed_hex_quantity::serialize(number, serializer)
            }
            Self::Latest => "latest",
            Self::Safe => "safe",
            Self::Finalized => "finalized",
            Self::Earliest => "earliest",
            Self::Pending => "pending",
        };

        serializer.serialize_str(tag)
    }
}

/// A block as returned by `eth_getBlockByHash` and `eth_getBlockByNumber`.
///
/// Only the fields needed to reconstruct payloads and follow the chain are kept.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionBlock {
    pub hash: ExecutionBlockHash,
    pub parent_hash: ExecutionBlockHash,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub number: ExecutionBlockNumber,
    #[serde(with = "serde_utils::prefixed_hex_quantity")]
    pub timestamp: UnixSeconds,
    #[serde(default = "no_transactions")]
    pub transactions: BlockTransactions,
    pub withdrawals: Option<Vec<WithdrawalV1>>,
}

impl ExecutionBlock {
    /// Converts the block into the bodies of a payload.
    ///
    /// Fails if the block was fetched without transactions but contains some.
    pub fn into_parts(self) -> Result<(Vec<Transaction>, Vec<Withdrawal>), Error> {
        let Self {
            transactions,
            withdrawals,
            ..
        } = self;

        let transactions = transaction::encode_block_transactions(transactions)?;

        let withdrawals = withdrawals
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect();

        Ok((transactions, withdrawals))
    }
}

const fn no_transactions() -> BlockTransactions {
    BlockTransactions::Hashes(vec![])
}

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum Error {
    #[error("block contains {count} transaction hashes instead of transaction objects")]
    TransactionsNotIncluded { count: usize },
}
