pub use crate::{
    transaction::{encode_2718, encode_block_transactions, BlockTransactions, RpcTransaction},
    types::{
        BlobsBundleV1, BlockNumberOrTag, BuiltPayload, EngineGetPayloadV1Response,
        EngineGetPayloadV2Response, EngineGetPayloadV3Response, Error, ExecutionBlock,
        ExecutionPayloadBodyV1, ExecutionPayloadV1, ExecutionPayloadV2, ExecutionPayloadV3,
        ForkChoiceStateV1, ForkChoiceUpdatedResponse, PayloadAttributes, PayloadAttributesV1,
        PayloadAttributesV2, PayloadAttributesV3, PayloadId, PayloadStatusV1,
        PayloadValidationStatus, WithdrawalV1,
    },
};

mod transaction;
mod types;
