use core::time::Duration;
use std::{collections::HashMap, sync::Arc, time::Instant};

use anyhow::{bail, Result};
use either::Either;
use ethereum_types::U64;
use execution_engine::{
    BlockNumberOrTag, BuiltPayload, EngineGetPayloadV1Response, EngineGetPayloadV2Response,
    EngineGetPayloadV3Response, ExecutionBlock, ExecutionPayloadBodyV1, ExecutionPayloadV1,
    ExecutionPayloadV2, ExecutionPayloadV3, ForkChoiceStateV1, ForkChoiceUpdatedResponse,
    PayloadAttributes, PayloadId, PayloadStatusV1, PayloadValidationStatus,
};
use log::warn;
use reqwest::{header::AUTHORIZATION, Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use types::{
    combined::{ExecutionPayload, ExecutionPayloadParams},
    config::Config,
    nonstandard::Phase,
    phase0::primitives::{ExecutionBlockHash, ExecutionBlockNumber, Slot},
};
use url::Url;

use crate::{
    auth::Auth,
    error::{handle_rpc_error, Error, RequestFailure, RpcError},
};

const ENGINE_FORKCHOICE_UPDATED_TIMEOUT: Duration = Duration::from_secs(8);
const ENGINE_GET_PAYLOAD_TIMEOUT: Duration = Duration::from_secs(1);
const ENGINE_NEW_PAYLOAD_TIMEOUT: Duration = Duration::from_secs(8);
const ENGINE_GET_PAYLOAD_BODIES_TIMEOUT: Duration = Duration::from_secs(8);
const ETH_GET_BLOCK_TIMEOUT: Duration = Duration::from_secs(8);

const JSONRPC_VERSION: &str = "2.0";

/// Outcome of a successful `engine_forkchoiceUpdated` call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ForkChoiceUpdated {
    pub payload_id: Option<PayloadId>,
    pub latest_valid_hash: Option<ExecutionBlockHash>,
}

/// Client for the Engine API and the parts of the Ethereum JSON-RPC API used alongside it.
///
/// Holds no mutable state. Every method takes a cancellation token that is raced against the
/// deadline of the call. Errors are classified into [`Error`] before they are returned.
pub struct Eth1Api {
    config: Arc<Config>,
    client: Client,
    auth: Arc<Auth>,
    url: Url,
}

impl Eth1Api {
    #[must_use]
    pub const fn new(config: Arc<Config>, client: Client, auth: Arc<Auth>, url: Url) -> Self {
        Self {
            config,
            client,
            auth,
            url,
        }
    }

    /// Calls [`engine_newPayloadV1`] or [`engine_newPayloadV2`] or [`engine_newPayloadV3`]
    /// depending on `payload`.
    ///
    /// Returns the latest valid hash reported by the execution client. Any status other than
    /// `VALID` is an error. `INVALID` carries the latest valid hash in
    /// [`Error::InvalidPayloadStatus`].
    ///
    /// [`engine_newPayloadV1`]: https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/paris.md#engine_newpayloadv1
    /// [`engine_newPayloadV2`]: https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/shanghai.md#engine_newpayloadv2
    /// [`engine_newPayloadV3`]: https://github.com/ethereum/execution-apis/blob/a0d03086564ab1838b462befbc083f873dcf0c0f/src/engine/cancun.md#engine_newpayloadv3
    pub async fn new_payload(
        &self,
        cancellation: &CancellationToken,
        payload: ExecutionPayload,
        params: Option<ExecutionPayloadParams>,
    ) -> Result<Option<ExecutionBlockHash>> {
        let phase = payload.phase();

        let (method, params) = match (payload, params) {
            (ExecutionPayload::Bellatrix(payload), None) => {
                let payload_v1 = ExecutionPayloadV1::from(payload);
                ("engine_newPayloadV1", vec![serde_json::to_value(payload_v1)?])
            }
            (ExecutionPayload::Capella(payload), None) => {
                let payload_v2 = ExecutionPayloadV2::from(payload);
                ("engine_newPayloadV2", vec![serde_json::to_value(payload_v2)?])
            }
            (
                ExecutionPayload::Deneb(payload),
                Some(ExecutionPayloadParams::Deneb {
                    versioned_hashes,
                    parent_beacon_block_root,
                }),
            ) => {
                let payload_v3 = ExecutionPayloadV3::from(payload);

                let params = vec![
                    serde_json::to_value(payload_v3)?,
                    serde_json::to_value(versioned_hashes)?,
                    serde_json::to_value(parent_beacon_block_root)?,
                ];

                ("engine_newPayloadV3", params)
            }
            _ => bail!(Error::PayloadParamsMismatch { phase }),
        };

        let payload_status = self
            .execute::<PayloadStatusV1>(cancellation, method, params, ENGINE_NEW_PAYLOAD_TIMEOUT)
            .await?;

        validate_payload_status(method, payload_status)
    }

    /// Calls [`engine_forkchoiceUpdatedV1`] or [`engine_forkchoiceUpdatedV2`] or
    /// [`engine_forkchoiceUpdatedV3`] depending on the phase of `payload_attributes`.
    ///
    /// Pass [`Either::Left`] to update the fork choice without starting a build.
    ///
    /// [`engine_forkchoiceUpdatedV1`]: https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/paris.md#engine_forkchoiceupdatedv1
    /// [`engine_forkchoiceUpdatedV2`]: https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/shanghai.md#engine_forkchoiceupdatedv2
    /// [`engine_forkchoiceUpdatedV3`]: https://github.com/ethereum/execution-apis/blob/a0d03086564ab1838b462befbc083f873dcf0c0f/src/engine/cancun.md#engine_forkchoiceupdatedv3
    pub async fn forkchoice_updated(
        &self,
        cancellation: &CancellationToken,
        fork_choice_state: ForkChoiceStateV1,
        payload_attributes: Either<Phase, PayloadAttributes>,
    ) -> Result<ForkChoiceUpdated> {
        let phase = payload_attributes
            .as_ref()
            .either(|phase| *phase, PayloadAttributes::phase);

        let method = match phase {
            Phase::Phase0 | Phase::Altair => bail!(Error::UnsupportedVersion { phase }),
            Phase::Bellatrix => "engine_forkchoiceUpdatedV1",
            Phase::Capella => "engine_forkchoiceUpdatedV2",
            Phase::Deneb => "engine_forkchoiceUpdatedV3",
        };

        let params = vec![
            serde_json::to_value(fork_choice_state)?,
            serde_json::to_value(payload_attributes.right())?,
        ];

        let response = self
            .execute::<Option<ForkChoiceUpdatedResponse>>(
                cancellation,
                method,
                params,
                ENGINE_FORKCHOICE_UPDATED_TIMEOUT,
            )
            .await?;

        let Some(ForkChoiceUpdatedResponse {
            payload_status: Some(payload_status),
            payload_id,
        }) = response
        else {
            bail!(Error::NilResponse);
        };

        let latest_valid_hash = validate_payload_status(method, payload_status)?;

        Ok(ForkChoiceUpdated {
            payload_id,
            latest_valid_hash,
        })
    }

    /// Calls [`engine_getPayloadV1`] or [`engine_getPayloadV2`] or [`engine_getPayloadV3`]
    /// depending on the phase at `slot`.
    ///
    /// [`engine_getPayloadV1`]: https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/paris.md#engine_getpayloadv1
    /// [`engine_getPayloadV2`]: https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/shanghai.md#engine_getpayloadv2
    /// [`engine_getPayloadV3`]: https://github.com/ethereum/execution-apis/blob/a0d03086564ab1838b462befbc083f873dcf0c0f/src/engine/cancun.md#engine_getpayloadv3
    pub async fn get_payload(
        &self,
        cancellation: &CancellationToken,
        payload_id: PayloadId,
        slot: Slot,
    ) -> Result<BuiltPayload> {
        let params = vec![serde_json::to_value(payload_id)?];

        match self.config.phase_at_slot(slot) {
            Phase::Bellatrix => self
                .execute::<EngineGetPayloadV1Response>(
                    cancellation,
                    "engine_getPayloadV1",
                    params,
                    ENGINE_GET_PAYLOAD_TIMEOUT,
                )
                .await
                .map(Into::into),
            Phase::Capella => self
                .execute::<EngineGetPayloadV2Response>(
                    cancellation,
                    "engine_getPayloadV2",
                    params,
                    ENGINE_GET_PAYLOAD_TIMEOUT,
                )
                .await
                .map(Into::into),
            Phase::Deneb => self
                .execute::<EngineGetPayloadV3Response>(
                    cancellation,
                    "engine_getPayloadV3",
                    params,
                    ENGINE_GET_PAYLOAD_TIMEOUT,
                )
                .await
                .map(Into::into),
            phase @ (Phase::Phase0 | Phase::Altair) => bail!(Error::UnsupportedVersion { phase }),
        }
    }

    pub async fn get_block_by_hash(
        &self,
        cancellation: &CancellationToken,
        block_hash: ExecutionBlockHash,
        with_transactions: bool,
    ) -> Result<Option<ExecutionBlock>> {
        let params = vec![
            serde_json::to_value(block_hash)?,
            Value::Bool(with_transactions),
        ];

        self.execute(
            cancellation,
            "eth_getBlockByHash",
            params,
            ETH_GET_BLOCK_TIMEOUT,
        )
        .await
    }

    /// Fetches multiple blocks in a single batched request.
    ///
    /// The outer [`Result`] fails if the request as a whole fails. Errors of individual calls are
    /// returned in the position of the corresponding hash.
    pub async fn get_blocks_by_hashes(
        &self,
        cancellation: &CancellationToken,
        block_hashes: &[ExecutionBlockHash],
        with_transactions: bool,
    ) -> Result<Vec<Result<Option<ExecutionBlock>>>> {
        let params = block_hashes
            .iter()
            .map(|block_hash| {
                Ok(vec![
                    serde_json::to_value(block_hash)?,
                    Value::Bool(with_transactions),
                ])
            })
            .collect::<Result<_>>()?;

        self.execute_batch(
            cancellation,
            "eth_getBlockByHash",
            params,
            ETH_GET_BLOCK_TIMEOUT,
        )
        .await
    }

    pub async fn get_block_by_number(
        &self,
        cancellation: &CancellationToken,
        block_number: BlockNumberOrTag,
        with_transactions: bool,
    ) -> Result<Option<ExecutionBlock>> {
        let params = vec![
            serde_json::to_value(block_number)?,
            Value::Bool(with_transactions),
        ];

        self.execute(
            cancellation,
            "eth_getBlockByNumber",
            params,
            ETH_GET_BLOCK_TIMEOUT,
        )
        .await
    }

    pub async fn latest_execution_block(
        &self,
        cancellation: &CancellationToken,
    ) -> Result<Option<ExecutionBlock>> {
        self.get_block_by_number(cancellation, BlockNumberOrTag::Latest, false)
            .await
    }

    pub async fn latest_safe_block(
        &self,
        cancellation: &CancellationToken,
    ) -> Result<Option<ExecutionBlock>> {
        self.get_block_by_number(cancellation, BlockNumberOrTag::Safe, false)
            .await
    }

    pub async fn latest_finalized_block(
        &self,
        cancellation: &CancellationToken,
    ) -> Result<Option<ExecutionBlock>> {
        self.get_block_by_number(cancellation, BlockNumberOrTag::Finalized, false)
            .await
    }

    /// Calls [`engine_getPayloadBodiesByHashV1`].
    ///
    /// Bodies of blocks unknown to the execution client are returned as empty bodies.
    ///
    /// [`engine_getPayloadBodiesByHashV1`]: https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/shanghai.md#engine_getpayloadbodiesbyhashv1
    pub async fn get_payload_bodies_by_hash(
        &self,
        cancellation: &CancellationToken,
        block_hashes: &[ExecutionBlockHash],
    ) -> Result<Vec<ExecutionPayloadBodyV1>> {
        let params = vec![serde_json::to_value(block_hashes)?];

        self.execute::<Vec<Option<ExecutionPayloadBodyV1>>>(
            cancellation,
            "engine_getPayloadBodiesByHashV1",
            params,
            ENGINE_GET_PAYLOAD_BODIES_TIMEOUT,
        )
        .await
        .map(fill_missing_bodies)
    }

    /// Calls [`engine_getPayloadBodiesByRangeV1`].
    ///
    /// [`engine_getPayloadBodiesByRangeV1`]: https://github.com/ethereum/execution-apis/blob/b7c5d3420e00648f456744d121ffbd929862924d/src/engine/shanghai.md#engine_getpayloadbodiesbyrangev1
    pub async fn get_payload_bodies_by_range(
        &self,
        cancellation: &CancellationToken,
        start: ExecutionBlockNumber,
        count: u64,
    ) -> Result<Vec<ExecutionPayloadBodyV1>> {
        let params = vec![
            serde_json::to_value(U64::from(start))?,
            serde_json::to_value(U64::from(count))?,
        ];

        self.execute::<Vec<Option<ExecutionPayloadBodyV1>>>(
            cancellation,
            "engine_getPayloadBodiesByRangeV1",
            params,
            ENGINE_GET_PAYLOAD_BODIES_TIMEOUT,
        )
        .await
        .map(fill_missing_bodies)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        cancellation: &CancellationToken,
        method: &str,
        params: Vec<Value>,
        timeout: Duration,
    ) -> Result<T> {
        let request = JsonRequestBody {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            id: 0,
        };

        self.send::<_, JsonResponseBody>(cancellation, method, &request, timeout)
            .await?
            .into_result()
            .map_err(|failure| handle_rpc_error(failure).into())
    }

    async fn execute_batch<T: DeserializeOwned>(
        &self,
        cancellation: &CancellationToken,
        method: &str,
        params: Vec<Vec<Value>>,
        timeout: Duration,
    ) -> Result<Vec<Result<T>>> {
        if params.is_empty() {
            return Ok(vec![]);
        }

        let requests = params
            .into_iter()
            .zip(0..)
            .map(|(params, id)| JsonRequestBody {
                jsonrpc: JSONRPC_VERSION,
                method,
                params,
                id,
            })
            .collect::<Vec<_>>();

        let responses = self
            .send::<_, Vec<JsonResponseBody>>(cancellation, method, &requests, timeout)
            .await?;

        // Servers may answer batch calls in any order.
        let mut responses_by_id = responses
            .into_iter()
            .filter_map(|response| Some((response.id.as_u64()?, response)))
            .collect::<HashMap<_, _>>();

        let results = requests
            .iter()
            .map(|request| match responses_by_id.remove(&request.id) {
                Some(response) => response
                    .into_result()
                    .map_err(|failure| handle_rpc_error(failure).into()),
                None => Err(Error::NilResponse.into()),
            })
            .collect();

        Ok(results)
    }

    async fn send<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        cancellation: &CancellationToken,
        method: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<R> {
        let mut request = self.client.post(self.url.clone()).json(body);

        if let Some(authorization) = self.auth.authorization()? {
            request = request.header(AUTHORIZATION, authorization);
        }

        let start = Instant::now();

        let result = tokio::select! {
            () = cancellation.cancelled() => Err(RequestFailure::Cancelled),
            result = tokio::time::timeout(timeout, receive(request)) => {
                result.unwrap_or(Err(RequestFailure::Timeout))
            }
        };

        features::log!(
            DebugEth1,
            "{method} finished in {:?} (success: {})",
            start.elapsed(),
            result.is_ok(),
        );

        result.map_err(|failure| handle_rpc_error(failure).into())
    }
}

async fn receive<R: DeserializeOwned>(request: RequestBuilder) -> Result<R, RequestFailure> {
    let response = request.send().await?;

    if response.status() == StatusCode::UNAUTHORIZED {
        return Err(RequestFailure::Unauthorized);
    }

    let bytes = response.error_for_status()?.bytes().await?;

    serde_json::from_slice(&bytes).map_err(RequestFailure::Decode)
}

fn validate_payload_status(
    method: &str,
    payload_status: PayloadStatusV1,
) -> Result<Option<ExecutionBlockHash>> {
    let PayloadStatusV1 {
        status,
        latest_valid_hash,
        validation_error,
    } = payload_status;

    if let Some(validation_error) = validation_error.filter(|message| !message.is_empty()) {
        warn!(
            "{method} returned status {status:?} with validation error: {validation_error} \
             (latest valid hash: {latest_valid_hash:?})",
        );
    }

    match status {
        PayloadValidationStatus::Valid => Ok(latest_valid_hash),
        PayloadValidationStatus::Invalid => {
            bail!(Error::InvalidPayloadStatus { latest_valid_hash })
        }
        PayloadValidationStatus::Syncing => bail!(Error::SyncingPayloadStatus),
        PayloadValidationStatus::Accepted => bail!(Error::AcceptedPayloadStatus),
        PayloadValidationStatus::InvalidBlockHash => bail!(Error::InvalidBlockHashPayloadStatus),
        PayloadValidationStatus::Unknown => bail!(Error::UnknownPayloadStatus),
    }
}

fn fill_missing_bodies(bodies: Vec<Option<ExecutionPayloadBodyV1>>) -> Vec<ExecutionPayloadBodyV1> {
    bodies.into_iter().map(Option::unwrap_or_default).collect()
}

#[derive(Serialize)]
struct JsonRequestBody<'method> {
    jsonrpc: &'static str,
    method: &'method str,
    params: Vec<Value>,
    id: u64,
}

// `geth` adds nonstandard members like `method` and `params` to some responses.
#[derive(Deserialize)]
struct JsonResponseBody {
    #[serde(default)]
    error: Option<RpcError>,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    id: Value,
}

impl JsonResponseBody {
    fn into_result<T: DeserializeOwned>(self) -> Result<T, RequestFailure> {
        if let Some(error) = self.error {
            return Err(RequestFailure::Rpc(error));
        }

        serde_json::from_value(self.result).map_err(RequestFailure::Decode)
    }
}
