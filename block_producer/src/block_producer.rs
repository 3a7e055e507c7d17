use core::{fmt::Display, time::Duration};
use std::sync::Arc;

use anyhow::{bail, Result};
use either::Either;
use eth1_api::{Eth1Api, ForkChoiceUpdated};
use execution_engine::{BuiltPayload, ForkChoiceStateV1, PayloadAttributes, PayloadId};
use log::{error, info, warn};
use payload_id_cache::PayloadIdCache;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use types::phase0::primitives::{ExecutionBlockHash, Slot};

const DEFAULT_LOCAL_BUILD_PAYLOAD_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug)]
pub struct Options {
    /// How long to let the execution client build a payload before fetching it.
    pub local_build_payload_timeout: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            local_build_payload_timeout: DEFAULT_LOCAL_BUILD_PAYLOAD_TIMEOUT,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum Error {
    #[error(
        "execution client accepted payload attributes without returning a payload ID \
         (head: {head_block_hash:?}, slot: {slot})"
    )]
    NilPayloadIdOnValidResponse {
        head_block_hash: ExecutionBlockHash,
        slot: Slot,
    },
}

/// Obtains execution payloads for proposals from the local execution client.
///
/// Builds are started with `engine_forkchoiceUpdated` and their IDs are remembered in a
/// [`PayloadIdCache`], so a build started ahead of a proposal can be picked up when the proposal
/// is made. The head block hash of the fork choice state is the parent of the built payload.
pub struct BlockProducer {
    eth1_api: Arc<Eth1Api>,
    payload_id_cache: Arc<PayloadIdCache>,
    options: Options,
}

impl BlockProducer {
    #[must_use]
    pub const fn new(
        eth1_api: Arc<Eth1Api>,
        payload_id_cache: Arc<PayloadIdCache>,
        options: Options,
    ) -> Self {
        Self {
            eth1_api,
            payload_id_cache,
            options,
        }
    }

    /// Starts building a payload for `slot` ahead of time.
    ///
    /// Failures are only logged. The proposal falls back to building a payload itself.
    pub async fn prepare_payload_for_slot(
        &self,
        cancellation: &CancellationToken,
        slot: Slot,
        fork_choice_state: ForkChoiceStateV1,
        payload_attributes: PayloadAttributes,
    ) {
        let head_block_hash = fork_choice_state.head_block_hash;

        if let Some(payload_id) = self.payload_id_cache.get(slot, head_block_hash) {
            warn!(
                "aborting payload build; payload with id {payload_id:?} already exists in cache \
                 for head {head_block_hash:?} at slot {slot}",
            );

            return;
        }

        if let Err(error) = self
            .build_local_payload(
                cancellation,
                slot,
                fork_choice_state,
                Some(payload_attributes),
            )
            .await
        {
            warn!("error while preparing execution payload: {error:?}");
        }
    }

    /// Returns a payload built on top of `fork_choice_state.head_block_hash`.
    ///
    /// A build started earlier is used if the execution client still has it.
    /// Otherwise a new build is started with `payload_attributes`.
    pub async fn get_or_build_local_payload(
        &self,
        cancellation: &CancellationToken,
        slot: Slot,
        fork_choice_state: ForkChoiceStateV1,
        payload_attributes: Option<PayloadAttributes>,
    ) -> Result<BuiltPayload> {
        let parent_hash = fork_choice_state.head_block_hash;

        let cached_payload_id = self
            .payload_id_cache
            .get(slot, parent_hash)
            .filter(|payload_id| !payload_id.is_zero());

        if let Some(payload_id) = cached_payload_id {
            match self
                .eth1_api
                .get_payload(cancellation, payload_id, slot)
                .await
            {
                Ok(payload) => {
                    log_retrieved_payload(slot, &payload, payload_attributes.as_ref());
                    return Ok(payload);
                }
                Err(error) => warn!(
                    "could not get cached payload from execution client \
                     (payload_id: {payload_id:?}, slot: {slot}): {error:?}",
                ),
            }
        } else {
            log_with_feature(format_args!(
                "payload_id not found in payload_id_cache for parent {parent_hash:?} \
                 at slot {slot}",
            ));
        }

        let payload = self
            .build_and_wait_for_local_payload(
                cancellation,
                slot,
                fork_choice_state,
                payload_attributes.clone(),
            )
            .await?;

        log_retrieved_payload(slot, &payload, payload_attributes.as_ref());

        Ok(payload)
    }

    /// Asks the execution client to start building a payload and caches its ID.
    pub async fn build_local_payload(
        &self,
        cancellation: &CancellationToken,
        slot: Slot,
        fork_choice_state: ForkChoiceStateV1,
        payload_attributes: Option<PayloadAttributes>,
    ) -> Result<PayloadId> {
        let Some(payload_attributes) = payload_attributes else {
            bail!(eth1_api::Error::NilAttributes);
        };

        let head_block_hash = fork_choice_state.head_block_hash;

        let ForkChoiceUpdated { payload_id, .. } = self
            .eth1_api
            .forkchoice_updated(
                cancellation,
                fork_choice_state,
                Either::Right(payload_attributes),
            )
            .await?;

        let Some(payload_id) = payload_id else {
            error!(
                "could not prepare execution payload: payload_id is None \
                 for head {head_block_hash:?} at slot {slot}; \
                 ensure that multiple consensus clients are not driving the same execution client",
            );

            bail!(Error::NilPayloadIdOnValidResponse {
                head_block_hash,
                slot,
            });
        };

        info!(
            "started work on execution payload with id {payload_id:?} \
             for head {head_block_hash:?} at slot {slot}",
        );

        self.payload_id_cache
            .set(slot, head_block_hash, payload_id);

        Ok(payload_id)
    }

    /// Starts a build, gives the execution client time to fill it and fetches the result.
    pub async fn build_and_wait_for_local_payload(
        &self,
        cancellation: &CancellationToken,
        slot: Slot,
        fork_choice_state: ForkChoiceStateV1,
        payload_attributes: Option<PayloadAttributes>,
    ) -> Result<BuiltPayload> {
        let payload_id = self
            .build_local_payload(cancellation, slot, fork_choice_state, payload_attributes)
            .await?;

        let timeout = self.options.local_build_payload_timeout;

        log_with_feature(format_args!(
            "waiting {timeout:?} for local payload with id {payload_id:?} at slot {slot}",
        ));

        tokio::select! {
            () = cancellation.cancelled() => bail!(eth1_api::Error::Cancelled),
            () = tokio::time::sleep(timeout) => {}
        }

        self.eth1_api
            .get_payload(cancellation, payload_id, slot)
            .await
    }
}

fn log_retrieved_payload(
    slot: Slot,
    payload: &BuiltPayload,
    payload_attributes: Option<&PayloadAttributes>,
) {
    let execution_payload = &payload.execution_payload;

    log_with_feature(format_args!(
        "payload retrieved from local builder for slot {slot} \
         (block_hash: {:?}, parent_hash: {:?}, blobs: {}, override_builder: {})",
        execution_payload.block_hash(),
        execution_payload.parent_hash(),
        payload
            .blobs_bundle
            .as_ref()
            .map_or(0, |blobs_bundle| blobs_bundle.blobs.len()),
        payload.should_override_builder,
    ));

    if let Some(payload_attributes) = payload_attributes {
        let fee_recipient = execution_payload.fee_recipient();
        let suggested_fee_recipient = payload_attributes.suggested_fee_recipient();

        if fee_recipient != suggested_fee_recipient {
            warn!(
                "payload fee recipient {fee_recipient:?} does not match suggested fee recipient \
                 {suggested_fee_recipient:?}; check configuration of beacon node and execution client",
            );
        }
    }
}

fn log_with_feature(message: impl Display) {
    features::log!(DebugBlockProducer, "{message}");
}
