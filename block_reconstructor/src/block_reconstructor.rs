use std::sync::Arc;

use anyhow::{bail, ensure, Context as _, Result};
use eth1_api::Eth1Api;
use execution_engine::{ExecutionBlock, ExecutionPayloadBodyV1};
use features::Feature;
use itertools::Itertools as _;
use log::debug;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use types::{
    bellatrix::primitives::Transaction,
    capella::containers::Withdrawal,
    combined::{
        ExecutionPayload, ExecutionPayloadHeader, SignedBlindedBeaconBlock, SignedFullBeaconBlock,
    },
    phase0::primitives::{ExecutionBlockHash, H256},
};

type PayloadBody = (Vec<Transaction>, Vec<Withdrawal>);

/// How execution data missing from blinded blocks is requested from the execution client.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FetchStrategy {
    /// `eth_getBlockByHash` with full transaction objects.
    FullBlocks,
    /// `engine_getPayloadBodiesByHashV1`.
    PayloadBodies,
}

impl FetchStrategy {
    #[must_use]
    pub fn from_features() -> Self {
        if Feature::ReconstructWithPayloadBodies.is_enabled() {
            Self::PayloadBodies
        } else {
            Self::FullBlocks
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum Error {
    #[error("execution payload header in blinded block is missing")]
    NilExecutionData,
    #[error("execution block has an empty block hash")]
    EmptyBlockHash,
    #[error("received nil execution block for request by hash {block_hash:?}")]
    NilExecutionBlock { block_hash: ExecutionBlockHash },
    #[error("could not retrieve the correct number of payloads: wanted {expected} but got {actual}")]
    PayloadCountMismatch { expected: usize, actual: usize },
    #[error(
        "block hash in execution payload header {header:?} \
         does not match execution block hash {block:?}"
    )]
    BlockHashMismatch {
        header: ExecutionBlockHash,
        block: ExecutionBlockHash,
    },
    #[error(
        "transactions of execution block {block_hash:?} do not match header \
         (header root: {header:?}, computed root: {computed:?})"
    )]
    TransactionsRootMismatch {
        block_hash: ExecutionBlockHash,
        header: H256,
        computed: H256,
    },
    #[error(
        "withdrawals of execution block {block_hash:?} do not match header \
         (header root: {header:?}, computed root: {computed:?})"
    )]
    WithdrawalsRootMismatch {
        block_hash: ExecutionBlockHash,
        header: Option<H256>,
        computed: Option<H256>,
    },
}

/// Turns blinded blocks into full blocks using execution data stored by the execution client.
///
/// Blocks from before the Merge (those with a zero block hash) are filled in with an empty payload
/// without contacting the execution client. Every assembled payload is checked against the roots
/// in the header it replaces.
pub struct BlockReconstructor {
    eth1_api: Arc<Eth1Api>,
    strategy: FetchStrategy,
}

impl BlockReconstructor {
    #[must_use]
    pub const fn new(eth1_api: Arc<Eth1Api>, strategy: FetchStrategy) -> Self {
        Self { eth1_api, strategy }
    }

    #[must_use]
    pub const fn strategy(&self) -> FetchStrategy {
        self.strategy
    }

    pub async fn reconstruct(
        &self,
        cancellation: &CancellationToken,
        block: SignedBlindedBeaconBlock,
    ) -> Result<SignedFullBeaconBlock> {
        let Some(header) = block.execution_payload().clone() else {
            bail!(Error::NilExecutionData);
        };

        let block_hash = header.block_hash();

        let execution_payload = if block_hash.is_zero() {
            ExecutionPayload::empty(header.phase())?
        } else {
            let bodies = self.fetch_bodies(cancellation, &[block_hash]).await?;

            let [body] = <[_; 1]>::try_from(bodies).map_err(|bodies| {
                Error::PayloadCountMismatch {
                    expected: 1,
                    actual: bodies.len(),
                }
            })?;

            assemble(header, body)?
        };

        Ok(block.with_execution_payload(execution_payload))
    }

    /// Reconstructs multiple blocks with a single request to the execution client.
    ///
    /// The returned blocks are in the same order as `blocks`. A failure for any block fails the
    /// whole batch.
    pub async fn reconstruct_batch(
        &self,
        cancellation: &CancellationToken,
        blocks: Vec<SignedBlindedBeaconBlock>,
    ) -> Result<Vec<SignedFullBeaconBlock>> {
        let headers = blocks
            .iter()
            .map(|block| {
                block
                    .execution_payload()
                    .clone()
                    .ok_or(Error::NilExecutionData)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let block_hashes = headers
            .iter()
            .map(ExecutionPayloadHeader::block_hash)
            .filter(|block_hash| !block_hash.is_zero())
            .collect_vec();

        debug!(
            "reconstructing {} blinded blocks ({} with execution payloads) using {:?}",
            blocks.len(),
            block_hashes.len(),
            self.strategy,
        );

        let bodies = self.fetch_bodies(cancellation, &block_hashes).await?;
        let body_count = bodies.len();
        let mut bodies = bodies.into_iter();

        blocks
            .into_iter()
            .zip(headers)
            .map(|(block, header)| {
                let execution_payload = if header.block_hash().is_zero() {
                    ExecutionPayload::empty(header.phase())?
                } else {
                    let Some(body) = bodies.next() else {
                        bail!(Error::PayloadCountMismatch {
                            expected: block_hashes.len(),
                            actual: body_count,
                        });
                    };

                    assemble(header, body)?
                };

                Ok(block.with_execution_payload(execution_payload))
            })
            .collect()
    }

    // Returns exactly one body per block hash, in the same order.
    async fn fetch_bodies(
        &self,
        cancellation: &CancellationToken,
        block_hashes: &[ExecutionBlockHash],
    ) -> Result<Vec<PayloadBody>> {
        if block_hashes.is_empty() {
            return Ok(vec![]);
        }

        match self.strategy {
            FetchStrategy::PayloadBodies => {
                let bodies = self
                    .eth1_api
                    .get_payload_bodies_by_hash(cancellation, block_hashes)
                    .await
                    .with_context(|| {
                        format!("could not fetch payload bodies by hash {block_hashes:?}")
                    })?;

                ensure_count(block_hashes, &bodies)?;

                Ok(bodies
                    .into_iter()
                    .map(ExecutionPayloadBodyV1::into_parts)
                    .collect())
            }
            FetchStrategy::FullBlocks => {
                let blocks = if let [block_hash] = block_hashes {
                    vec![
                        self.eth1_api
                            .get_block_by_hash(cancellation, *block_hash, true)
                            .await,
                    ]
                } else {
                    self.eth1_api
                        .get_blocks_by_hashes(cancellation, block_hashes, true)
                        .await
                        .with_context(|| {
                            format!(
                                "could not fetch execution blocks with transactions \
                                 by hash {block_hashes:?}",
                            )
                        })?
                };

                ensure_count(block_hashes, &blocks)?;

                block_hashes
                    .iter()
                    .copied()
                    .zip(blocks)
                    .map(|(block_hash, result)| {
                        let block = result
                            .with_context(|| {
                                format!(
                                    "could not fetch execution block with transactions \
                                     by hash {block_hash:?}",
                                )
                            })?
                            .ok_or(Error::NilExecutionBlock { block_hash })?;

                        body_from_block(block_hash, block)
                    })
                    .collect()
            }
        }
    }
}

fn ensure_count<T>(block_hashes: &[ExecutionBlockHash], items: &[T]) -> Result<()> {
    ensure!(
        items.len() == block_hashes.len(),
        Error::PayloadCountMismatch {
            expected: block_hashes.len(),
            actual: items.len(),
        },
    );

    Ok(())
}

fn body_from_block(block_hash: ExecutionBlockHash, block: ExecutionBlock) -> Result<PayloadBody> {
    ensure!(!block.hash.is_zero(), Error::EmptyBlockHash);

    ensure!(
        block.hash == block_hash,
        Error::BlockHashMismatch {
            header: block_hash,
            block: block.hash,
        },
    );

    Ok(block.into_parts()?)
}

fn assemble(header: ExecutionPayloadHeader, body: PayloadBody) -> Result<ExecutionPayload> {
    let block_hash = header.block_hash();
    let transactions_root = header.transactions_root();
    let withdrawals_root = header.withdrawals_root();

    let (transactions, withdrawals) = body;
    let execution_payload = header.with_body(transactions, withdrawals);
    let computed = execution_payload.to_header()?;

    ensure!(
        computed.transactions_root() == transactions_root,
        Error::TransactionsRootMismatch {
            block_hash,
            header: transactions_root,
            computed: computed.transactions_root(),
        },
    );

    ensure!(
        computed.withdrawals_root() == withdrawals_root,
        Error::WithdrawalsRootMismatch {
            block_hash,
            header: withdrawals_root,
            computed: computed.withdrawals_root(),
        },
    );

    Ok(execution_payload)
}
