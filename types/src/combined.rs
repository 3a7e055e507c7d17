use derive_more::From;
use ssz::MerkleError;
use thiserror::Error;

use crate::{
    bellatrix::{
        containers::{
            ExecutionPayload as BellatrixExecutionPayload,
            ExecutionPayloadHeader as BellatrixExecutionPayloadHeader,
        },
        primitives::Transaction,
    },
    capella::containers::{
        ExecutionPayload as CapellaExecutionPayload,
        ExecutionPayloadHeader as CapellaExecutionPayloadHeader, Withdrawal,
    },
    deneb::{
        containers::{
            ExecutionPayload as DenebExecutionPayload,
            ExecutionPayloadHeader as DenebExecutionPayloadHeader,
        },
        primitives::VersionedHash,
    },
    nonstandard::Phase,
    phase0::{
        containers::Eth1Data,
        primitives::{
            ExecutionAddress, ExecutionBlockHash, SignatureBytes, Slot, ValidatorIndex, H256,
        },
    },
};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum Error {
    #[error("unknown ExecutionPayload schema for block version {phase}")]
    UnsupportedVersion { phase: Phase },
}

#[derive(Clone, PartialEq, Eq, Debug, From)]
pub enum ExecutionPayload {
    Bellatrix(BellatrixExecutionPayload),
    Capella(CapellaExecutionPayload),
    Deneb(DenebExecutionPayload),
}

impl ExecutionPayload {
    /// Returns the payload of a block from before the Merge, which has every field zeroed.
    pub fn empty(phase: Phase) -> Result<Self, Error> {
        match phase {
            Phase::Phase0 | Phase::Altair => Err(Error::UnsupportedVersion { phase }),
            Phase::Bellatrix => Ok(BellatrixExecutionPayload::default().into()),
            Phase::Capella => Ok(CapellaExecutionPayload::default().into()),
            Phase::Deneb => Ok(DenebExecutionPayload::default().into()),
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Bellatrix(_) => Phase::Bellatrix,
            Self::Capella(_) => Phase::Capella,
            Self::Deneb(_) => Phase::Deneb,
        }
    }

    #[must_use]
    pub const fn block_hash(&self) -> ExecutionBlockHash {
        match self {
            Self::Bellatrix(payload) => payload.block_hash,
            Self::Capella(payload) => payload.block_hash,
            Self::Deneb(payload) => payload.block_hash,
        }
    }

    #[must_use]
    pub const fn parent_hash(&self) -> ExecutionBlockHash {
        match self {
            Self::Bellatrix(payload) => payload.parent_hash,
            Self::Capella(payload) => payload.parent_hash,
            Self::Deneb(payload) => payload.parent_hash,
        }
    }

    #[must_use]
    pub const fn fee_recipient(&self) -> ExecutionAddress {
        match self {
            Self::Bellatrix(payload) => payload.fee_recipient,
            Self::Capella(payload) => payload.fee_recipient,
            Self::Deneb(payload) => payload.fee_recipient,
        }
    }

    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        match self {
            Self::Bellatrix(payload) => &payload.transactions,
            Self::Capella(payload) => &payload.transactions,
            Self::Deneb(payload) => &payload.transactions,
        }
    }

    #[must_use]
    pub fn withdrawals(&self) -> Option<&[Withdrawal]> {
        match self {
            Self::Bellatrix(_) => None,
            Self::Capella(payload) => Some(&payload.withdrawals),
            Self::Deneb(payload) => Some(&payload.withdrawals),
        }
    }

    pub fn to_header(&self) -> Result<ExecutionPayloadHeader, MerkleError> {
        match self {
            Self::Bellatrix(payload) => payload.to_header().map(Into::into),
            Self::Capella(payload) => payload.to_header().map(Into::into),
            Self::Deneb(payload) => payload.to_header().map(Into::into),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, From)]
pub enum ExecutionPayloadHeader {
    Bellatrix(BellatrixExecutionPayloadHeader),
    Capella(CapellaExecutionPayloadHeader),
    Deneb(DenebExecutionPayloadHeader),
}

impl ExecutionPayloadHeader {
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Bellatrix(_) => Phase::Bellatrix,
            Self::Capella(_) => Phase::Capella,
            Self::Deneb(_) => Phase::Deneb,
        }
    }

    #[must_use]
    pub const fn block_hash(&self) -> ExecutionBlockHash {
        match self {
            Self::Bellatrix(header) => header.block_hash,
            Self::Capella(header) => header.block_hash,
            Self::Deneb(header) => header.block_hash,
        }
    }

    #[must_use]
    pub const fn transactions_root(&self) -> H256 {
        match self {
            Self::Bellatrix(header) => header.transactions_root,
            Self::Capella(header) => header.transactions_root,
            Self::Deneb(header) => header.transactions_root,
        }
    }

    #[must_use]
    pub const fn withdrawals_root(&self) -> Option<H256> {
        match self {
            Self::Bellatrix(_) => None,
            Self::Capella(header) => Some(header.withdrawals_root),
            Self::Deneb(header) => Some(header.withdrawals_root),
        }
    }

    /// Combines the header with the bodies it commits to.
    ///
    /// `withdrawals` are ignored for Bellatrix headers.
    /// The roots in the header are not checked against the bodies.
    #[must_use]
    pub fn with_body(
        self,
        transactions: Vec<Transaction>,
        withdrawals: Vec<Withdrawal>,
    ) -> ExecutionPayload {
        match self {
            Self::Bellatrix(header) => header.with_transactions(transactions).into(),
            Self::Capella(header) => header.with_body(transactions, withdrawals).into(),
            Self::Deneb(header) => header.with_body(transactions, withdrawals).into(),
        }
    }
}

/// Data passed to the execution client alongside the payload that is not part of it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ExecutionPayloadParams {
    Deneb {
        versioned_hashes: Vec<VersionedHash>,
        parent_beacon_block_root: H256,
    },
}

/// A signed beacon block with its execution payload abstracted over.
///
/// Full blocks carry an [`ExecutionPayload`]. Blinded blocks carry an
/// [`Option<ExecutionPayloadHeader>`], with [`None`] representing missing execution data.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct SignedBeaconBlock<E> {
    pub message: BeaconBlock<E>,
    pub signature: SignatureBytes,
}

#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct BeaconBlock<E> {
    pub slot: Slot,
    pub proposer_index: ValidatorIndex,
    pub parent_root: H256,
    pub state_root: H256,
    pub body: BeaconBlockBody<E>,
}

#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct BeaconBlockBody<E> {
    pub randao_reveal: SignatureBytes,
    pub eth1_data: Eth1Data,
    pub graffiti: H256,
    pub execution_payload: E,
}

pub type SignedBlindedBeaconBlock = SignedBeaconBlock<Option<ExecutionPayloadHeader>>;
pub type SignedFullBeaconBlock = SignedBeaconBlock<ExecutionPayload>;

impl<E> SignedBeaconBlock<E> {
    #[must_use]
    pub const fn slot(&self) -> Slot {
        self.message.slot
    }

    #[must_use]
    pub const fn execution_payload(&self) -> &E {
        &self.message.body.execution_payload
    }

    /// Replaces the execution part of the block, keeping everything else including the signature.
    #[must_use]
    pub fn with_execution_payload<F>(self, execution_payload: F) -> SignedBeaconBlock<F> {
        let Self { message, signature } = self;

        let BeaconBlock {
            slot,
            proposer_index,
            parent_root,
            state_root,
            body,
        } = message;

        let BeaconBlockBody {
            randao_reveal,
            eth1_data,
            graffiti,
            execution_payload: _,
        } = body;

        SignedBeaconBlock {
            message: BeaconBlock {
                slot,
                proposer_index,
                parent_root,
                state_root,
                body: BeaconBlockBody {
                    randao_reveal,
                    eth1_data,
                    graffiti,
                    execution_payload,
                },
            },
            signature,
        }
    }
}
