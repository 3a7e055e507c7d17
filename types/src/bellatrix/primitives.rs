use derive_more::{AsRef, Deref, From, Into};
use serde::{Deserialize, Serialize};

use crate::phase0::primitives::Uint256;

pub use ethereum_types::Bloom as LogsBloom;

pub type Gas = u64;
pub type Wei = Uint256;

/// An opaque transaction in its [EIP-2718](https://eips.ethereum.org/EIPS/eip-2718) encoding.
#[derive(Clone, PartialEq, Eq, Default, Debug, AsRef, Deref, From, Into, Deserialize, Serialize)]
#[as_ref(forward)]
#[serde(transparent)]
pub struct Transaction(#[serde(with = "serde_utils::prefixed_hex_or_bytes")] Vec<u8>);
