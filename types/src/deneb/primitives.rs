use derive_more::{AsRef, Deref, From, Into};
use fixed_hash::construct_fixed_hash;
use impl_serde::impl_fixed_hash_serde;
use serde::{Deserialize, Serialize};

use crate::phase0::primitives::H256;

pub type VersionedHash = H256;

construct_fixed_hash! {
    #[derive(derive_more::AsRef)]
    pub struct KzgCommitment(48);
}

impl_fixed_hash_serde!(KzgCommitment, 48);

construct_fixed_hash! {
    #[derive(derive_more::AsRef)]
    pub struct KzgProof(48);
}

impl_fixed_hash_serde!(KzgProof, 48);

#[derive(Clone, PartialEq, Eq, Default, Debug, AsRef, Deref, From, Into, Deserialize, Serialize)]
#[as_ref(forward)]
#[serde(transparent)]
pub struct Blob(#[serde(with = "serde_utils::prefixed_hex_or_bytes")] Vec<u8>);
