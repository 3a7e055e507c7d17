//! Merkleization of SSZ collections.
//!
//! Only the hashing side of SSZ is implemented here. Collections are merkleized from the roots of
//! their elements, which lets callers hash typed collections without materializing SSZ bytes.

pub use ethereum_types::H256;

pub use crate::{
    consts::{Endianness, BYTES_PER_CHUNK},
    error::MerkleError,
    merkleize::{
        depth_for_limit, merkleize_and_mix_length, merkleize_bytes, merkleize_fixed,
        merkleize_fixed_checked, mix_in_length, pack_bytes,
    },
    porcelain::{element_root, element_roots, SszHash},
};

mod basic;
mod consts;
mod error;
mod merkleize;
mod porcelain;
