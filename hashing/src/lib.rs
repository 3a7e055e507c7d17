use ethereum_types::H256;
use generic_array::GenericArray;
use hex_literal::hex;
use itertools::Itertools as _;
use once_cell::sync::Lazy;
use sha2::{
    digest::{core_api::BlockSizeUser, generic_array::typenum::Unsigned as _},
    Sha256,
};

/// Depth of the deepest tree that can be padded with [`ZERO_HASHES`].
///
/// A tree with room for `u64::MAX` elements has this depth.
pub const MAX_DEPTH: usize = u64::BITS as usize;

/// `ZERO_HASHES[depth]` is the root of a tree of depth `depth` with all leaves set to 0x00…00.
pub static ZERO_HASHES: Lazy<[H256; MAX_DEPTH + 1]> = Lazy::new(|| {
    let mut previous = H256::zero();

    core::array::from_fn(|depth| {
        if depth > 0 {
            previous = hash_256_256(previous, previous);
        }

        previous
    })
});

// A 64 byte message fills an entire block, so SHA-256 needs a second block with nothing but
// padding. Hardcoding it is cheaper than letting `sha2::Sha256` build it for every node.
#[rustfmt::skip]
const PADDING_BLOCK_FOR_512_BITS: Sha256Block = hex!("
    80000000 00000000 00000000 00000000
    00000000 00000000 00000000 00000000
    00000000 00000000 00000000 00000000
    00000000 00000000 00000000 00000200
");

type Sha256BlockSize = <Sha256 as BlockSizeUser>::BlockSize;
type Sha256Block = [u8; Sha256BlockSize::USIZE];

struct Sha256State([u32; 8]);

impl Default for Sha256State {
    #[rustfmt::skip]
    fn default() -> Self {
        Self([
            0x6a09_e667, 0xbb67_ae85, 0x3c6e_f372, 0xa54f_f53a,
            0x510e_527f, 0x9b05_688c, 0x1f83_d9ab, 0x5be0_cd19,
        ])
    }
}

impl Sha256State {
    fn compress(mut self, blocks: &[GenericArray<u8, Sha256BlockSize>]) -> Self {
        sha2::compress256(&mut self.0, blocks);
        self
    }

    fn output(self) -> H256 {
        let mut output = H256::zero();

        for (bytes, word) in output.as_bytes_mut().chunks_exact_mut(4).zip(self.0) {
            bytes.copy_from_slice(&word.to_be_bytes());
        }

        output
    }
}

/// Hashes the concatenation of two nodes. This is the only hash function a binary Merkle tree of
/// 32 byte nodes needs.
#[inline]
#[must_use]
pub fn hash_256_256(left: H256, right: H256) -> H256 {
    let mut block = GenericArray::default();
    block[..32].copy_from_slice(left.as_bytes());
    block[32..].copy_from_slice(right.as_bytes());

    let padding_block = *GenericArray::from_slice(&PADDING_BLOCK_FOR_512_BITS);

    Sha256State::default()
        .compress(&[block, padding_block])
        .output()
}

/// Computes the next level of a tree from a level with an even number of nodes.
#[must_use]
pub fn hash_pairs(nodes: &[H256]) -> Vec<H256> {
    debug_assert_eq!(nodes.len() % 2, 0);

    nodes
        .iter()
        .copied()
        .tuples()
        .map(|(left, right)| hash_256_256(left, right))
        .collect()
}
