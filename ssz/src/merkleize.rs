// Trees are padded to their full depth with the roots of empty subtrees rather than with zero
// chunks. A level with an odd number of nodes is extended by the root of an empty subtree of the
// same height before its nodes are hashed in pairs:
// ```text
// height 2                  r
//                 ┌─────────┴─────────┐
// height 1       h01                 h2z
//             ┌───┴───┐          ┌───┴───┐
// height 0    c0      c1         c2   ZERO_HASHES[0]
// ```
// Only the depth of a tree depends on its limit. Only the length mixed into a list root depends on
// the number of elements.

use byteorder::ByteOrder as _;
use ethereum_types::H256;
use hashing::{MAX_DEPTH, ZERO_HASHES};

use crate::{
    consts::{Endianness, BYTES_PER_CHUNK},
    error::MerkleError,
};

/// Returns `ceil(log2(limit))`, treating limits of 0 and 1 as a single chunk.
#[must_use]
pub const fn depth_for_limit(limit: u64) -> usize {
    if limit <= 1 {
        return 0;
    }

    (u64::BITS - (limit - 1).leading_zeros()) as usize
}

/// Computes the root of a tree with room for `limit` elements.
///
/// The result is only meaningful if `roots.len() <= limit`. Roots past the capacity of the tree
/// are left out. Use [`merkleize_fixed_checked`] for collections whose length has not been
/// validated.
#[must_use]
pub fn merkleize_fixed(roots: &[H256], limit: u64) -> H256 {
    let depth = depth_for_limit(limit);

    // `depth_for_limit` never exceeds `u64::BITS`.
    assert!(depth <= MAX_DEPTH);

    if roots.is_empty() {
        return ZERO_HASHES[depth];
    }

    let mut level = roots.to_vec();

    for zero_hash in ZERO_HASHES.iter().take(depth).copied() {
        if level.len() % 2 == 1 {
            level.push(zero_hash);
        }

        level = hashing::hash_pairs(&level);
    }

    level.first().copied().unwrap_or(ZERO_HASHES[depth])
}

pub fn merkleize_fixed_checked(
    roots: &[H256],
    length: usize,
    limit: u64,
) -> Result<H256, MerkleError> {
    let exceeds_limit =
        |length: usize| !u64::try_from(length).is_ok_and(|length| length <= limit);

    if exceeds_limit(length) {
        return Err(MerkleError::CollectionTooLarge { length, limit });
    }

    if exceeds_limit(roots.len()) {
        return Err(MerkleError::CollectionTooLarge {
            length: roots.len(),
            limit,
        });
    }

    Ok(merkleize_fixed(roots, limit))
}

/// Computes the root of an SSZ list, which is the root of an SSZ vector with the same limit with
/// the number of elements mixed in.
#[must_use]
pub fn merkleize_and_mix_length(roots: &[H256], limit: u64) -> H256 {
    mix_in_length(merkleize_fixed(roots, limit), roots.len())
}

#[must_use]
pub fn mix_in_length(root: H256, length: usize) -> H256 {
    hashing::hash_256_256(root, hash_of_length(length))
}

/// Splits `bytes` into chunks, padding the last one with zeros.
#[must_use]
pub fn pack_bytes(bytes: &[u8]) -> Vec<H256> {
    bytes
        .chunks(BYTES_PER_CHUNK)
        .map(|partial_chunk| {
            let mut chunk = H256::zero();
            chunk[..partial_chunk.len()].copy_from_slice(partial_chunk);
            chunk
        })
        .collect()
}

/// Computes the root of a byte vector with room for `chunk_limit` chunks.
#[must_use]
pub fn merkleize_bytes(bytes: &[u8], chunk_limit: u64) -> H256 {
    merkleize_fixed(&pack_bytes(bytes), chunk_limit)
}

fn hash_of_length(length: usize) -> H256 {
    let mut hash = H256::zero();
    Endianness::write_u64(&mut hash[..size_of::<u64>()], length as u64);
    hash
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use test_case::test_case;

    use super::*;

    const ROOTS: [H256; 3] = [
        H256::repeat_byte(1),
        H256::repeat_byte(2),
        H256::repeat_byte(3),
    ];

    #[test_case(0, 0)]
    #[test_case(1, 0)]
    #[test_case(2, 1)]
    #[test_case(3, 2)]
    #[test_case(4, 2)]
    #[test_case(5, 3)]
    #[test_case(16, 4)]
    #[test_case(1 << 20, 20)]
    #[test_case((1 << 20) + 1, 21)]
    #[test_case(u64::MAX, 64)]
    fn depth_is_rounded_up(limit: u64, expected_depth: usize) {
        assert_eq!(depth_for_limit(limit), expected_depth);
    }

    #[test_case(1)]
    #[test_case(4)]
    #[test_case(16)]
    #[test_case(1 << 20)]
    #[test_case(1 << 25)]
    #[test_case(1 << 41)]
    #[test_case(u64::MAX)]
    fn empty_collection_has_zero_hash_at_depth_of_limit(limit: u64) {
        let expected = ZERO_HASHES[depth_for_limit(limit)];

        assert_eq!(merkleize_fixed(&[], limit), expected);
        assert_eq!(merkleize_fixed(&[], limit), expected);
    }

    #[test]
    fn single_chunk_with_limit_of_one_is_its_own_root() {
        assert_eq!(merkleize_fixed(&ROOTS[..1], 1), ROOTS[0]);
    }

    #[test]
    fn odd_levels_are_padded_with_zero_hashes() {
        let expected = hashing::hash_256_256(
            hashing::hash_256_256(ROOTS[0], ROOTS[1]),
            hashing::hash_256_256(ROOTS[2], ZERO_HASHES[0]),
        );

        assert_eq!(merkleize_fixed(&ROOTS, 4), expected);
        assert_eq!(
            expected,
            H256(hex!(
                "d6cfa0d1046a0f4c1f9a6dc57afb0f4577680c106a48cf04125e7ba8606da219"
            )),
        );
    }

    #[test]
    fn root_depends_on_limit() {
        assert_eq!(
            merkleize_fixed(&ROOTS, 8),
            H256(hex!(
                "16e7bc9c1de9b5c63df0e8ef884b1006155d390b6e1aee4ffd3844e548ec2d41"
            )),
        );
    }

    #[test]
    fn list_root_mixes_in_length() {
        assert_eq!(
            merkleize_and_mix_length(&ROOTS, 4),
            H256(hex!(
                "573b111c4a046878b75029f32235f36b4f18b2114a30f21b11530c427d05ee64"
            )),
        );
    }

    #[test]
    fn list_root_is_sensitive_to_length_alone() {
        // A trailing zero chunk does not change the vector root but does change the list root.
        let padded = [ROOTS[0], ROOTS[1], ROOTS[2], H256::zero()];

        assert_eq!(merkleize_fixed(&ROOTS, 4), merkleize_fixed(&padded, 4));
        assert_ne!(
            merkleize_and_mix_length(&ROOTS, 4),
            merkleize_and_mix_length(&padded, 4),
        );
    }

    #[test]
    fn empty_list_root_mixes_in_zero() {
        assert_eq!(
            merkleize_and_mix_length(&[], 1 << 20),
            H256(hex!(
                "7ffe241ea60187fdb0187bfa22de35d1f9bed7ab061d9401fd47e34a54fbede1"
            )),
        );
    }

    #[test_case(1)]
    #[test_case(4)]
    #[test_case(16)]
    fn checked_merkleization_rejects_oversized_collections(limit: u64) {
        let length = usize::try_from(limit).expect("limit fits in usize") + 1;

        assert_eq!(
            merkleize_fixed_checked(&[], length, limit),
            Err(MerkleError::CollectionTooLarge { length, limit }),
        );
    }

    #[test]
    fn checked_merkleization_rejects_more_roots_than_the_limit() {
        assert_eq!(
            merkleize_fixed_checked(&ROOTS, 1, 2),
            Err(MerkleError::CollectionTooLarge {
                length: 3,
                limit: 2,
            }),
        );
    }

    #[test]
    fn checked_merkleization_supports_the_largest_limit() {
        let expected = (0..u64::BITS as usize).fold(ROOTS[0], |root, depth| {
            hashing::hash_256_256(root, ZERO_HASHES[depth])
        });

        assert_eq!(merkleize_fixed_checked(&ROOTS[..1], 1, u64::MAX), Ok(expected));
    }

    #[test]
    fn checked_merkleization_accepts_full_collections() {
        assert_eq!(
            merkleize_fixed_checked(&ROOTS, ROOTS.len(), 3),
            Ok(merkleize_fixed(&ROOTS, 3)),
        );
    }

    #[test]
    fn bytes_are_packed_into_zero_padded_chunks() {
        let chunks = pack_bytes(&[0xaa; 33]);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], H256::repeat_byte(0xaa));
        assert_eq!(chunks[1][0], 0xaa);
        assert_eq!(chunks[1][1..], [0; 31]);
    }

    // Three transactions hashed the way execution payloads hash them. Any change to padding or
    // length mixing changes this root.
    #[test]
    fn transactions_list_root_matches_recorded_value() {
        let transactions: [&[u8]; 3] = [
            &hex!(
                "02f87883146966830516988459682f008459682f078252089432960b83199ae0f78756dbcf01
                 6a8e88e4dd7a748894a19041886f000080c001a0f916421115b1dc667b959fe32fa01cc9ba07
                 942078b9e28435fd0a55c1cbf2dba076da1b6e79fa9a3b6b77e1601546fa194652a3f9a73919
                 c470254833dfae68f8"
            ),
            &hex!("deadbeef"),
            &[0x11; 64],
        ];

        let roots = transactions
            .iter()
            .map(|bytes| mix_in_length(merkleize_bytes(bytes, 1 << 25), bytes.len()))
            .collect::<Vec<_>>();

        assert_eq!(
            merkleize_and_mix_length(&roots, 1 << 20),
            H256(hex!(
                "faaceac2b100aeda70cb8d22706e870f0867c04f3c1e5f19029d454ff723c9b0"
            )),
        );
    }
}
