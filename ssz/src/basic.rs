use byteorder::ByteOrder as _;
use ethereum_types::{H160, H256};

use crate::{consts::Endianness, porcelain::SszHash};

impl SszHash for u64 {
    // Note that this is not the same as `H256::from_low_u64_le`. `H256::from_low_u64_le(1)`
    // produces the hash `0x0000000000000000000000000000000000000000000000000100000000000000`.
    #[inline]
    fn hash_tree_root(&self) -> H256 {
        let mut hash = H256::zero();
        Endianness::write_u64(&mut hash[..size_of::<Self>()], *self);
        hash
    }
}

impl SszHash for H160 {
    #[inline]
    fn hash_tree_root(&self) -> H256 {
        let mut hash = H256::zero();
        hash[..Self::len_bytes()].copy_from_slice(self.as_bytes());
        hash
    }
}

impl SszHash for H256 {
    #[inline]
    fn hash_tree_root(&self) -> H256 {
        *self
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn u64_is_little_endian_and_left_aligned() {
        assert_eq!(
            1_u64.hash_tree_root(),
            H256(hex!(
                "0100000000000000000000000000000000000000000000000000000000000000"
            )),
        );
    }

    #[test]
    fn h160_is_padded_on_the_right() {
        let address = H160(hex!("32960b83199ae0f78756dbcf016a8e88e4dd7a74"));

        assert_eq!(
            address.hash_tree_root(),
            H256(hex!(
                "32960b83199ae0f78756dbcf016a8e88e4dd7a74000000000000000000000000"
            )),
        );
    }
}
