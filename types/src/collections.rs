use ssz::{MerkleError, SszHash};

use crate::{
    bellatrix::{consts::MAX_TRANSACTIONS_PER_PAYLOAD, primitives::Transaction},
    capella::{consts::MAX_WITHDRAWALS_PER_PAYLOAD, containers::Withdrawal},
    phase0::primitives::H256,
};

pub fn transactions_root(transactions: &[Transaction]) -> Result<H256, MerkleError> {
    list_root(transactions, MAX_TRANSACTIONS_PER_PAYLOAD)
}

pub fn withdrawals_root(withdrawals: &[Withdrawal]) -> Result<H256, MerkleError> {
    list_root(withdrawals, MAX_WITHDRAWALS_PER_PAYLOAD)
}

fn list_root<T: SszHash>(elements: &[T], limit: u64) -> Result<H256, MerkleError> {
    let roots = ssz::element_roots(elements);
    let root = ssz::merkleize_fixed_checked(&roots, roots.len(), limit)?;
    Ok(ssz::mix_in_length(root, roots.len()))
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use crate::phase0::primitives::H160;

    use super::*;

    const ADDRESS: H160 = H160(hex!("32960b83199ae0f78756dbcf016a8e88e4dd7a74"));

    #[test]
    fn empty_lists_have_zero_hash_roots_with_length_mixed_in() -> Result<(), MerkleError> {
        assert_eq!(
            transactions_root(&[])?,
            H256(hex!(
                "7ffe241ea60187fdb0187bfa22de35d1f9bed7ab061d9401fd47e34a54fbede1"
            )),
        );

        assert_eq!(
            withdrawals_root(&[])?,
            H256(hex!(
                "792930bbd5baac43bcc798ee49aa8185ef76bb3b44ba62b91d86ae569e4bb535"
            )),
        );

        Ok(())
    }

    #[test]
    fn transactions_root_of_three_transactions_matches_recorded_value() -> Result<(), MerkleError>
    {
        let transactions = [
            Transaction::from(
                hex!(
                    "02f87883146966830516988459682f008459682f078252089432960b83199ae0f78756dbcf01
                     6a8e88e4dd7a748894a19041886f000080c001a0f916421115b1dc667b959fe32fa01cc9ba07
                     942078b9e28435fd0a55c1cbf2dba076da1b6e79fa9a3b6b77e1601546fa194652a3f9a73919
                     c470254833dfae68f8"
                )
                .to_vec(),
            ),
            Transaction::from(hex!("deadbeef").to_vec()),
            Transaction::from(vec![0x11; 64]),
        ];

        assert_eq!(
            transactions_root(&transactions)?,
            H256(hex!(
                "faaceac2b100aeda70cb8d22706e870f0867c04f3c1e5f19029d454ff723c9b0"
            )),
        );

        Ok(())
    }

    #[test]
    fn withdrawals_root_matches_recorded_value() -> Result<(), MerkleError> {
        let withdrawals = [
            Withdrawal {
                index: 5,
                validator_index: 10,
                address: ADDRESS,
                amount: 3_000_000_000,
            },
            Withdrawal {
                index: 6,
                validator_index: 11,
                address: ADDRESS,
                amount: 1,
            },
        ];

        assert_eq!(
            withdrawals_root(&withdrawals)?,
            H256(hex!(
                "635394afb68faf27f44659f768b9763918e102f975acab0edba88601ff89270a"
            )),
        );

        Ok(())
    }

    #[test]
    fn withdrawals_over_the_limit_are_rejected() {
        let withdrawals = vec![Withdrawal::default(); 17];

        assert_eq!(
            withdrawals_root(&withdrawals),
            Err(MerkleError::CollectionTooLarge {
                length: 17,
                limit: MAX_WITHDRAWALS_PER_PAYLOAD,
            }),
        );
    }
}
