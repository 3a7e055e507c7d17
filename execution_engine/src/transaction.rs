//! Transaction objects returned by `eth_getBlockByHash` with `hydrated = true`.
//!
//! Execution payloads carry transactions in their [EIP-2718] encoding. Block lookups return them
//! as JSON objects instead, so they have to be encoded again to be put into a payload.
//!
//! [EIP-2718]: https://eips.ethereum.org/EIPS/eip-2718

use alloy_consensus::TxEnvelope;
use alloy_eips::eip2718::Encodable2718 as _;
use types::bellatrix::primitives::Transaction;

use crate::types::Error;

pub type RpcTransaction = alloy_rpc_types_eth::Transaction;
pub type BlockTransactions = alloy_rpc_types_eth::BlockTransactions<RpcTransaction>;

#[must_use]
pub fn encode_2718(transaction: RpcTransaction) -> Transaction {
    let envelope: TxEnvelope = transaction.inner.into_inner();
    envelope.encoded_2718().into()
}

/// Converts the transactions of a block to the form they take in execution payloads.
///
/// Fails if the block was fetched without transactions but contains some.
pub fn encode_block_transactions(
    transactions: BlockTransactions,
) -> Result<Vec<Transaction>, Error> {
    match transactions {
        BlockTransactions::Full(transactions) => {
            Ok(transactions.into_iter().map(encode_2718).collect())
        }
        BlockTransactions::Hashes(hashes) if hashes.is_empty() => Ok(vec![]),
        BlockTransactions::Hashes(hashes) => Err(Error::TransactionsNotIncluded {
            count: hashes.len(),
        }),
        BlockTransactions::Uncle => Ok(vec![]),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use hex_literal::hex;
    use serde_json::{json, Value};
    use test_case::test_case;

    use super::*;

    // Example from EIP-155.
    #[test_case(
        json!({
            "type": "0x0",
            "chainId": "0x1",
            "nonce": "0x9",
            "gasPrice": "0x4a817c800",
            "gas": "0x5208",
            "to": "0x3535353535353535353535353535353535353535",
            "value": "0xde0b6b3a7640000",
            "input": "0x",
            "v": "0x25",
            "r": "0x28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276",
            "s": "0x67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83",
        }),
        &hex!(
            "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a7640000
             8025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d899
             7f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
        );
        "legacy"
    )]
    #[test_case(
        json!({
            "type": "0x1",
            "chainId": "0x1",
            "nonce": "0x0",
            "gasPrice": "0x3b9aca00",
            "gas": "0x7530",
            "to": "0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae",
            "value": "0x0",
            "input": "0xabcdef",
            "accessList": [{
                "address": "0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae",
                "storageKeys": [
                    "0x0000000000000000000000000000000000000000000000000000000000000001",
                    "0x0000000000000000000000000000000000000000000000000000000000000002",
                ],
            }],
            "v": "0x0",
            "yParity": "0x0",
            "r": "0x1111111111111111111111111111111111111111111111111111111111111111",
            "s": "0x2222222222222222222222222222222222222222222222222222222222222222",
        }),
        &hex!(
            "01f8c40180843b9aca0082753094de0b295669a9fd93d5f28d9ec85e40f4cb697bae8083abcdeff85b
             f85994de0b295669a9fd93d5f28d9ec85e40f4cb697baef842a000000000000000000000000000000000
             00000000000000000000000000000001a00000000000000000000000000000000000000000000000000
             00000000000000280a0111111111111111111111111111111111111111111111111111111111111111
             1a02222222222222222222222222222222222222222222222222222222222222222"
        );
        "access list"
    )]
    #[test_case(
        json!({
            "type": "0x2",
            "chainId": "0x146966",
            "nonce": "0x51698",
            "maxPriorityFeePerGas": "0x59682f00",
            "maxFeePerGas": "0x59682f07",
            "gas": "0x5208",
            "to": "0x32960b83199ae0f78756dbcf016a8e88e4dd7a74",
            "value": "0x94a19041886f0000",
            "input": "0x",
            "accessList": [],
            "v": "0x1",
            "yParity": "0x1",
            "r": "0xf916421115b1dc667b959fe32fa01cc9ba07942078b9e28435fd0a55c1cbf2db",
            "s": "0x76da1b6e79fa9a3b6b77e1601546fa194652a3f9a73919c470254833dfae68f8",
        }),
        &hex!(
            "02f87883146966830516988459682f008459682f078252089432960b83199ae0f78756dbcf016a8e88
             e4dd7a748894a19041886f000080c001a0f916421115b1dc667b959fe32fa01cc9ba07942078b9e284
             35fd0a55c1cbf2dba076da1b6e79fa9a3b6b77e1601546fa194652a3f9a73919c470254833dfae68f8"
        );
        "dynamic fee"
    )]
    #[test_case(
        json!({
            "type": "0x2",
            "chainId": "0x1",
            "nonce": "0x2",
            "maxPriorityFeePerGas": "0x1",
            "maxFeePerGas": "0x2",
            "gas": "0x10000",
            "to": null,
            "value": "0x0",
            "input": "0x6000",
            "accessList": [],
            "v": "0x0",
            "yParity": "0x0",
            "r": "0x1111111111111111111111111111111111111111111111111111111111111111",
            "s": "0x2222222222222222222222222222222222222222222222222222222222222222",
        }),
        &hex!(
            "02f85101020102830100008080826000c080a0111111111111111111111111111111111111111111
             1111111111111111111111a022222222222222222222222222222222222222222222222222222222222
             22222"
        );
        "contract creation"
    )]
    #[test_case(
        json!({
            "type": "0x3",
            "chainId": "0x1",
            "nonce": "0x1",
            "maxPriorityFeePerGas": "0x1",
            "maxFeePerGas": "0x2",
            "gas": "0x5208",
            "to": "0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae",
            "value": "0x0",
            "input": "0x",
            "accessList": [],
            "maxFeePerBlobGas": "0x3",
            "blobVersionedHashes": [
                "0x01aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            ],
            "v": "0x1",
            "yParity": "0x1",
            "r": "0x1111111111111111111111111111111111111111111111111111111111111111",
            "s": "0x2222222222222222222222222222222222222222222222222222222222222222",
        }),
        &hex!(
            "03f8850101010282520894de0b295669a9fd93d5f28d9ec85e40f4cb697bae8080c003e1a001aaaaaa
             aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa01a011111111111111111111
             11111111111111111111111111111111111111111111a0222222222222222222222222222222222222
             2222222222222222222222222222"
        );
        "blob"
    )]
    fn transaction_object_is_encoded_like_in_payloads(fields: Value, expected: &[u8]) -> Result<()> {
        let transaction = serde_json::from_value::<RpcTransaction>(included_in_block(fields))?;

        assert_eq!(encode_2718(transaction).to_vec(), expected);

        Ok(())
    }

    #[test]
    fn unknown_transaction_type_is_rejected() {
        let json = included_in_block(json!({
            "type": "0x7e",
            "nonce": "0x0",
            "gas": "0x5208",
            "to": null,
            "value": "0x0",
            "input": "0x",
            "v": "0x0",
            "r": "0x0",
            "s": "0x0",
        }));

        assert!(serde_json::from_value::<RpcTransaction>(json).is_err());
    }

    #[test]
    fn blob_transaction_without_versioned_hashes_is_rejected() {
        let json = included_in_block(json!({
            "type": "0x3",
            "chainId": "0x1",
            "nonce": "0x0",
            "maxPriorityFeePerGas": "0x1",
            "maxFeePerGas": "0x2",
            "maxFeePerBlobGas": "0x3",
            "gas": "0x5208",
            "to": "0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae",
            "value": "0x0",
            "input": "0x",
            "accessList": [],
            "v": "0x0",
            "yParity": "0x0",
            "r": "0x0",
            "s": "0x0",
        }));

        assert!(serde_json::from_value::<RpcTransaction>(json).is_err());
    }

    #[test]
    fn hashes_are_only_accepted_when_there_are_none() -> Result<()> {
        let hashes = serde_json::from_value::<BlockTransactions>(json!([
            "0x1111111111111111111111111111111111111111111111111111111111111111",
        ]))?;

        assert_eq!(
            encode_block_transactions(hashes),
            Err(Error::TransactionsNotIncluded { count: 1 }),
        );

        assert_eq!(
            encode_block_transactions(BlockTransactions::Hashes(vec![])),
            Ok(vec![]),
        );

        Ok(())
    }

    // Fields every hydrated transaction carries besides the signed transaction itself.
    fn included_in_block(mut fields: Value) -> Value {
        fields["hash"] = json!("0x4444444444444444444444444444444444444444444444444444444444444444");
        fields["from"] = json!("0x5555555555555555555555555555555555555555");
        fields["blockHash"] =
            json!("0x3367b402ece0f97395af9f78310c2b658c2acb2f2ad8ca2ff4fd378f8f09259d");
        fields["blockNumber"] = json!("0xd6d8");
        fields["transactionIndex"] = json!("0x0");
        fields
    }
}
