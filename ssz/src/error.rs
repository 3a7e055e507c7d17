use thiserror::Error;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum MerkleError {
    #[error("collection of length {length} exceeds the limit of {limit} elements")]
    CollectionTooLarge { length: usize, limit: u64 },
}
