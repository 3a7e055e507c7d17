pub use crate::block_reconstructor::{BlockReconstructor, Error, FetchStrategy};

mod block_reconstructor;
