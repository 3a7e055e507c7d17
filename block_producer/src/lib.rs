pub use block_producer::{BlockProducer, Error, Options};

mod block_producer;
