pub use crate::payload_id_cache::{PayloadIdCache, RETENTION_SLOTS};

mod payload_id_cache;
