pub const BYTES_PER_LOGS_BLOOM: usize = 256;
pub const MAX_BYTES_PER_TRANSACTION: u64 = 1 << 30;
pub const MAX_EXTRA_DATA_BYTES: usize = 32;
pub const MAX_TRANSACTIONS_PER_PAYLOAD: u64 = 1 << 20;
