pub const MAX_WITHDRAWALS_PER_PAYLOAD: u64 = 16;
