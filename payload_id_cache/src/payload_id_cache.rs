use std::collections::{BTreeMap, HashMap};

use execution_engine::PayloadId;
use parking_lot::RwLock;
use types::phase0::primitives::{ExecutionBlockHash, Slot};

/// Number of slots before the newest inserted one for which payload IDs are kept.
pub const RETENTION_SLOTS: u64 = 2;

/// Payload IDs of builds started by the execution client, keyed by slot and parent block hash.
///
/// Entries are pruned when newer slots are inserted. There is no background eviction.
#[derive(Default, Debug)]
pub struct PayloadIdCache {
    slots: RwLock<BTreeMap<Slot, HashMap<ExecutionBlockHash, PayloadId>>>,
}

impl PayloadIdCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, slot: Slot, parent_hash: ExecutionBlockHash) -> Option<PayloadId> {
        self.slots
            .read()
            .get(&slot)
            .and_then(|payload_ids| payload_ids.get(&parent_hash))
            .copied()
    }

    /// Stores `payload_id`, replacing any ID already stored for the same key.
    ///
    /// Slots older than `slot - RETENTION_SLOTS` are removed first.
    pub fn set(&self, slot: Slot, parent_hash: ExecutionBlockHash, payload_id: PayloadId) {
        let mut slots = self.slots.write();

        prune(&mut slots, slot.saturating_sub(RETENTION_SLOTS));

        slots
            .entry(slot)
            .or_default()
            .insert(parent_hash, payload_id);
    }

    /// Removes every slot strictly less than `slot`.
    pub fn prune_prior(&self, slot: Slot) {
        prune(&mut self.slots.write(), slot);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.read().values().map(HashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }
}

fn prune(slots: &mut BTreeMap<Slot, HashMap<ExecutionBlockHash, PayloadId>>, slot: Slot) {
    let retained = slots.split_off(&slot);
    *slots = retained;
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use test_case::test_case;
    use types::phase0::primitives::H64;
    use unwrap_none::UnwrapNone as _;

    use super::*;

    const PAYLOAD_ID: PayloadId = PayloadId(H64(hex!("a247243752eb10b4")));

    #[test]
    fn stored_payload_id_is_returned_immediately() {
        let cache = PayloadIdCache::new();
        let parent_hash = ExecutionBlockHash::repeat_byte(1);

        cache.set(10, parent_hash, PAYLOAD_ID);

        assert_eq!(cache.get(10, parent_hash), Some(PAYLOAD_ID));
    }

    #[test]
    fn missing_slot_and_missing_parent_hash_are_both_misses() {
        let cache = PayloadIdCache::new();

        cache.set(10, ExecutionBlockHash::repeat_byte(1), PAYLOAD_ID);

        cache.get(11, ExecutionBlockHash::repeat_byte(1)).unwrap_none();
        cache.get(10, ExecutionBlockHash::repeat_byte(2)).unwrap_none();
    }

    #[test]
    fn last_write_wins() {
        let cache = PayloadIdCache::new();
        let parent_hash = ExecutionBlockHash::repeat_byte(1);
        let newer = PayloadId(H64::repeat_byte(7));

        cache.set(10, parent_hash, PAYLOAD_ID);
        cache.set(10, parent_hash, newer);

        assert_eq!(cache.get(10, parent_hash), Some(newer));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn inserting_newer_slots_prunes_slots_outside_retention() {
        let cache = PayloadIdCache::new();
        let parent_hash = ExecutionBlockHash::repeat_byte(1);
        let start = 100;

        for slot in start..=start + 3 {
            cache.set(slot, parent_hash, PAYLOAD_ID);
        }

        cache.get(start, parent_hash).unwrap_none();

        for slot in start + 1..=start + 3 {
            assert_eq!(cache.get(slot, parent_hash), Some(PAYLOAD_ID));
        }
    }

    #[test_case(0)]
    #[test_case(1)]
    #[test_case(2)]
    fn early_slots_do_not_underflow(slot: Slot) {
        let cache = PayloadIdCache::new();

        cache.set(0, ExecutionBlockHash::zero(), PAYLOAD_ID);
        cache.set(slot, ExecutionBlockHash::repeat_byte(1), PAYLOAD_ID);

        assert_eq!(cache.get(0, ExecutionBlockHash::zero()), Some(PAYLOAD_ID));
    }

    #[test]
    fn prune_prior_removes_strictly_older_slots() {
        let cache = PayloadIdCache::new();
        let parent_hash = ExecutionBlockHash::repeat_byte(1);

        cache.set(5, parent_hash, PAYLOAD_ID);
        cache.set(6, parent_hash, PAYLOAD_ID);
        cache.set(7, parent_hash, PAYLOAD_ID);

        cache.prune_prior(6);

        cache.get(5, parent_hash).unwrap_none();
        assert_eq!(cache.get(6, parent_hash), Some(PAYLOAD_ID));
        assert_eq!(cache.get(7, parent_hash), Some(PAYLOAD_ID));
        assert_eq!(cache.len(), 2);

        cache.prune_prior(8);

        assert!(cache.is_empty());
    }
}
