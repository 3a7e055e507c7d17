use core::{cmp::Ordering, num::NonZeroU64};
use std::borrow::Cow;

use enum_iterator::Sequence as _;
use nonzero_ext::nonzero;
use serde::{Deserialize, Serialize};

use crate::{
    nonstandard::Phase,
    phase0::{
        consts::{FAR_FUTURE_EPOCH, GENESIS_EPOCH},
        primitives::{Epoch, Slot},
    },
};

/// Configuration variables customizable at runtime.
///
/// Only the variables needed to determine which phase is active at a given slot are included.
/// See [configurations in `consensus-specs`](https://github.com/ethereum/consensus-specs/tree/aac851f860fa384916f62027b2dbe3318a354c5b/configs).
#[expect(
    clippy::unsafe_derive_deserialize,
    reason = "A false positive triggered by `nonzero!`. \
              `Config` has no invariants. It is intended to be deserialized from user input. \
              The `unsafe` block in `nonzero!` only operates on the literal passed to it."
)]
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    // Meta
    pub config_name: Cow<'static, str>,

    // Forking
    pub altair_fork_epoch: Epoch,
    pub bellatrix_fork_epoch: Epoch,
    pub capella_fork_epoch: Epoch,
    pub deneb_fork_epoch: Epoch,

    // Time parameters
    pub slots_per_epoch: NonZeroU64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_name: Cow::Borrowed(""),

            altair_fork_epoch: FAR_FUTURE_EPOCH,
            bellatrix_fork_epoch: FAR_FUTURE_EPOCH,
            capella_fork_epoch: FAR_FUTURE_EPOCH,
            deneb_fork_epoch: FAR_FUTURE_EPOCH,

            slots_per_epoch: nonzero!(32_u64),
        }
    }
}

impl Config {
    /// [Mainnet configuration](https://github.com/ethereum/consensus-specs/blob/aac851f860fa384916f62027b2dbe3318a354c5b/configs/mainnet.yaml).
    #[must_use]
    pub fn mainnet() -> Self {
        Self {
            config_name: Cow::Borrowed("mainnet"),

            altair_fork_epoch: 74240,
            bellatrix_fork_epoch: 144_896,
            capella_fork_epoch: 194_048,
            deneb_fork_epoch: 269_568,

            ..Self::default()
        }
    }

    /// [Minimal configuration](https://github.com/ethereum/consensus-specs/blob/aac851f860fa384916f62027b2dbe3318a354c5b/configs/minimal.yaml).
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            config_name: Cow::Borrowed("minimal"),
            slots_per_epoch: nonzero!(8_u64),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn start_and_stay_in(mut self, phase: Phase) -> Self {
        self.config_name = Cow::Owned(format!("{phase}-{}", self.config_name));
        self.upgrade_once(phase, GENESIS_EPOCH)
    }

    #[must_use]
    pub fn upgrade_once(mut self, post_phase: Phase, fork_epoch: Epoch) -> Self {
        for (phase, field) in self.fork_epochs_mut() {
            *field = match phase.cmp(&post_phase) {
                Ordering::Less => GENESIS_EPOCH,
                Ordering::Equal => fork_epoch,
                Ordering::Greater => FAR_FUTURE_EPOCH,
            };
        }

        self
    }

    #[must_use]
    pub const fn fork_epoch(&self, phase: Phase) -> Epoch {
        match phase {
            Phase::Phase0 => GENESIS_EPOCH,
            Phase::Altair => self.altair_fork_epoch,
            Phase::Bellatrix => self.bellatrix_fork_epoch,
            Phase::Capella => self.capella_fork_epoch,
            Phase::Deneb => self.deneb_fork_epoch,
        }
    }

    #[must_use]
    pub const fn epoch_at_slot(&self, slot: Slot) -> Epoch {
        slot / self.slots_per_epoch.get()
    }

    #[must_use]
    pub fn phase_at_epoch(&self, epoch: Epoch) -> Phase {
        self.fork_epochs()
            .take_while(|(_, fork_epoch)| *fork_epoch <= epoch)
            .map(|(phase, _)| phase)
            .last()
            .unwrap_or(Phase::Phase0)
    }

    #[must_use]
    pub fn phase_at_slot(&self, slot: Slot) -> Phase {
        self.phase_at_epoch(self.epoch_at_slot(slot))
    }

    fn fork_epochs(&self) -> impl Iterator<Item = (Phase, Epoch)> {
        // Do not remove the type annotation.
        // It ensures that this method is up to date when new phases are added.
        let fields: [_; Phase::CARDINALITY - 1] = [
            self.altair_fork_epoch,
            self.bellatrix_fork_epoch,
            self.capella_fork_epoch,
            self.deneb_fork_epoch,
        ];

        enum_iterator::all().skip(1).zip(fields)
    }

    fn fork_epochs_mut(&mut self) -> impl Iterator<Item = (Phase, &mut Epoch)> {
        // Do not remove the type annotation.
        // It ensures that this method is up to date when new phases are added.
        let fields: [_; Phase::CARDINALITY - 1] = [
            &mut self.altair_fork_epoch,
            &mut self.bellatrix_fork_epoch,
            &mut self.capella_fork_epoch,
            &mut self.deneb_fork_epoch,
        ];

        enum_iterator::all().skip(1).zip(fields)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    #[test_case(0, Phase::Phase0)]
    #[test_case(74239, Phase::Phase0)]
    #[test_case(74240, Phase::Altair)]
    #[test_case(144_896, Phase::Bellatrix)]
    #[test_case(194_047, Phase::Bellatrix)]
    #[test_case(194_048, Phase::Capella)]
    #[test_case(269_568, Phase::Deneb)]
    #[test_case(FAR_FUTURE_EPOCH, Phase::Deneb)]
    fn mainnet_phase_at_epoch(epoch: Epoch, expected_phase: Phase) {
        assert_eq!(Config::mainnet().phase_at_epoch(epoch), expected_phase);
    }

    #[test]
    fn phase_at_slot_uses_slots_per_epoch() {
        let config = Config::mainnet();
        let first_capella_slot = 194_048 * 32;

        assert_eq!(config.phase_at_slot(first_capella_slot - 1), Phase::Bellatrix);
        assert_eq!(config.phase_at_slot(first_capella_slot), Phase::Capella);
    }

    #[test]
    fn minimal_config_stays_in_phase0_by_default() {
        let config = Config::minimal();

        assert_eq!(config.epoch_at_slot(17), 2);
        assert_eq!(config.phase_at_slot(1_000_000), Phase::Phase0);
    }

    #[test]
    fn start_and_stay_in_enables_earlier_phases_at_genesis() {
        let config = Config::minimal().start_and_stay_in(Phase::Capella);

        assert_eq!(config.config_name, "capella-minimal");
        assert_eq!(config.fork_epoch(Phase::Bellatrix), GENESIS_EPOCH);
        assert_eq!(config.fork_epoch(Phase::Capella), GENESIS_EPOCH);
        assert_eq!(config.fork_epoch(Phase::Deneb), FAR_FUTURE_EPOCH);
        assert_eq!(config.phase_at_slot(0), Phase::Capella);
    }

    #[test]
    fn upgrade_once_schedules_a_single_fork() {
        let config = Config::minimal().upgrade_once(Phase::Deneb, 10);

        assert_eq!(config.phase_at_epoch(9), Phase::Capella);
        assert_eq!(config.phase_at_epoch(10), Phase::Deneb);
    }

    #[test]
    fn missing_variables_take_default_values() -> serde_json::Result<()> {
        let config = serde_json::from_value::<Config>(json!({
            "CONFIG_NAME": "custom",
            "BELLATRIX_FORK_EPOCH": 5,
            "SLOTS_PER_EPOCH": 4,
        }))?;

        assert_eq!(config.config_name, "custom");
        assert_eq!(config.fork_epoch(Phase::Bellatrix), 5);
        assert_eq!(config.fork_epoch(Phase::Capella), FAR_FUTURE_EPOCH);
        assert_eq!(config.phase_at_slot(20), Phase::Bellatrix);

        Ok(())
    }
}
