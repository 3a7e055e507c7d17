use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    Sequence,
    AsRefStr,
    Display,
    EnumString,
    Deserialize,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Phase {
    Phase0,
    Altair,
    Bellatrix,
    Capella,
    Deneb,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_ordered_by_activation() {
        assert!(Phase::Phase0 < Phase::Bellatrix);
        assert!(Phase::Capella < Phase::Deneb);
        assert_eq!(enum_iterator::last::<Phase>(), Some(Phase::Deneb));
    }

    #[test]
    fn phases_are_parsed_case_insensitively() {
        assert_eq!("Capella".parse(), Ok(Phase::Capella));
        assert_eq!("deneb".parse(), Ok(Phase::Deneb));
        assert_eq!(Phase::Bellatrix.to_string(), "bellatrix");
    }
}
