//! Closed classification of every monetary movement in the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category attached to a spend, a credit line, or a logged money event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum CostTag {
    Rent,
    Wages,
    Operating,
    Supplier,
    Food,
    Upgrade,
    Activity,
    Security,
    Bouncer,
    Event,
    Maintenance,
    Interest,
    #[default]
    Other,
}

impl CostTag {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Wages => "wages",
            Self::Operating => "operating",
            Self::Supplier => "supplier",
            Self::Food => "food",
            Self::Upgrade => "upgrade",
            Self::Activity => "activity",
            Self::Security => "security",
            Self::Bouncer => "bouncer",
            Self::Event => "event",
            Self::Maintenance => "maintenance",
            Self::Interest => "interest",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for CostTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostTag {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rent" => Ok(Self::Rent),
            "wages" => Ok(Self::Wages),
            "operating" => Ok(Self::Operating),
            "supplier" => Ok(Self::Supplier),
            "food" => Ok(Self::Food),
            "upgrade" => Ok(Self::Upgrade),
            "activity" => Ok(Self::Activity),
            "security" => Ok(Self::Security),
            "bouncer" => Ok(Self::Bouncer),
            "event" => Ok(Self::Event),
            "maintenance" => Ok(Self::Maintenance),
            "interest" => Ok(Self::Interest),
            "other" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

impl From<CostTag> for String {
    fn from(value: CostTag) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_from_str() {
        for tag in [
            CostTag::Rent,
            CostTag::Wages,
            CostTag::Security,
            CostTag::Interest,
            CostTag::Other,
        ] {
            assert_eq!(tag.as_str().parse::<CostTag>(), Ok(tag));
        }
        assert!("karaoke".parse::<CostTag>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&CostTag::Maintenance).unwrap();
        assert_eq!(json, "\"maintenance\"");
        let back: CostTag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CostTag::Maintenance);
    }
}
