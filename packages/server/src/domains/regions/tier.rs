use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::governorate::Governorate;
use crate::domains::language::Dialect;

/// Collection cadence is expressed against this base period: a tier with
/// frequency `f` is collected every `BASE_PERIOD_SECS / f` seconds.
const BASE_PERIOD_SECS: f64 = 12.0 * 60.0;

/// Collection priority tiers, declared in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    Sulaymaniyah,
    Erbil,
    Baghdad,
    Basra,
    Duhok,
    Kirkuk,
    Other,
}

impl PriorityTier {
    pub const ALL: [PriorityTier; 7] = [
        PriorityTier::Sulaymaniyah,
        PriorityTier::Erbil,
        PriorityTier::Baghdad,
        PriorityTier::Basra,
        PriorityTier::Duhok,
        PriorityTier::Kirkuk,
        PriorityTier::Other,
    ];

    /// All tiers, highest priority first.
    pub fn all_in_order() -> [PriorityTier; 7] {
        Self::ALL
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sulaymaniyah => "sulaymaniyah",
            Self::Erbil => "erbil",
            Self::Baghdad => "baghdad",
            Self::Basra => "basra",
            Self::Duhok => "duhok",
            Self::Kirkuk => "kirkuk",
            Self::Other => "other",
        }
    }

    /// Collection frequency multiplier.
    pub fn frequency(&self) -> f64 {
        match self {
            Self::Sulaymaniyah => 6.0,
            Self::Erbil => 5.0,
            Self::Baghdad => 4.0,
            Self::Basra => 3.0,
            Self::Duhok => 2.0,
            Self::Kirkuk => 1.5,
            Self::Other => 0.5,
        }
    }

    /// 1-based priority order.
    pub fn priority_order(&self) -> i32 {
        match self {
            Self::Sulaymaniyah => 1,
            Self::Erbil => 2,
            Self::Baghdad => 3,
            Self::Basra => 4,
            Self::Duhok => 5,
            Self::Kirkuk => 6,
            Self::Other => 7,
        }
    }

    pub fn from_priority_order(order: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.priority_order() == order)
    }

    pub fn languages(&self) -> &'static [Dialect] {
        match self {
            Self::Sulaymaniyah | Self::Erbil => &[Dialect::Sorani, Dialect::Badini, Dialect::Kurmanji],
            Self::Baghdad => &[Dialect::Arabic, Dialect::English],
            Self::Basra | Self::Other => &[Dialect::Arabic],
            Self::Duhok => &[Dialect::Badini, Dialect::Kurmanji],
            Self::Kirkuk => &[Dialect::Kurmanji, Dialect::Arabic],
        }
    }

    pub fn governorates(&self) -> Vec<Governorate> {
        Governorate::ALL
            .into_iter()
            .filter(|g| g.tier() == *self)
            .collect()
    }

    /// The four most frequently collected tiers.
    pub fn is_high_priority(&self) -> bool {
        self.priority_order() <= 4
    }

    pub fn is_kurdistan(&self) -> bool {
        matches!(self, Self::Sulaymaniyah | Self::Erbil | Self::Duhok)
    }

    /// 2 minutes for Sulaymaniyah down to 24 minutes for the remaining governorates.
    pub fn collection_interval(&self) -> Duration {
        Duration::seconds((BASE_PERIOD_SECS / self.frequency()).round() as i64)
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorityTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        if let Some(tier) = Self::ALL.into_iter().find(|t| t.as_str() == key) {
            return Ok(tier);
        }
        Governorate::parse(s)
            .map(|g| g.tier())
            .ok_or_else(|| anyhow::anyhow!("unknown priority tier: {}", s))
    }
}

/// Influence weighted by the tier's frequency. The catch-all tier gets no
/// boost rather than being halved.
pub fn calculate_priority_score(tier: PriorityTier, influence: f64) -> i64 {
    let multiplier = match tier {
        PriorityTier::Other => 1.0,
        other => other.frequency(),
    };
    (influence * multiplier).round() as i64
}
