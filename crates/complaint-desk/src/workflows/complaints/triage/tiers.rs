use serde::{Deserialize, Serialize};

use super::super::domain::ComplaintCategory;

pub(crate) const HIGH_PRIORITY_THRESHOLD: u8 = 70;
pub(crate) const MEDIUM_PRIORITY_THRESHOLD: u8 = 40;
pub(crate) const ESSENTIAL_SERVICE_BONUS: u8 = 10;

const TIER_A_REASONING: &str =
    "Contains multiple emergency keywords and relates to critical infrastructure.";
const TIER_B_REASONING: &str = "Contains some urgent keywords or multiple maintenance issues.";
const TIER_C_REASONING: &str = "No emergency keywords detected, routine maintenance issue.";
pub(crate) const ESSENTIAL_SERVICE_REASONING: &str = " Essential service affected.";

/// Urgency band shown to authorities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Bands depend on the final score only, never on the tier that produced it.
    pub const fn from_score(score: u8) -> Self {
        if score >= HIGH_PRIORITY_THRESHOLD {
            Self::High
        } else if score >= MEDIUM_PRIORITY_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Branch of the heuristic that computed the base score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringTier {
    A,
    B,
    C,
}

impl ScoringTier {
    /// Evaluated in order A, B, C; the first matching branch wins.
    pub(crate) fn select(
        emergency_count: usize,
        maintenance_count: usize,
        category: ComplaintCategory,
    ) -> Self {
        if emergency_count > 2 || (emergency_count > 0 && category == ComplaintCategory::Water) {
            Self::A
        } else if emergency_count > 0 || maintenance_count > 2 {
            Self::B
        } else {
            Self::C
        }
    }

    pub(crate) fn base_score(self, emergency_count: usize, maintenance_count: usize) -> u8 {
        let bonus = match self {
            Self::A => (emergency_count * 5).min(20),
            Self::B => (emergency_count * 10 + maintenance_count * 5).min(30),
            Self::C => (maintenance_count * 10).min(30),
        };
        self.floor() + bonus as u8
    }

    const fn floor(self) -> u8 {
        match self {
            Self::A => 80,
            Self::B => 50,
            Self::C => 20,
        }
    }

    pub(crate) const fn reasoning(self) -> &'static str {
        match self {
            Self::A => TIER_A_REASONING,
            Self::B => TIER_B_REASONING,
            Self::C => TIER_C_REASONING,
        }
    }

    /// Band the tier was written for. May disagree with the final priority.
    pub const fn nominal_priority(self) -> Priority {
        match self {
            Self::A => Priority::High,
            Self::B => Priority::Medium,
            Self::C => Priority::Low,
        }
    }
}
