//! Keyword-driven priority triage for incoming complaints.
//!
//! Scoring is deterministic: the same title, description, and category always
//! produce the same score, band, and reasoning.

mod keywords;
mod tiers;

pub use keywords::KeywordSet;
pub use tiers::{Priority, ScoringTier};

use serde::{Deserialize, Serialize};

use super::domain::ComplaintInput;
use tiers::{ESSENTIAL_SERVICE_BONUS, ESSENTIAL_SERVICE_REASONING};

/// Upper bound of a score: tier A cap plus the essential-service bonus.
pub const MAX_SCORE: u8 = 110;

/// Triage output stored on each complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityScore {
    pub score: u8,
    pub priority: Priority,
    pub reasoning: String,
    pub tier: ScoringTier,
}

/// Stateless scorer holding the two keyword vocabularies.
#[derive(Debug, Clone)]
pub struct PriorityScorer {
    emergency: KeywordSet,
    maintenance: KeywordSet,
}

impl Default for PriorityScorer {
    fn default() -> Self {
        Self::new(KeywordSet::emergency(), KeywordSet::maintenance())
    }
}

impl PriorityScorer {
    pub fn new(emergency: KeywordSet, maintenance: KeywordSet) -> Self {
        Self {
            emergency,
            maintenance,
        }
    }

    pub fn score(&self, complaint: &ComplaintInput) -> PriorityScore {
        let text = format!("{} {}", complaint.title, complaint.description).to_lowercase();
        let emergency_count = self.emergency.count_present(&text);
        let maintenance_count = self.maintenance.count_present(&text);

        let tier = ScoringTier::select(emergency_count, maintenance_count, complaint.category);
        let mut score = tier.base_score(emergency_count, maintenance_count);
        let mut reasoning = tier.reasoning().to_string();

        if complaint.category.is_essential_service() {
            score += ESSENTIAL_SERVICE_BONUS;
            reasoning.push_str(ESSENTIAL_SERVICE_REASONING);
        }

        PriorityScore {
            score,
            priority: Priority::from_score(score),
            reasoning,
            tier,
        }
    }
}
