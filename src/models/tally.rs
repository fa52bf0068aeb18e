// src/models/tally.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A registered party as shown on ballots and charts.
#[derive(Debug, Clone, Copy)]
pub struct Party {
    pub id: &'static str,
    pub name: &'static str,
    pub color: &'static str,
}

/// The fixed party roster, in canonical display order. Tally output and
/// officer vote-entry rows both follow this order.
pub const PARTIES: &[Party] = &[
    Party { id: "PA", name: "Party A", color: "#10b981" },
    Party { id: "PB", name: "Party B", color: "#3b82f6" },
    Party { id: "PC", name: "Party C", color: "#f59e0b" },
    Party { id: "PD", name: "Party D", color: "#a855f7" },
    Party { id: "PE", name: "Party E", color: "#ec4899" },
    Party { id: "PF", name: "Party F", color: "#ef4444" },
    Party { id: "IND", name: "Independent", color: "#6b7280" },
];

pub fn party_by_id(id: &str) -> Option<&'static Party> {
    PARTIES.iter().find(|p| p.id == id)
}

/// One polling center's submitted counts, as stored under
/// `votesSubmissions`. Values are kept as raw JSON because externally
/// produced submissions may carry missing or non-numeric entries; the
/// aggregator coerces those to 0. `party_votes` keeps document order —
/// the leading-party tie-break depends on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSubmission {
    #[serde(default)]
    pub polling_center: String,
    #[serde(default)]
    pub polling_center_name: String,
    #[serde(default)]
    pub total_votes: Value,
    #[serde(default)]
    pub party_votes: serde_json::Map<String, Value>,
}

/// Running per-party sum across all submissions. Derived, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PartyTotal {
    pub id: &'static str,
    pub name: &'static str,
    pub color: &'static str,
    pub votes: u64,
}

/// Per-polling-center roll-up for the trends bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct CenterSummary {
    pub id: String,
    pub name: String,
    pub votes_cast: u64,
    pub leading_party: String,
    pub leading_votes: u64,
}

/// A party's proportional wedge of the vote-share pie, in degrees
/// clockwise from 12 o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub id: &'static str,
    pub name: &'static str,
    pub color: &'static str,
    pub votes: u64,
    pub start_angle: f64,
    pub end_angle: f64,
}

/// Headline numbers for the trends stat cards.
#[derive(Debug, Clone)]
pub struct TallyOverview {
    pub total_votes: u64,
    pub leading_id: String,
    pub leading_votes: u64,
    pub participating: usize,
}
