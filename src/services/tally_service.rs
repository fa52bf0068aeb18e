// src/services/tally_service.rs
//
// Derives chart-ready aggregates from the submitted vote counts. Pure
// recomputation over the current submission list on every request; no
// aggregate state is ever persisted.
use crate::{
    error::{AppError, AppResult},
    models::tally::{CenterSummary, PartyTotal, PieSlice, TallyOverview, VoteSubmission, PARTIES},
    store::{self, KvStore, SUBMISSIONS_KEY},
};
use serde_json::Value;

/// Vote-count coercion for externally produced submissions: numbers and
/// numeric strings count, anything else (missing, null, junk, negative)
/// is 0.
pub fn vote_count(value: &Value) -> u64 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() && n > 0.0 => n as u64,
        _ => 0,
    }
}

/// Per-party totals across all submissions, in canonical party order.
pub fn totals_by_party(submissions: &[VoteSubmission]) -> Vec<PartyTotal> {
    PARTIES
        .iter()
        .map(|party| {
            let votes = submissions
                .iter()
                .map(|sub| sub.party_votes.get(party.id).map_or(0, vote_count))
                .sum();
            PartyTotal {
                id: party.id,
                name: party.name,
                color: party.color,
                votes,
            }
        })
        .collect()
}

/// Per-center roll-up. The leading party is the maximum over
/// `partyVotes` entries in document order, replaced only on strictly
/// greater values, so the first-inserted party wins exact ties.
pub fn per_center_summary(submissions: &[VoteSubmission]) -> Vec<CenterSummary> {
    submissions
        .iter()
        .enumerate()
        .map(|(idx, sub)| {
            let mut leading_party: Option<&str> = None;
            let mut leading_votes = 0u64;
            for (party, value) in &sub.party_votes {
                let count = vote_count(value);
                if count > leading_votes {
                    leading_party = Some(party);
                    leading_votes = count;
                }
            }

            let id = if sub.polling_center.is_empty() {
                format!("center-{idx}")
            } else {
                sub.polling_center.clone()
            };
            let name = if !sub.polling_center_name.is_empty() {
                sub.polling_center_name.clone()
            } else if !sub.polling_center.is_empty() {
                sub.polling_center.clone()
            } else {
                "Polling Center".to_string()
            };

            CenterSummary {
                id,
                name,
                votes_cast: vote_count(&sub.total_votes),
                leading_party: leading_party.unwrap_or("N/A").to_string(),
                leading_votes,
            }
        })
        .collect()
}

/// Rounds a chart maximum up to a human-friendly ceiling (10, 20, 50,
/// 100, ...) so gridlines stay legible.
pub fn nice_ceil(value: f64) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    let magnitude = 10f64.powf(value.log10().floor());
    let normalized = value / magnitude;
    let nice = if normalized > 5.0 {
        10.0
    } else if normalized > 3.0 {
        5.0
    } else if normalized > 2.0 {
        3.0
    } else if normalized > 1.0 {
        2.0
    } else {
        1.0
    };
    nice * magnitude
}

/// Axis ceiling for a series: the nice ceiling of the maximum, clamped
/// to at least `min_floor`.
pub fn axis_scale(values: &[f64], min_floor: f64) -> f64 {
    let max = values.iter().copied().fold(0.0, f64::max);
    nice_ceil(max).max(min_floor)
}

/// Percentage-mode axis: same scale, but never above 100%.
pub fn percentage_axis_scale(values: &[f64]) -> f64 {
    axis_scale(values, 10.0).min(100.0)
}

/// Converts party totals into proportional pie wedges, accumulating the
/// angle offset in input order. A zero grand total yields no slices at
/// all; individual zero-vote parties yield zero-width slices.
pub fn pie_slices(totals: &[PartyTotal]) -> Vec<PieSlice> {
    let grand_total: u64 = totals.iter().map(|t| t.votes).sum();
    if grand_total == 0 {
        return Vec::new();
    }

    let mut angle = 0.0;
    totals
        .iter()
        .map(|t| {
            let span = (t.votes as f64 / grand_total as f64) * 360.0;
            let slice = PieSlice {
                id: t.id,
                name: t.name,
                color: t.color,
                votes: t.votes,
                start_angle: angle,
                end_angle: angle + span,
            };
            angle += span;
            slice
        })
        .collect()
}

fn polar_to_cartesian(cx: f64, cy: f64, radius: f64, angle_degrees: f64) -> (f64, f64) {
    // Angles run clockwise from 12 o'clock, hence the 90° rotation
    let rad = (angle_degrees - 90.0).to_radians();
    (cx + radius * rad.cos(), cy + radius * rad.sin())
}

/// SVG path for one pie wedge: center, line to the arc, sweep back,
/// close. The large-arc flag kicks in past a 180° span.
pub fn arc_path(cx: f64, cy: f64, radius: f64, start_angle: f64, end_angle: f64) -> String {
    let (sx, sy) = polar_to_cartesian(cx, cy, radius, end_angle);
    let (ex, ey) = polar_to_cartesian(cx, cy, radius, start_angle);
    let large_arc = if end_angle - start_angle > 180.0 { 1 } else { 0 };
    format!("M {cx} {cy} L {sx} {sy} A {radius} {radius} 0 {large_arc} 0 {ex} {ey} Z")
}

/// Headline stats for the trends page. Leading party keeps the earlier
/// entry on ties; the participating count falls back to the full roster
/// when no votes exist yet.
pub fn overview(totals: &[PartyTotal]) -> TallyOverview {
    let total_votes = totals.iter().map(|t| t.votes).sum();

    let mut leading_id = "N/A".to_string();
    let mut leading_votes = 0u64;
    for t in totals {
        if t.votes > leading_votes {
            leading_id = t.id.to_string();
            leading_votes = t.votes;
        }
    }

    let nonzero = totals.iter().filter(|t| t.votes > 0).count();
    let participating = if nonzero == 0 { totals.len() } else { nonzero };

    TallyOverview {
        total_votes,
        leading_id,
        leading_votes,
        participating,
    }
}

// --- Submission storage ---

/// Reads the submission list; a never-written key is an empty list.
pub fn load_submissions(store: &dyn KvStore) -> AppResult<Vec<VoteSubmission>> {
    Ok(store::load_json(store, SUBMISSIONS_KEY)?.unwrap_or_default())
}

/// The one-submission-per-center lock.
pub fn has_submitted(submissions: &[VoteSubmission], center_id: &str) -> bool {
    submissions.iter().any(|s| s.polling_center == center_id)
}

/// Builds a submission from entered counts, keyed in roster order.
pub fn new_submission(center_id: &str, center_name: &str, counts: &[(&str, u64)]) -> VoteSubmission {
    let mut party_votes = serde_json::Map::new();
    let mut total = 0u64;
    for (party, votes) in counts {
        party_votes.insert(party.to_string(), Value::from(*votes));
        total += votes;
    }
    VoteSubmission {
        polling_center: center_id.to_string(),
        polling_center_name: center_name.to_string(),
        total_votes: Value::from(total),
        party_votes,
    }
}

/// Appends a center's counts, enforcing the one-time lock.
pub fn record_submission(store: &dyn KvStore, submission: VoteSubmission) -> AppResult<()> {
    let mut submissions = load_submissions(store)?;
    if has_submitted(&submissions, &submission.polling_center) {
        tracing::warn!(
            "Rejected duplicate submission from center {}",
            submission.polling_center
        );
        return Err(AppError::Validation(format!(
            "Polling center {} has already submitted its vote counts",
            submission.polling_center
        )));
    }

    tracing::info!(
        "✅ Vote counts recorded for center {} ({} total)",
        submission.polling_center,
        vote_count(&submission.total_votes)
    );
    submissions.push(submission);
    store::save_json(store, SUBMISSIONS_KEY, &submissions)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn submission(raw: Value) -> VoteSubmission {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn totals_sum_across_submissions_with_junk_zeroed() {
        let subs = vec![
            submission(json!({
                "pollingCenter": "C1",
                "pollingCenterName": "Center One",
                "totalVotes": 20,
                "partyVotes": {"PA": 5, "PB": "12", "PC": null, "PF": "junk"}
            })),
            submission(json!({
                "pollingCenter": "C2",
                "totalVotes": 9,
                "partyVotes": {"PA": 4, "PB": 5}
            })),
        ];

        let totals = totals_by_party(&subs);
        assert_eq!(totals.len(), PARTIES.len());
        assert_eq!(totals[0].id, "PA");
        assert_eq!(totals[0].votes, 9);
        assert_eq!(totals[1].votes, 17); // PB: 12 (numeric string) + 5
        assert_eq!(totals[2].votes, 0); // PC: null coerces to 0
        assert_eq!(totals[5].votes, 0); // PF: junk coerces to 0
        assert_eq!(totals[6].votes, 0); // IND: absent everywhere
    }

    #[test]
    fn leading_party_is_strict_maximum() {
        let subs = vec![submission(json!({
            "pollingCenter": "C1",
            "partyVotes": {"A": 5, "B": 9}
        }))];
        let centers = per_center_summary(&subs);
        assert_eq!(centers[0].leading_party, "B");
        assert_eq!(centers[0].leading_votes, 9);
    }

    #[test]
    fn leading_party_tie_keeps_first_inserted() {
        let subs = vec![submission(json!({
            "pollingCenter": "C1",
            "partyVotes": {"X": 4, "Y": 4}
        }))];
        let centers = per_center_summary(&subs);
        assert_eq!(centers[0].leading_party, "X");
        assert_eq!(centers[0].leading_votes, 4);
    }

    #[test]
    fn center_summary_fallbacks() {
        let subs = vec![
            submission(json!({"partyVotes": {}})),
            submission(json!({"pollingCenter": "PC-9", "totalVotes": "77"})),
        ];
        let centers = per_center_summary(&subs);

        assert_eq!(centers[0].id, "center-0");
        assert_eq!(centers[0].name, "Polling Center");
        assert_eq!(centers[0].leading_party, "N/A");
        assert_eq!(centers[0].votes_cast, 0);

        assert_eq!(centers[1].id, "PC-9");
        assert_eq!(centers[1].name, "PC-9");
        assert_eq!(centers[1].votes_cast, 77);
    }

    #[test]
    fn nice_ceil_picks_friendly_multipliers() {
        assert_eq!(nice_ceil(47.0), 50.0);
        assert_eq!(nice_ceil(0.0), 0.0);
        assert_eq!(nice_ceil(1.0), 1.0);
        assert_eq!(nice_ceil(2.5), 3.0);
        assert_eq!(nice_ceil(35.0), 50.0);
        assert_eq!(nice_ceil(350.0), 500.0);
        assert_eq!(nice_ceil(7.0), 10.0);
        assert_eq!(nice_ceil(1000.0), 1000.0);
    }

    #[test]
    fn axis_scale_clamps_to_floor() {
        assert_eq!(axis_scale(&[0.0], 10.0), 10.0);
        assert_eq!(axis_scale(&[], 10.0), 10.0);
        assert_eq!(axis_scale(&[47.0], 10.0), 50.0);
    }

    #[test]
    fn percentage_axis_never_exceeds_100() {
        assert_eq!(percentage_axis_scale(&[250.0]), 100.0);
        assert_eq!(percentage_axis_scale(&[42.0]), 50.0);
        assert_eq!(percentage_axis_scale(&[0.0]), 10.0);
    }

    #[test]
    fn pie_slices_partition_the_full_circle() {
        let totals = vec![
            PartyTotal { id: "PA", name: "Party A", color: "#111", votes: 10 },
            PartyTotal { id: "PB", name: "Party B", color: "#222", votes: 30 },
            PartyTotal { id: "PC", name: "Party C", color: "#333", votes: 60 },
        ];
        let slices = pie_slices(&totals);
        assert_eq!(slices.len(), 3);
        assert_eq!((slices[0].start_angle, slices[0].end_angle), (0.0, 36.0));
        assert_eq!((slices[1].start_angle, slices[1].end_angle), (36.0, 144.0));
        assert_eq!((slices[2].start_angle, slices[2].end_angle), (144.0, 360.0));
    }

    #[test]
    fn pie_slices_empty_on_zero_total_but_keep_zero_vote_parties_otherwise() {
        let zeroes = vec![PartyTotal { id: "PA", name: "Party A", color: "#111", votes: 0 }];
        assert!(pie_slices(&zeroes).is_empty());

        let mixed = vec![
            PartyTotal { id: "PA", name: "Party A", color: "#111", votes: 0 },
            PartyTotal { id: "PB", name: "Party B", color: "#222", votes: 50 },
        ];
        let slices = pie_slices(&mixed);
        assert_eq!(slices[0].start_angle, slices[0].end_angle);
        assert_eq!((slices[1].start_angle, slices[1].end_angle), (0.0, 360.0));
    }

    #[test]
    fn arc_path_sets_large_arc_flag_past_half_circle() {
        let minor = arc_path(160.0, 160.0, 120.0, 0.0, 90.0);
        let major = arc_path(160.0, 160.0, 120.0, 90.0, 360.0);
        assert!(minor.starts_with("M 160 160 L"));
        assert!(minor.contains("A 120 120 0 0 0"));
        assert!(major.contains("A 120 120 0 1 0"));
    }

    #[test]
    fn arc_endpoints_rotate_from_twelve_oclock() {
        // A 0°–90° wedge runs from straight up to due right
        let path = arc_path(0.0, 0.0, 100.0, 0.0, 90.0);
        let nums: Vec<f64> = path
            .split_whitespace()
            .filter_map(|t| t.parse().ok())
            .collect();
        // M cx cy L sx sy A r r 0 flag 0 ex ey
        let (sx, sy) = (nums[2], nums[3]);
        let (ex, ey) = (nums[nums.len() - 2], nums[nums.len() - 1]);
        assert!((sx - 100.0).abs() < 1e-9 && sy.abs() < 1e-9); // end angle, due right
        assert!(ex.abs() < 1e-9 && (ey + 100.0).abs() < 1e-9); // start angle, straight up
    }

    #[test]
    fn overview_handles_ties_and_empty_field() {
        let totals = vec![
            PartyTotal { id: "PA", name: "Party A", color: "#111", votes: 8 },
            PartyTotal { id: "PB", name: "Party B", color: "#222", votes: 8 },
            PartyTotal { id: "PC", name: "Party C", color: "#333", votes: 2 },
        ];
        let stats = overview(&totals);
        assert_eq!(stats.total_votes, 18);
        assert_eq!(stats.leading_id, "PA"); // tie keeps the earlier party
        assert_eq!(stats.participating, 3);

        let silent = vec![PartyTotal { id: "PA", name: "Party A", color: "#111", votes: 0 }];
        let stats = overview(&silent);
        assert_eq!(stats.leading_id, "N/A");
        assert_eq!(stats.participating, 1); // falls back to roster size
    }

    #[test]
    fn submissions_lock_after_first_record() {
        let store = MemoryStore::new();
        assert!(load_submissions(&store).unwrap().is_empty());

        let first = new_submission("PC-DHK-001", "Dhaka College", &[("PA", 5), ("PB", 9)]);
        record_submission(&store, first).unwrap();

        let stored = load_submissions(&store).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(vote_count(&stored[0].total_votes), 14);
        assert!(has_submitted(&stored, "PC-DHK-001"));

        let dup = new_submission("PC-DHK-001", "Dhaka College", &[("PA", 1)]);
        let err = record_submission(&store, dup).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(load_submissions(&store).unwrap().len(), 1);
    }

    #[test]
    fn new_submission_keys_follow_entry_order() {
        let sub = new_submission("C1", "One", &[("PA", 1), ("PB", 2), ("IND", 3)]);
        let keys: Vec<&str> = sub.party_votes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["PA", "PB", "IND"]);
    }
}
