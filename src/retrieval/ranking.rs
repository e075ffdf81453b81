//! Ranking of candidate campaigns.
//!
//! The primary key is `ranking_score`, the number of similar users connected to the
//! campaign. Engagement only breaks ties between equal connection counts; remaining
//! ties fall back to the campaign id so output is fully deterministic.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::constants::SIMILAR_USERS_REASON;
use crate::model::{CampaignConnection, Recommendation};

/// Orders `connections` and attaches the recommendation reason.
///
/// Campaigns missing from `engagement` score `0`. Repeated campaign ids collapse to
/// the highest connection count seen.
pub fn rank_campaigns(
    connections: &[CampaignConnection],
    engagement: &HashMap<String, f64>,
) -> Vec<Recommendation> {
    let mut merged: HashMap<&str, u64> = HashMap::with_capacity(connections.len());
    for c in connections {
        let slot = merged.entry(c.campaign_id.as_str()).or_insert(0);
        *slot = (*slot).max(c.connections);
    }

    let mut ranked: Vec<(&str, u64, f64)> = merged
        .into_iter()
        .map(|(id, count)| (id, count, engagement_of(engagement, id)))
        .collect();

    ranked.sort_by(|a, b| compare(a, b));

    ranked
        .into_iter()
        .map(|(id, count, _)| Recommendation {
            campaign_id: id.to_string(),
            ranking_score: count,
            reason: SIMILAR_USERS_REASON.to_string(),
        })
        .collect()
}

fn engagement_of(engagement: &HashMap<String, f64>, campaign_id: &str) -> f64 {
    match engagement.get(campaign_id) {
        Some(score) if score.is_finite() => *score,
        _ => 0.0,
    }
}

fn compare(a: &(&str, u64, f64), b: &(&str, u64, f64)) -> Ordering {
    b.1.cmp(&a.1)
        .then_with(|| b.2.total_cmp(&a.2))
        .then_with(|| a.0.cmp(b.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: &str, n: u64) -> CampaignConnection {
        CampaignConnection::new(id, n)
    }

    fn ids(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.campaign_id.as_str()).collect()
    }

    #[test]
    fn test_sorts_by_connection_count_desc() {
        let recs = rank_campaigns(
            &[conn("c_1", 1), conn("c_2", 4), conn("c_3", 2)],
            &HashMap::new(),
        );
        assert_eq!(ids(&recs), vec!["c_2", "c_3", "c_1"]);
        assert_eq!(recs[0].ranking_score, 4);
    }

    #[test]
    fn test_engagement_breaks_ties_only() {
        let engagement = HashMap::from([
            ("c_a".to_string(), 10.0),
            ("c_b".to_string(), 99.0),
            ("c_c".to_string(), 1_000.0),
        ]);
        let recs = rank_campaigns(&[conn("c_a", 2), conn("c_b", 2), conn("c_c", 1)], &engagement);

        assert_eq!(ids(&recs), vec!["c_b", "c_a", "c_c"]);
        assert_eq!(
            recs.iter().map(|r| r.ranking_score).collect::<Vec<_>>(),
            vec![2, 2, 1]
        );
    }

    #[test]
    fn test_equal_engagement_falls_back_to_campaign_id() {
        let engagement = HashMap::from([("c_102".to_string(), 5.0), ("c_101".to_string(), 5.0)]);
        let recs = rank_campaigns(
            &[conn("c_102", 3), conn("c_101", 3), conn("c_103", 1)],
            &engagement,
        );
        assert_eq!(ids(&recs), vec!["c_101", "c_102", "c_103"]);
        assert!(recs.iter().all(|r| r.reason == SIMILAR_USERS_REASON));
    }

    #[test]
    fn test_missing_and_nan_engagement_score_zero() {
        let engagement = HashMap::from([("c_x".to_string(), f64::NAN), ("c_y".to_string(), 0.5)]);
        let recs = rank_campaigns(&[conn("c_x", 1), conn("c_y", 1), conn("c_z", 1)], &engagement);
        assert_eq!(ids(&recs), vec!["c_y", "c_x", "c_z"]);
    }

    #[test]
    fn test_duplicate_campaigns_collapse() {
        let recs = rank_campaigns(&[conn("c_1", 1), conn("c_1", 3)], &HashMap::new());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].ranking_score, 3);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let engagement = HashMap::from([("c_2".to_string(), 1.0)]);
        let a = rank_campaigns(&[conn("c_1", 2), conn("c_2", 2), conn("c_3", 5)], &engagement);
        let b = rank_campaigns(&[conn("c_3", 5), conn("c_2", 2), conn("c_1", 2)], &engagement);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank_campaigns(&[], &HashMap::new()).is_empty());
    }
}
