//! Elo-style rating update for a single contest.
//!
//! Every participant plays against one virtual opponent whose rating is the
//! field's mean. The actual score maps rank linearly onto `[0, 1]`, best rank
//! first. Nothing here touches storage.

use crate::models::{RankedResult, RatingConfig};

/// Computed outcome for one participant.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingChange {
    pub result_id: i64,
    pub user_id: i64,
    pub previous_rating: f64,
    pub new_rating: f64,
    /// Unclamped `K * (actual - expected)`. Differs from
    /// `new_rating - previous_rating` when a bound or the zero floor kicks in,
    /// or when an unset rating was computed from the base rating.
    pub delta: f64,
}

pub fn expected_score(player_rating: f64, opponent_rating: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent_rating - player_rating) / 400.0))
}

/// K for a field of `participants`, optionally overriding the configured
/// base K.
pub fn effective_k(config: &RatingConfig, participants: usize, k_override: Option<f64>) -> f64 {
    let mut k = k_override.unwrap_or(config.k_factor);
    let threshold = config.small_contest_threshold;
    if threshold > 0 && (participants as i64) < threshold {
        k *= config.small_contest_k_multiplier;
    }
    k
}

/// Rating changes for results already ordered best first. Fewer than two
/// participants yield nothing.
pub fn compute(
    results: &[RankedResult],
    config: &RatingConfig,
    k_override: Option<f64>,
) -> Vec<RatingChange> {
    let n = results.len();
    if n < 2 {
        return Vec::new();
    }

    let k = effective_k(config, n, k_override);
    let mean_rating = results.iter().map(|r| r.rating).sum::<f64>() / n as f64;
    let spread = (n - 1) as f64;

    results
        .iter()
        .map(|result| {
            // An unset rating of zero counts as the base rating.
            let current = if result.rating == 0.0 {
                config.base_rating
            } else {
                result.rating
            };
            let expected = expected_score(current, mean_rating);
            let actual = ((n as f64 - result.rank as f64) / spread).max(0.0);
            let delta = k * (actual - expected);

            RatingChange {
                result_id: result.result_id,
                user_id: result.user_id,
                // The stored rating, so a rollback restores it exactly.
                previous_rating: result.rating,
                new_rating: config.clamp(current + delta),
                delta,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(ratings: &[f64]) -> Vec<RankedResult> {
        ratings
            .iter()
            .enumerate()
            .map(|(i, rating)| RankedResult {
                result_id: i as i64 + 100,
                user_id: i as i64 + 1,
                rank: i as i64 + 1,
                score: 100.0 - i as f64,
                rating: *rating,
            })
            .collect()
    }

    #[test]
    fn test_fewer_than_two_participants_is_noop() {
        let config = RatingConfig::default();
        assert!(compute(&[], &config, None).is_empty());
        assert!(compute(&field(&[1500.0]), &config, None).is_empty());
    }

    #[test]
    fn test_equal_field_is_zero_sum() {
        let config = RatingConfig::default();
        for n in 2..12 {
            let changes = compute(&field(&vec![1200.0; n]), &config, None);
            assert_eq!(changes.len(), n);
            assert!(changes[0].delta > 0.0);
            assert!(changes[n - 1].delta < 0.0);

            let total: f64 = changes.iter().map(|c| c.delta).sum();
            assert!(total.abs() < 1e-9, "n={n} total={total}");
        }
    }

    #[test]
    fn test_unset_rating_is_recorded_as_stored() {
        let config = RatingConfig::default();
        let changes = compute(&field(&[0.0, 1200.0]), &config, None);

        assert_eq!(changes[0].previous_rating, 0.0);
        // Rated from the base, not from zero.
        assert!(changes[0].new_rating > config.base_rating);
        assert_eq!(changes[1].previous_rating, 1200.0);
    }

    #[test]
    fn test_deltas_decrease_with_rank() {
        let changes = compute(&field(&[1200.0; 6]), &RatingConfig::default(), None);
        for pair in changes.windows(2) {
            assert!(pair[0].delta > pair[1].delta);
        }
    }

    #[test]
    fn test_two_player_values() {
        let config = RatingConfig {
            small_contest_threshold: 0,
            ..RatingConfig::default()
        };
        let changes = compute(&field(&[1200.0, 1200.0]), &config, None);
        assert!((changes[0].delta - 12.0).abs() < 1e-9);
        assert!((changes[1].delta + 12.0).abs() < 1e-9);
        assert!((changes[0].new_rating - 1212.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_contest_multiplier() {
        let config = RatingConfig::default();
        assert_eq!(effective_k(&config, 3, None), 24.0 * 0.75);
        assert_eq!(effective_k(&config, 5, None), 24.0);
        assert_eq!(effective_k(&config, 3, Some(40.0)), 40.0 * 0.75);

        let disabled = RatingConfig {
            small_contest_threshold: 0,
            ..RatingConfig::default()
        };
        assert_eq!(effective_k(&disabled, 2, None), 24.0);
    }

    #[test]
    fn test_bounds_clamp_new_rating_but_not_delta() {
        let config = RatingConfig {
            rating_cap: Some(1205.0),
            rating_floor: Some(1195.0),
            small_contest_threshold: 0,
            ..RatingConfig::default()
        };
        let changes = compute(&field(&[1200.0, 1200.0]), &config, None);
        assert_eq!(changes[0].new_rating, 1205.0);
        assert_eq!(changes[1].new_rating, 1195.0);
        assert!((changes[0].delta - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_stronger_winner_gains_less() {
        let config = RatingConfig::default();
        let favourite = compute(&field(&[1600.0, 1200.0, 1200.0]), &config, None);
        let underdog = compute(&field(&[1200.0, 1600.0, 1200.0]), &config, None);
        assert!(favourite[0].delta < underdog[0].delta);
    }
}
