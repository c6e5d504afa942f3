use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Parameters of the Elo-style rating update.
///
/// A copy of this struct is frozen into every rating run so that historical
/// runs stay reproducible after the live configuration changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate)]
#[validate(schema(function = "validate_rating_bounds"))]
pub struct RatingConfig {
    pub base_rating: f64,

    #[validate(range(min = 1.0, message = "k_factor must be at least 1"))]
    pub k_factor: f64,

    /// Contests with fewer participants than this get the K multiplier.
    /// Zero disables the small-contest adjustment.
    #[validate(range(min = 0))]
    pub small_contest_threshold: i64,

    #[validate(range(min = 0.0, message = "multiplier must not be negative"))]
    pub small_contest_k_multiplier: f64,

    pub rating_floor: Option<f64>,
    pub rating_cap: Option<f64>,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            base_rating: 1200.0,
            k_factor: 24.0,
            small_contest_threshold: 5,
            small_contest_k_multiplier: 0.75,
            rating_floor: None,
            rating_cap: None,
        }
    }
}

impl RatingConfig {
    /// Clamp a rating into `[0, ∞)` and then into the configured bounds.
    pub fn clamp(&self, rating: f64) -> f64 {
        let mut clamped = rating.max(0.0);
        if let Some(floor) = self.rating_floor {
            clamped = clamped.max(floor);
        }
        if let Some(cap) = self.rating_cap {
            clamped = clamped.min(cap);
        }
        clamped
    }
}

fn validate_rating_bounds(config: &RatingConfig) -> Result<(), ValidationError> {
    if let (Some(floor), Some(cap)) = (config.rating_floor, config.rating_cap) {
        if floor > cap {
            let mut err = ValidationError::new("rating_bounds");
            err.message = Some("rating_floor must not exceed rating_cap".into());
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RatingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_floor_above_cap_is_rejected() {
        let config = RatingConfig {
            rating_floor: Some(2000.0),
            rating_cap: Some(1000.0),
            ..RatingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_k_factor_is_rejected() {
        let config = RatingConfig {
            k_factor: 0.0,
            ..RatingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_clamp_applies_bounds() {
        let config = RatingConfig {
            rating_floor: Some(800.0),
            rating_cap: Some(1600.0),
            ..RatingConfig::default()
        };
        assert_eq!(config.clamp(500.0), 800.0);
        assert_eq!(config.clamp(2000.0), 1600.0);
        assert_eq!(config.clamp(1234.5), 1234.5);
        assert_eq!(RatingConfig::default().clamp(-5.0), 0.0);
    }
}
