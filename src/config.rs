//! Engine configuration: the tunable constants of a tournament format.

use crate::models::CompetitionError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Touches needed to win a pool bout.
    pub pool_touch_limit: u32,
    /// Touches needed to win an elimination bout.
    pub elimination_touch_limit: u32,
    /// Smallest bracket ever built; must be a power of two.
    pub min_bracket_size: usize,
    /// Qualifier cutoff given to newly created competitions.
    pub default_qualifier_cutoff: usize,
    /// Seed data tops the roster up to at least this many fencers.
    pub min_seed_competitors: usize,
    /// Seed data tops the referee roster up to at least this many.
    pub min_seed_referees: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool_touch_limit: 5,
            elimination_touch_limit: 15,
            min_bracket_size: 8,
            default_qualifier_cutoff: 16,
            min_seed_competitors: 32,
            min_seed_referees: 16,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), CompetitionError> {
        if self.pool_touch_limit == 0 || self.elimination_touch_limit == 0 {
            return Err(CompetitionError::InvalidConfiguration(
                "touch limits must be positive".into(),
            ));
        }
        if self.min_bracket_size < 2 || !self.min_bracket_size.is_power_of_two() {
            return Err(CompetitionError::InvalidConfiguration(format!(
                "minimum bracket size {} is not a power of two >= 2",
                self.min_bracket_size
            )));
        }
        Ok(())
    }

    /// Bracket slots for `qualifiers` fencers: next power of two, never below the minimum.
    pub fn bracket_size(&self, qualifiers: usize) -> usize {
        qualifiers.next_power_of_two().max(self.min_bracket_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracket_size_rounds_up_with_minimum() {
        let c = EngineConfig::default();
        assert_eq!(c.bracket_size(2), 8);
        assert_eq!(c.bracket_size(5), 8);
        assert_eq!(c.bracket_size(8), 8);
        assert_eq!(c.bracket_size(9), 16);
        assert_eq!(c.bracket_size(33), 64);

        let small = EngineConfig {
            min_bracket_size: 2,
            ..EngineConfig::default()
        };
        assert_eq!(small.bracket_size(3), 4);
    }

    #[test]
    fn rejects_non_power_of_two_minimum() {
        let c = EngineConfig {
            min_bracket_size: 6,
            ..EngineConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(CompetitionError::InvalidConfiguration(_))
        ));
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let c: EngineConfig = serde_json::from_str(r#"{ "min_bracket_size": 4 }"#).unwrap();
        assert_eq!(c.min_bracket_size, 4);
        assert_eq!(c.elimination_touch_limit, 15);
    }
}
