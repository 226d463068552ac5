//! Agent configuration

use serde::{Deserialize, Serialize};

use crate::AgentError;

/// Which end of an estimated stat range the evaluator assumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatMode {
    Min,
    Max,
    #[default]
    Mid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Stat assumption for unseen opponent stats
    pub stat_mode: StatMode,

    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,

    /// Chance of picking a viable status move over a strong attack
    pub status_move_chance: f64,

    /// Chance of staying in after either side switched last turn
    pub stay_after_switch_chance: f64,

    /// HP percentage below which recovery moves are worth using
    pub heal_threshold: u32,

    /// How much a switch-in's matchup has to exceed the active's to switch
    pub switch_margin: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            stat_mode: StatMode::Mid,
            seed: None,
            status_move_chance: 0.3,
            stay_after_switch_chance: 0.5,
            heal_threshold: 60,
            switch_margin: 0.0,
        }
    }
}

impl AgentConfig {
    /// Parse a configuration, filling unset fields with defaults
    pub fn from_json(json: &str) -> Result<Self, AgentError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AgentError> {
        for (name, value) in [
            ("status_move_chance", self.status_move_chance),
            ("stay_after_switch_chance", self.stay_after_switch_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AgentError::InvalidProbability { name, value });
            }
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AgentConfig::from_json(r#"{"stat_mode":"max","seed":7}"#).unwrap();
        assert_eq!(config.stat_mode, StatMode::Max);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.heal_threshold, 60);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = AgentConfig::from_json(r#"{"status_move_chance":1.5}"#).unwrap_err();
        assert!(matches!(
            err,
            AgentError::InvalidProbability {
                name: "status_move_chance",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            AgentConfig::from_json("{"),
            Err(AgentError::InvalidConfig(_))
        ));
    }
}
