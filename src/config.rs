//! Engine configuration
//!
//! One serde-deserializable structure carries every tunable the algorithms
//! take: relation priors for weight normalization, random-walk parameters,
//! activation decay, traversal bounds and the edge-list reader policy. Missing
//! JSON fields fall back to the defaults below.
//!
//! # Example
//!
//! ```
//! use concept_graph::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "walk": { "alpha": 0.5 } }"#).unwrap();
//! assert_eq!(config.walk.alpha, 0.5);
//! assert_eq!(config.walk.steps, 3);
//! assert_eq!(config.activation.decay, 0.8);
//! ```

use crate::algorithms::activation::DEFAULT_DECAY;
use crate::error::{GraphError, Result};
use crate::storage::LoadOptions;
use crate::weighting::RelationTable;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Random-walk parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Continuation probability per step, in `[0, 1]`
    pub alpha: f32,
    /// Walk length for the finite walk (>= 1)
    pub steps: u32,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            alpha: 0.8,
            steps: 3,
        }
    }
}

/// Spreading-activation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    /// Multiplier applied to each recomputed activation
    pub decay: f32,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            decay: DEFAULT_DECAY,
        }
    }
}

/// Bounds for growing a graph from term associations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Hops from the source term beyond which nodes are not expanded
    pub max_dist: usize,
    /// Associated terms taken per expanded node (0 = all)
    pub max_context: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_dist: 3,
            max_context: 100,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Relation-label priors and groups used by weight normalization
    pub relations: RelationTable,
    /// Random-walk parameters
    pub walk: WalkConfig,
    /// Spreading-activation parameters
    pub activation: ActivationConfig,
    /// Largest distance returned by context extraction
    pub context_radius: usize,
    /// Largest number of edges in an enumerated path
    pub max_path_len: usize,
    /// Associations at or below this score are dropped when loading
    pub association_threshold: f32,
    /// Association-driven graph expansion bounds
    pub expansion: ExpansionConfig,
    /// Edge-list reader policy
    pub load: LoadOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            relations: RelationTable::default(),
            walk: WalkConfig::default(),
            activation: ActivationConfig::default(),
            context_radius: 3,
            max_path_len: 3,
            association_threshold: 0.001,
            expansion: ExpansionConfig::default(),
            load: LoadOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Check every value is in range
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        let alpha = self.walk.alpha;
        if !alpha.is_finite() || !(0.0..=1.0).contains(&alpha) {
            return Err(GraphError::invalid_parameter(format!(
                "walk.alpha must be in [0, 1], got {alpha}"
            )));
        }
        if self.walk.steps == 0 {
            return Err(GraphError::invalid_parameter("walk.steps must be >= 1"));
        }

        let decay = self.activation.decay;
        if !decay.is_finite() || decay < 0.0 {
            return Err(GraphError::invalid_parameter(format!(
                "activation.decay must be finite and non-negative, got {decay}"
            )));
        }
        if !self.association_threshold.is_finite() {
            return Err(GraphError::invalid_parameter("association_threshold must be finite"));
        }
        if !(1..=3).contains(&self.relations.default_group) {
            return Err(GraphError::invalid_parameter(format!(
                "relations.default_group must be 1, 2 or 3, got {}",
                self.relations.default_group
            )));
        }
        if let Some((label, weight)) = self.relations.weights.iter().find(|(_, w)| !w.is_finite()) {
            return Err(GraphError::invalid_parameter(format!(
                "relation weight for {label:?} must be finite, got {weight}"
            )));
        }

        Ok(())
    }

    /// Parse and validate a JSON configuration
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is invalid or a value is out of range
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse engine config")?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json_string(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize engine config")
    }

    /// Load and validate a JSON configuration file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid JSON, or holds an
    /// out-of-range value
    pub async fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_json_str(&json).with_context(|| format!("Invalid config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let config = EngineConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.walk.alpha, 0.8);
        assert_eq!(config.context_radius, 3);
        assert_eq!(config.expansion.max_context, 100);
        assert!(!config.load.skip_malformed);
        assert_eq!(config.relations.weights.len(), 20);
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(EngineConfig::from_json_str("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json_str(
            r#"{ "load": { "skip_malformed": true }, "relations": { "default_group": 2 } }"#,
        )
        .unwrap();

        assert!(config.load.skip_malformed);
        assert_eq!(config.relations.default_group, 2);
        assert_eq!(config.relations.weights.len(), 20);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = EngineConfig::default();
        config.walk.steps = 5;
        config.relations.weights.insert("RelatedTo".to_string(), 0.05);

        let json = config.to_json_string().unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_validate_rejects() {
        let cases = [
            r#"{ "walk": { "alpha": 1.5 } }"#,
            r#"{ "walk": { "steps": 0 } }"#,
            r#"{ "activation": { "decay": -0.1 } }"#,
            r#"{ "relations": { "default_group": 4 } }"#,
        ];

        for json in cases {
            assert!(EngineConfig::from_json_str(json).is_err(), "{json} should be rejected");
        }
    }

    #[test]
    fn test_validate_error_kind() {
        let mut config = EngineConfig::default();
        config.walk.alpha = f32::NAN;

        assert!(matches!(config.validate(), Err(GraphError::InvalidParameter { .. })));
    }
}
