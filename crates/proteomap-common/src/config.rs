//! Configuration loading for proteomap.
//! Reads proteomap.toml from the current directory or the path in PROTEOMAP_CONFIG.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ProteomapError, Result};

pub const CONFIG_ENV: &str = "PROTEOMAP_CONFIG";
pub const MIN_STRENGTH_ENV: &str = "PROTEOMAP_MIN_ASSOCIATION_STRENGTH";
const DEFAULT_CONFIG_PATH: &str = "proteomap.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub weights: WeightsConfig,
}

// ── Pipeline ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Associations whose raw strength is below this are dropped.
    #[serde(default = "default_min_strength")]
    pub min_association_strength: f64,
    /// Upper bound on accepted diseases per generation run.
    #[serde(default = "default_max_diseases")]
    pub max_diseases: usize,
}

fn default_min_strength() -> f64   { 0.3 }
fn default_max_diseases() -> usize { 200 }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_association_strength: default_min_strength(),
            max_diseases: default_max_diseases(),
        }
    }
}

// ── Scoring ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_opportunity_limit")]
    pub opportunity_limit: usize,
    #[serde(default = "default_repurposing_min_strength")]
    pub repurposing_min_strength: f64,
    #[serde(default = "default_hub_min_diseases")]
    pub hub_min_diseases: usize,
    #[serde(default = "default_cluster_min_shared")]
    pub cluster_min_shared_proteins: usize,
    #[serde(default = "default_multi_indication_min")]
    pub multi_indication_min: usize,
}

fn default_opportunity_limit() -> usize        { 20 }
fn default_repurposing_min_strength() -> f64   { 0.4 }
fn default_hub_min_diseases() -> usize         { 5 }
fn default_cluster_min_shared() -> usize       { 3 }
fn default_multi_indication_min() -> usize     { 3 }

pub const MAX_OPPORTUNITY_LIMIT: usize = 100;

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            opportunity_limit: default_opportunity_limit(),
            repurposing_min_strength: default_repurposing_min_strength(),
            hub_min_diseases: default_hub_min_diseases(),
            cluster_min_shared_proteins: default_cluster_min_shared(),
            multi_indication_min: default_multi_indication_min(),
        }
    }
}

impl ScoringConfig {
    /// Opportunity limit clamped to 1..=100.
    pub fn effective_opportunity_limit(&self) -> usize {
        self.opportunity_limit.clamp(1, MAX_OPPORTUNITY_LIMIT)
    }
}

// ── Weights ──────────────────────────────────────────────────────────────────

/// Multipliers used by the opportunity and repurposing scorers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsConfig {
    /// Gap multiplier when no therapy exists (maturity none or missing).
    #[serde(default = "default_untreated")]
    pub untreated: f64,
    /// Gap multiplier when therapies are in trial.
    #[serde(default = "default_in_trial")]
    pub in_trial: f64,
    /// Gap multiplier when an approved therapy exists.
    #[serde(default = "default_approved")]
    pub approved: f64,
    /// Gap multiplier for maturity labels outside the closed set.
    #[serde(default = "default_unknown")]
    pub unknown: f64,
    /// Repurposing bonus when the new indication has no therapy.
    #[serde(default = "default_repurposing_bonus")]
    pub repurposing_bonus: f64,
    /// Repurposing risk reduction relative to novel targets.
    #[serde(default = "default_risk_factor")]
    pub risk_factor: f64,
}

fn default_untreated() -> f64         { 1.0 }
fn default_in_trial() -> f64          { 0.5 }
fn default_approved() -> f64          { 0.1 }
fn default_unknown() -> f64           { 0.8 }
fn default_repurposing_bonus() -> f64 { 1.5 }
fn default_risk_factor() -> f64       { 1.2 }

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            untreated: default_untreated(),
            in_trial: default_in_trial(),
            approved: default_approved(),
            unknown: default_unknown(),
            repurposing_bonus: default_repurposing_bonus(),
            risk_factor: default_risk_factor(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────────────────

impl Config {
    /// Load configuration.
    /// Reads `.env` if present, then PROTEOMAP_CONFIG or ./proteomap.toml.
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::from_toml_str(&content)?
        } else {
            tracing::debug!(path = %path, "No config file found, using defaults");
            Self::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var(MIN_STRENGTH_ENV) {
            self.pipeline.min_association_strength = raw.trim().parse().map_err(|_| {
                ProteomapError::Config(format!("{MIN_STRENGTH_ENV} is not a number: {raw:?}"))
            })?;
        }
        Ok(())
    }

    /// Reject thresholds outside [0, 1] and negative weights.
    pub fn validate(&self) -> Result<()> {
        let unit = [
            ("pipeline.min_association_strength", self.pipeline.min_association_strength),
            ("scoring.repurposing_min_strength", self.scoring.repurposing_min_strength),
        ];
        for (name, v) in unit {
            if !(0.0..=1.0).contains(&v) {
                return Err(ProteomapError::Config(format!("{name} must be within [0, 1], got {v}")));
            }
        }

        let w = &self.weights;
        let weights = [
            ("weights.untreated", w.untreated),
            ("weights.in_trial", w.in_trial),
            ("weights.approved", w.approved),
            ("weights.unknown", w.unknown),
            ("weights.repurposing_bonus", w.repurposing_bonus),
            ("weights.risk_factor", w.risk_factor),
        ];
        for (name, v) in weights {
            if !v.is_finite() || v < 0.0 {
                return Err(ProteomapError::Config(format!("{name} must be a non-negative number, got {v}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_documented_constants() {
        let config = Config::default();
        assert_eq!(config.pipeline.min_association_strength, 0.3);
        assert_eq!(config.scoring.opportunity_limit, 20);
        assert_eq!(config.scoring.repurposing_min_strength, 0.4);
        assert_eq!(config.weights.approved, 0.1);
        assert_eq!(config.weights.risk_factor, 1.2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [pipeline]
            min_association_strength = 0.5

            [scoring]
            hub_min_diseases = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.pipeline.min_association_strength, 0.5);
        assert_eq!(config.pipeline.max_diseases, 200);
        assert_eq!(config.scoring.hub_min_diseases, 2);
        assert_eq!(config.scoring.cluster_min_shared_proteins, 3);
        assert_eq!(config.weights, WeightsConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_opportunity_limit_clamped() {
        let mut scoring = ScoringConfig::default();
        scoring.opportunity_limit = 0;
        assert_eq!(scoring.effective_opportunity_limit(), 1);
        scoring.opportunity_limit = 500;
        assert_eq!(scoring.effective_opportunity_limit(), 100);
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let mut config = Config::default();
        config.pipeline.min_association_strength = 1.5;
        assert!(matches!(config.validate(), Err(ProteomapError::Config(_))));

        let mut config = Config::default();
        config.weights.in_trial = -0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let err = Config::from_toml_str("[pipeline]\nmin_association_strength = \"high\"").unwrap_err();
        assert!(matches!(err, ProteomapError::Toml(_)));
    }

    // ── Loading from disk and environment ────────────────────────────────────

    mod load {
        use super::*;
        use pretty_assertions::assert_eq;
        use serial_test::serial;
        use std::{env, fs};
        use tempfile::tempdir;

        /// Clears the variables `load` reads, on entry and on drop.
        struct EnvGuard;

        impl EnvGuard {
            fn new() -> Self {
                env::remove_var(CONFIG_ENV);
                env::remove_var(MIN_STRENGTH_ENV);
                EnvGuard
            }
        }

        impl Drop for EnvGuard {
            fn drop(&mut self) {
                env::remove_var(CONFIG_ENV);
                env::remove_var(MIN_STRENGTH_ENV);
            }
        }

        #[test]
        #[serial]
        fn test_load_reads_path_from_env() {
            let _guard = EnvGuard::new();
            let dir = tempdir().unwrap();
            let path = dir.path().join("custom.toml");
            fs::write(
                &path,
                "[pipeline]\nmin_association_strength = 0.5\n\n[scoring]\nhub_min_diseases = 2\n",
            )
            .unwrap();
            env::set_var(CONFIG_ENV, &path);

            let config = Config::load().unwrap();
            assert_eq!(config.pipeline.min_association_strength, 0.5);
            assert_eq!(config.scoring.hub_min_diseases, 2);
            assert_eq!(config.weights, WeightsConfig::default());
        }

        #[test]
        #[serial]
        fn test_load_missing_file_yields_defaults() {
            let _guard = EnvGuard::new();
            let dir = tempdir().unwrap();
            env::set_var(CONFIG_ENV, dir.path().join("absent.toml"));

            assert_eq!(Config::load().unwrap(), Config::default());
        }

        #[test]
        #[serial]
        fn test_load_malformed_file_is_error() {
            let _guard = EnvGuard::new();
            let dir = tempdir().unwrap();
            let path = dir.path().join("bad.toml");
            fs::write(&path, "[pipeline]\nmax_diseases = \"many\"\n").unwrap();
            env::set_var(CONFIG_ENV, &path);

            assert!(matches!(Config::load(), Err(ProteomapError::Toml(_))));
        }

        #[test]
        #[serial]
        fn test_load_strength_override() {
            let _guard = EnvGuard::new();
            let dir = tempdir().unwrap();
            let path = dir.path().join("proteomap.toml");
            fs::write(&path, "[pipeline]\nmin_association_strength = 0.5\n").unwrap();
            env::set_var(CONFIG_ENV, &path);
            env::set_var(MIN_STRENGTH_ENV, " 0.65 ");

            let config = Config::load().unwrap();
            assert_eq!(config.pipeline.min_association_strength, 0.65);
        }

        #[test]
        #[serial]
        fn test_load_rejects_non_numeric_override() {
            let _guard = EnvGuard::new();
            let dir = tempdir().unwrap();
            env::set_var(CONFIG_ENV, dir.path().join("absent.toml"));
            env::set_var(MIN_STRENGTH_ENV, "high");

            match Config::load() {
                Err(ProteomapError::Config(msg)) => assert!(msg.contains(MIN_STRENGTH_ENV)),
                other => panic!("expected config error, got {other:?}"),
            }
        }

        #[test]
        #[serial]
        fn test_load_rejects_out_of_range_override() {
            let _guard = EnvGuard::new();
            let dir = tempdir().unwrap();
            env::set_var(CONFIG_ENV, dir.path().join("absent.toml"));
            env::set_var(MIN_STRENGTH_ENV, "1.5");

            assert!(matches!(Config::load(), Err(ProteomapError::Config(_))));
        }

        #[test]
        #[serial]
        fn test_load_reads_dotenv_file() {
            let _guard = EnvGuard::new();
            let dir = tempdir().unwrap();
            fs::write(dir.path().join(".env"), format!("{MIN_STRENGTH_ENV}=0.45\n")).unwrap();
            fs::write(dir.path().join("proteomap.toml"), "[scoring]\nopportunity_limit = 7\n").unwrap();

            let previous = env::current_dir().unwrap();
            env::set_current_dir(dir.path()).unwrap();
            let result = Config::load();
            env::set_current_dir(previous).unwrap();

            let config = result.unwrap();
            assert_eq!(config.pipeline.min_association_strength, 0.45);
            assert_eq!(config.scoring.opportunity_limit, 7);
        }

        #[test]
        #[serial]
        fn test_from_yaml() {
            let dir = tempdir().unwrap();
            let path = dir.path().join("proteomap.yaml");
            fs::write(&path, "scoring:\n  multi_indication_min: 4\nweights:\n  risk_factor: 1.0\n").unwrap();

            let config = Config::from_yaml(&path).unwrap();
            assert_eq!(config.scoring.multi_indication_min, 4);
            assert_eq!(config.weights.risk_factor, 1.0);
            assert_eq!(config.pipeline, PipelineConfig::default());
        }

        #[test]
        #[serial]
        fn test_from_yaml_errors() {
            let dir = tempdir().unwrap();

            let invalid = dir.path().join("invalid.yaml");
            fs::write(&invalid, "pipeline:\n  min_association_strength: 2.0\n").unwrap();
            assert!(matches!(Config::from_yaml(&invalid), Err(ProteomapError::Config(_))));

            let malformed = dir.path().join("malformed.yaml");
            fs::write(&malformed, "pipeline: [unclosed\n").unwrap();
            assert!(matches!(Config::from_yaml(&malformed), Err(ProteomapError::Yaml(_))));

            assert!(matches!(
                Config::from_yaml(dir.path().join("absent.yaml")),
                Err(ProteomapError::Io(_))
            ));
        }
    }
}
