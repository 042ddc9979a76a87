use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::predict::RiskHeuristics;
use crate::retry::{RetryPolicy, GLOBAL_MAX_RETRIES, MAX_DELAY_MS};

/// Retry policy parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Absolute cap on failed attempts per claim.
    pub global_max_retries: u32,
    /// Upper bound on any backoff delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Growth factor per failed attempt (e.g. 1.5).
    pub backoff_multiplier: f64,
    /// Jitter is drawn from `[0, max_jitter)` (e.g. 0.1 = up to +10%).
    pub max_jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            global_max_retries: GLOBAL_MAX_RETRIES,
            max_delay_ms: MAX_DELAY_MS,
            backoff_multiplier: 1.5,
            max_jitter: 0.1,
        }
    }
}

/// Global configuration loaded from `~/.config/claim-retry/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimRetryConfig {
    /// Record every failed attempt and claim outcome in the SQLite audit log.
    pub audit_enabled: bool,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional overrides for the trend/success/risk weights.
    #[serde(default)]
    pub heuristics: Option<RiskHeuristics>,
}

impl Default for ClaimRetryConfig {
    fn default() -> Self {
        Self {
            audit_enabled: true,
            retry: None,
            heuristics: None,
        }
    }
}

impl RetryConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.backoff_multiplier.is_finite() && self.backoff_multiplier >= 1.0,
            "retry.backoff_multiplier must be finite and >= 1, got {}",
            self.backoff_multiplier
        );
        ensure!(
            self.max_jitter.is_finite() && self.max_jitter >= 0.0,
            "retry.max_jitter must be finite and non-negative, got {}",
            self.max_jitter
        );
        Ok(())
    }
}

impl ClaimRetryConfig {
    /// Check every section; `load_or_init` refuses configs that fail this.
    pub fn validate(&self) -> Result<()> {
        if let Some(retry) = &self.retry {
            retry.validate()?;
        }
        if let Some(heuristics) = &self.heuristics {
            heuristics.validate()?;
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryPolicy::from)
            .unwrap_or_default()
    }

    pub fn risk_heuristics(&self) -> RiskHeuristics {
        self.heuristics.unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("claim-retry")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ClaimRetryConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<ClaimRetryConfig> {
    if !path.exists() {
        let default_cfg = ClaimRetryConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        fs::write(path, toml).with_context(|| format!("write config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: ClaimRetryConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config: {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::ErrorCategory;
    use std::time::Duration;

    #[test]
    fn default_config_values() {
        let cfg = ClaimRetryConfig::default();
        assert!(cfg.audit_enabled);
        assert!(cfg.retry.is_none());
        assert_eq!(cfg.retry_policy(), RetryPolicy::default());
        assert_eq!(cfg.risk_heuristics(), RiskHeuristics::default());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = ClaimRetryConfig {
            retry: Some(RetryConfig::default()),
            ..ClaimRetryConfig::default()
        };
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ClaimRetryConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.audit_enabled, cfg.audit_enabled);
        assert_eq!(parsed.retry, cfg.retry);
    }

    #[test]
    fn config_toml_retry_and_heuristics() {
        let toml = r#"
            audit_enabled = false

            [retry]
            global_max_retries = 3
            max_delay_ms = 600000
            backoff_multiplier = 2.0
            max_jitter = 0.0

            [heuristics]
            min_retry_confidence = 0.4

            [heuristics.risk]
            high_threshold = 8
        "#;
        let cfg: ClaimRetryConfig = toml::from_str(toml).unwrap();
        assert!(!cfg.audit_enabled);

        let policy = cfg.retry_policy();
        assert_eq!(policy.global_max_retries, 3);
        assert!(!policy.should_retry(ErrorCategory::NetworkError, 3));
        assert_eq!(
            policy.compute_delay(ErrorCategory::GasError, 1),
            Duration::from_millis(90_000)
        );

        let h = cfg.risk_heuristics();
        assert!((h.min_retry_confidence - 0.4).abs() < 1e-9);
        assert_eq!(h.risk.high_threshold, 8);
        assert_eq!(h.trend_window, 3);
    }

    #[test]
    fn load_or_init_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert!(cfg.audit_enabled);

        std::fs::write(&path, "audit_enabled = false\n").unwrap();
        let reloaded = load_or_init_at(&path).unwrap();
        assert!(!reloaded.audit_enabled);
    }

    #[test]
    fn partial_retry_section_keeps_other_defaults() {
        let cfg: ClaimRetryConfig = toml::from_str("[retry]\nglobal_max_retries = 3\n").unwrap();
        assert!(cfg.audit_enabled);
        let retry = cfg.retry.unwrap();
        assert_eq!(retry.global_max_retries, 3);
        assert_eq!(retry.max_delay_ms, MAX_DELAY_MS);
        assert!((retry.max_jitter - 0.1).abs() < 1e-9);
    }

    fn load_str(contents: &str) -> Result<ClaimRetryConfig> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        load_or_init_at(&path)
    }

    #[test]
    fn load_rejects_bad_jitter() {
        for jitter in ["inf", "nan", "-0.1"] {
            let err = load_str(&format!("[retry]\nmax_jitter = {jitter}\n")).unwrap_err();
            assert!(format!("{err:#}").contains("max_jitter"), "{jitter}: {err:#}");
        }
    }

    #[test]
    fn load_rejects_bad_multiplier() {
        for multiplier in ["inf", "nan", "-2.0", "0.5"] {
            let err =
                load_str(&format!("[retry]\nbackoff_multiplier = {multiplier}\n")).unwrap_err();
            assert!(format!("{err:#}").contains("backoff_multiplier"), "{multiplier}: {err:#}");
        }
    }

    #[test]
    fn load_rejects_inverted_probability_bounds() {
        let err = load_str("[heuristics]\nmin_probability = 0.9\nmax_probability = 0.1\n")
            .unwrap_err();
        assert!(format!("{err:#}").contains("min_probability"), "{err:#}");
    }

    #[test]
    fn default_config_passes_validation() {
        ClaimRetryConfig::default().validate().unwrap();
        ClaimRetryConfig {
            retry: Some(RetryConfig::default()),
            heuristics: Some(RiskHeuristics::default()),
            ..ClaimRetryConfig::default()
        }
        .validate()
        .unwrap();
    }
}
