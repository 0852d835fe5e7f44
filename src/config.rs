// =============================================================================
// Engine Configuration — lookbacks and switches for every indicator
// =============================================================================
//
// All fields carry `#[serde(default)]` so that a partial (or empty) JSON file
// loads with the standard chart settings filled in.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::indicators::moving_average::AverageKind;
use crate::indicators::rsi::FullUptrendRsi;
use crate::indicators::{bollinger, rsi, stochastic};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_sma_lookback() -> usize {
    33
}

fn default_ema_lookback() -> usize {
    10
}

fn default_long_lookback() -> usize {
    200
}

fn default_medium_lookback() -> usize {
    50
}

fn default_bollinger_lookback() -> usize {
    bollinger::DEFAULT_LOOKBACK
}

fn default_bollinger_multiplier() -> f64 {
    bollinger::DEFAULT_MULTIPLIER
}

fn default_rsi_lookback() -> usize {
    rsi::DEFAULT_LOOKBACK
}

fn default_stochastic_fast_lookback() -> usize {
    stochastic::DEFAULT_FAST_LOOKBACK
}

fn default_stochastic_slow_lookback() -> usize {
    stochastic::DEFAULT_SLOW_LOOKBACK
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Parameters for one chart computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    // --- Moving averages -----------------------------------------------------

    /// Lookback of the always-on simple moving average.
    #[serde(default = "default_sma_lookback")]
    pub sma_lookback: usize,

    /// Lookback of the always-on exponential moving average.
    #[serde(default = "default_ema_lookback")]
    pub ema_lookback: usize,

    /// Lookback of the "200-day" average.
    #[serde(default = "default_long_lookback")]
    pub long_lookback: usize,

    /// Lookback of the "50-day" average.
    #[serde(default = "default_medium_lookback")]
    pub medium_lookback: usize,

    /// Averaging rule for the 200-day and 50-day fields.
    #[serde(default)]
    pub long_average_kind: AverageKind,

    // --- Bollinger -----------------------------------------------------------

    /// Window of the band mean / standard deviation.
    #[serde(default = "default_bollinger_lookback")]
    pub bollinger_lookback: usize,

    /// Band distance in standard deviations.
    #[serde(default = "default_bollinger_multiplier")]
    pub bollinger_multiplier: f64,

    /// Layer the bands onto the chart rows.
    #[serde(default = "default_true")]
    pub include_bollinger: bool,

    // --- Oscillators ---------------------------------------------------------

    #[serde(default = "default_rsi_lookback")]
    pub rsi_lookback: usize,

    /// RSI reported when the downward mean is zero.
    #[serde(default)]
    pub full_uptrend_rsi: FullUptrendRsi,

    /// %K window.
    #[serde(default = "default_stochastic_fast_lookback")]
    pub stochastic_fast_lookback: usize,

    /// %D smoothing window.
    #[serde(default = "default_stochastic_slow_lookback")]
    pub stochastic_slow_lookback: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sma_lookback: default_sma_lookback(),
            ema_lookback: default_ema_lookback(),
            long_lookback: default_long_lookback(),
            medium_lookback: default_medium_lookback(),
            long_average_kind: AverageKind::default(),
            bollinger_lookback: default_bollinger_lookback(),
            bollinger_multiplier: default_bollinger_multiplier(),
            include_bollinger: true,
            rsi_lookback: default_rsi_lookback(),
            full_uptrend_rsi: FullUptrendRsi::default(),
            stochastic_fast_lookback: default_stochastic_fast_lookback(),
            stochastic_slow_lookback: default_stochastic_slow_lookback(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        info!(
            path = %path.display(),
            long_average_kind = %config.long_average_kind,
            include_bollinger = config.include_bollinger,
            "engine config loaded"
        );

        Ok(config)
    }
}
