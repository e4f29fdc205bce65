use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tick_clock::Fps;

/// Tunables for an [`Engine`](crate::Engine).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Simulation ticks per second.
    pub tick_rate: f64,
    /// Framebuffer width in pixels.
    pub width: u32,
    /// Framebuffer height in pixels.
    pub height: u32,
    /// Period of the metrics log line; `None` disables it.
    pub metrics_log_period_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            width: 320,
            height: 240,
            metrics_log_period_ms: None,
        }
    }
}

/// Rejected [`EngineConfig`] values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// The tick rate does not map to a positive interval.
    #[error("tick rate must be positive and finite, got {0}")]
    TickRate(f64),

    /// One of the framebuffer dimensions is zero.
    #[error("frame size {width}x{height} must be non-zero")]
    FrameSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The metrics period is zero.
    #[error("metrics log period must be non-zero")]
    MetricsPeriod,
}

impl EngineConfig {
    /// Interval between ticks.
    pub fn tick_interval(&self) -> Result<Duration, ConfigError> {
        Fps(self.tick_rate)
            .interval()
            .ok_or(ConfigError::TickRate(self.tick_rate))
    }

    /// Metrics reporting period, if enabled.
    pub fn metrics_log_period(&self) -> Option<Duration> {
        self.metrics_log_period_ms.map(Duration::from_millis)
    }

    /// Checks every field, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tick_interval()?;
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::FrameSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.metrics_log_period_ms == Some(0) {
            return Err(ConfigError::MetricsPeriod);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        let interval = config.tick_interval().expect("interval");
        assert!(interval > Duration::from_millis(16) && interval < Duration::from_millis(17));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str("tick_rate = 100.0\nwidth = 64").expect("toml");
        assert_eq!(config.tick_interval(), Ok(Duration::from_millis(10)));
        assert_eq!(config.width, 64);
        assert_eq!(config.height, 240);
        assert_eq!(config.metrics_log_period(), None);
    }

    #[test]
    fn rejects_bad_values() {
        let zero_rate = EngineConfig {
            tick_rate: 0.0,
            ..EngineConfig::default()
        };
        assert_eq!(zero_rate.validate(), Err(ConfigError::TickRate(0.0)));

        let no_height = EngineConfig {
            height: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            no_height.validate(),
            Err(ConfigError::FrameSize { height: 0, .. })
        ));

        let no_period = EngineConfig {
            metrics_log_period_ms: Some(0),
            ..EngineConfig::default()
        };
        assert_eq!(no_period.validate(), Err(ConfigError::MetricsPeriod));
    }
}
