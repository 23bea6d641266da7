//! Plant configuration parameters.
//!
//! Static engineering parameters of the installation.  Operator-tunable
//! targets live in the setpoint block instead (see [`crate::setpoints`]).
//! On the host the configuration is read from a JSON file.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core plant configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    // --- Scan cycle ---
    /// Fixed scan period (milliseconds).  Every timer in the engine counts
    /// in multiples of this.
    pub cycle_period_ms: u32,

    // --- Sensor multiplexer ---
    /// Dwell of mux phase A (milliseconds of cycle time).
    pub mux_dwell_a_ms: u32,
    /// Dwell of mux phase B (milliseconds of cycle time).
    pub mux_dwell_b_ms: u32,

    // --- Cross-system input ---
    /// The auxiliary tank temperature is ignored when it has not been
    /// rewritten for this long.
    pub aux_stale_after_secs: u32,

    // --- Policy ---
    /// When set, frost protection outranks a manual ForceOff on the
    /// hot-water and heating pumps.
    pub frost_overrides_force_off: bool,

    // --- Persistence / reporting ---
    /// Delay between the last setpoint change and the persisted save.
    pub setpoint_save_delay_secs: u32,
    /// Telemetry event interval (seconds).
    pub telemetry_interval_secs: u32,
    /// Directory of the host file store.
    pub state_dir: String,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            // Scan cycle
            cycle_period_ms: 1000,

            // Mux: short dwell for PT1000 group, long for the NTC group
            mux_dwell_a_ms: 8_000,
            mux_dwell_b_ms: 51_000,

            // Heat-pump gateway polls every few minutes
            aux_stale_after_secs: 900,

            // Manual lockout wins
            frost_overrides_force_off: false,

            setpoint_save_delay_secs: 5,
            telemetry_interval_secs: 60,
            state_dir: String::from("state"),
        }
    }
}

impl PlantConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(100..=10_000).contains(&self.cycle_period_ms) {
            return Err(ConfigError::ValidationFailed(
                "cycle_period_ms must be 100–10000",
            ));
        }
        for dwell in [self.mux_dwell_a_ms, self.mux_dwell_b_ms] {
            if dwell < self.cycle_period_ms || dwell > 600_000 {
                return Err(ConfigError::ValidationFailed(
                    "mux dwell must be at least one cycle and at most 600000 ms",
                ));
            }
        }
        if !(10..=86_400).contains(&self.aux_stale_after_secs) {
            return Err(ConfigError::ValidationFailed(
                "aux_stale_after_secs must be 10–86400",
            ));
        }
        if self.setpoint_save_delay_secs > 3600 {
            return Err(ConfigError::ValidationFailed(
                "setpoint_save_delay_secs must be 0–3600",
            ));
        }
        if !(1..=3600).contains(&self.telemetry_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "telemetry_interval_secs must be 1–3600",
            ));
        }
        if self.state_dir.is_empty() {
            return Err(ConfigError::ValidationFailed("state_dir must not be empty"));
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(text).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }
}
