use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{FolioError, FolioResult};
use crate::visibility::observer::ObserveOptions;

/// Tuning knobs consumed by the engine.
///
/// Animation durations and easing curves are fixed constants in their
/// modules and are not part of this.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Proximity margin for lazily mounted regions, px.
    pub lazy_margin_px: f64,
    /// Intersection ratio that mounts a lazy region.
    pub lazy_threshold: f64,
    /// Proximity margin for counter strips, px.
    pub counter_margin_px: f64,
    /// Intersection ratio that starts the counters.
    pub counter_threshold: f64,
    /// Animation frame interval of the host clock.
    pub frame_interval_ms: u64,
    /// Minimum time the startup overlay stays up.
    pub overlay_min_dwell_ms: u64,
    /// Fade-out length before the overlay is removed.
    pub overlay_fade_ms: u64,
    /// URL the contact form posts to.
    pub contact_endpoint: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lazy_margin_px: 200.0,
            lazy_threshold: 0.01,
            counter_margin_px: 0.0,
            counter_threshold: 0.5,
            frame_interval_ms: 16,
            overlay_min_dwell_ms: 1200,
            overlay_fade_ms: 500,
            contact_endpoint: "/api/contact".to_owned(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config.
    pub fn from_reader<R: std::io::Read>(r: R) -> FolioResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| FolioError::validation(format!("parse engine config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a JSON config from a string.
    pub fn from_json_str(s: &str) -> FolioResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Load and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> FolioResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FolioError::validation(format!("open engine config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject thresholds outside `[0, 1]`, negative margins, a zero frame interval
    /// and an empty endpoint.
    pub fn validate(&self) -> FolioResult<()> {
        self.lazy_options()?;
        self.counter_options()?;
        if self.frame_interval_ms == 0 {
            return Err(FolioError::validation("frame_interval_ms must be > 0"));
        }
        if self.contact_endpoint.trim().is_empty() {
            return Err(FolioError::validation("contact_endpoint must not be empty"));
        }
        Ok(())
    }

    /// Observation options for lazy-mount gates.
    pub fn lazy_options(&self) -> FolioResult<ObserveOptions> {
        ObserveOptions::new(self.lazy_margin_px, self.lazy_threshold)
            .map_err(|e| FolioError::validation(format!("lazy gate: {e}")))
    }

    /// Observation options for counter gates.
    pub fn counter_options(&self) -> FolioResult<ObserveOptions> {
        ObserveOptions::new(self.counter_margin_px, self.counter_threshold)
            .map_err(|e| FolioError::validation(format!("counter gate: {e}")))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
