//! Analysis thresholds, rating cut-offs, and the target-FPS candidate list.

use serde::{Deserialize, Serialize};

use std::path::Path;

/// Tunable parameters for the metrics engine and target-FPS detector.
///
/// The defaults reproduce the dashboard's shipped behavior; a
/// `framestat.toml` may override any subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnalysisConfig {
    /// Candidate target frame rates scored by the detector, in priority
    /// order (ties go to the earlier entry).
    #[serde(default = "default_target_candidates")]
    pub target_fps_candidates: Vec<u32>,

    /// A frame is slow when its frame time exceeds
    /// `target_frame_time * slow_frame_multiplier`.
    #[serde(default = "default_slow_frame_multiplier")]
    pub slow_frame_multiplier: f64,

    /// A frame is unstable when its frame time exceeds the previous frame's
    /// time by more than this factor.
    #[serde(default = "default_instability_factor")]
    pub instability_factor: f64,

    /// Average FPS at or above `excellent_ratio * target` rates "Excellent".
    #[serde(default = "default_excellent_ratio")]
    pub excellent_ratio: f64,

    /// Average FPS at or above `good_ratio * target` rates "Good".
    #[serde(default = "default_good_ratio")]
    pub good_ratio: f64,

    /// Instability percentage at or below this rates "Smooth".
    #[serde(default = "default_smooth_max_pct")]
    pub smooth_max_pct: f64,

    /// Instability percentage at or below this rates "Moderate".
    #[serde(default = "default_moderate_max_pct")]
    pub moderate_max_pct: f64,
}

fn default_target_candidates() -> Vec<u32> {
    vec![30]
}

fn default_slow_frame_multiplier() -> f64 {
    1.5
}

fn default_instability_factor() -> f64 {
    1.3
}

fn default_excellent_ratio() -> f64 {
    0.9
}

fn default_good_ratio() -> f64 {
    0.7
}

fn default_smooth_max_pct() -> f64 {
    5.0
}

fn default_moderate_max_pct() -> f64 {
    15.0
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_fps_candidates: default_target_candidates(),
            slow_frame_multiplier: default_slow_frame_multiplier(),
            instability_factor: default_instability_factor(),
            excellent_ratio: default_excellent_ratio(),
            good_ratio: default_good_ratio(),
            smooth_max_pct: default_smooth_max_pct(),
            moderate_max_pct: default_moderate_max_pct(),
        }
    }
}

impl AnalysisConfig {
    pub fn load_optional(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(s) => match toml::from_str::<AnalysisConfig>(&s) {
                Ok(cfg) => cfg,
                Err(err) => {
                    tracing::warn!("failed to parse config {}: {err}", path.display());
                    Self::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => {
                tracing::warn!("failed to read config {}: {err}", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_thresholds() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.target_fps_candidates, vec![30]);
        assert_eq!(cfg.slow_frame_multiplier, 1.5);
        assert_eq!(cfg.instability_factor, 1.3);
        assert_eq!(cfg.smooth_max_pct, 5.0);
        assert_eq!(cfg.moderate_max_pct, 15.0);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg: AnalysisConfig = toml::from_str("target_fps_candidates = [30, 60]").unwrap();
        assert_eq!(cfg.target_fps_candidates, vec![30, 60]);
        assert_eq!(cfg.slow_frame_multiplier, 1.5);
    }
}
