//! Target-frame-rate detection.
//!
//! Scores each configured candidate rate against the trace-reported frame
//! deltas and instantaneous FPS, then keeps the best. The shipped candidate
//! list is `[30]`, but the scorer is written for any number of candidates.

use serde::{Deserialize, Serialize};

use crate::FrameRecord;

pub const FALLBACK_TARGET_FPS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetFpsConfidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetFpsEstimate {
    #[serde(rename = "targetFps")]
    pub target_fps: u32,
    pub confidence: TargetFpsConfidence,
    pub score: f64,
}

/// Pick the best-scoring candidate target rate.
///
/// Ties keep the earliest candidate in the list. With no usable delta-time
/// data at all this short-circuits to 30 fps at LOW confidence without
/// scoring anything.
pub fn detect_target_fps(frames: &[FrameRecord], candidates: &[u32]) -> TargetFpsEstimate {
    let deltas: Vec<f64> = frames
        .iter()
        .map(|f| f.delta_time_ms)
        .filter(|d| d.is_finite() && *d > 0.0)
        .collect();
    if deltas.is_empty() {
        return TargetFpsEstimate {
            target_fps: FALLBACK_TARGET_FPS,
            confidence: TargetFpsConfidence::Low,
            score: 0.0,
        };
    }

    let fps_values: Vec<f64> = frames
        .iter()
        .map(|f| f.instant_fps)
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    let avg_instant_fps = if fps_values.is_empty() {
        0.0
    } else {
        fps_values.iter().sum::<f64>() / fps_values.len() as f64
    };

    let mut best: Option<(u32, f64)> = None;
    for &candidate in candidates {
        if candidate == 0 {
            continue;
        }
        let score = score_candidate(candidate, avg_instant_fps, &deltas);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }

    let (target_fps, score) = best.unwrap_or((FALLBACK_TARGET_FPS, 0.0));
    TargetFpsEstimate {
        target_fps,
        confidence: confidence_for(score),
        score,
    }
}

fn score_candidate(target: u32, avg_instant_fps: f64, deltas: &[f64]) -> f64 {
    let expected_delta_ms = 1000.0 / target as f64;
    let ratio = avg_instant_fps / target as f64;

    let mut score = 0.0;
    if (0.4..=0.8).contains(&ratio) {
        score += 50.0;
    } else if (0.2..=1.0).contains(&ratio) {
        score += 25.0;
    }

    let in_window = deltas
        .iter()
        .filter(|d| **d >= 0.8 * expected_delta_ms && **d <= 2.5 * expected_delta_ms)
        .count();
    score += 30.0 * in_window as f64 / deltas.len() as f64;

    // A ratio in the sweet spot earns this on top of the 50 above.
    if (0.5..=0.8).contains(&ratio) {
        score += 20.0;
    }

    score
}

fn confidence_for(score: f64) -> TargetFpsConfidence {
    if score >= 70.0 {
        TargetFpsConfidence::High
    } else if score >= 50.0 {
        TargetFpsConfidence::Medium
    } else {
        TargetFpsConfidence::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(delta_time_ms: f64, instant_fps: f64) -> FrameRecord {
        FrameRecord {
            test_id: "t".to_string(),
            scheduled_time_ns: 0.0,
            actual_time_ns: 0.0,
            fence_time_ns: 0.0,
            delta_time_ms,
            instant_fps,
            latency_ms: 0.0,
        }
    }

    #[test]
    fn no_delta_data_short_circuits() {
        let frames = vec![frame(f64::NAN, 30.0), frame(0.0, 30.0), frame(-5.0, 30.0)];
        let estimate = detect_target_fps(&frames, &[30, 60]);
        assert_eq!(estimate.target_fps, FALLBACK_TARGET_FPS);
        assert_eq!(estimate.confidence, TargetFpsConfidence::Low);
        assert_eq!(estimate.score, 0.0);
    }

    #[test]
    fn sweet_spot_ratio_earns_both_bonuses() {
        // avg instant fps 18 -> ratio 0.6 for a 30 fps target; deltas sit at
        // the expected 33 ms cadence so the delta fraction is 1.0.
        let frames: Vec<FrameRecord> = (0..10).map(|_| frame(33.3, 18.0)).collect();
        let estimate = detect_target_fps(&frames, &[30]);
        assert_eq!(estimate.target_fps, 30);
        assert_eq!(estimate.score, 100.0);
        assert_eq!(estimate.confidence, TargetFpsConfidence::High);
    }

    #[test]
    fn wide_ratio_band_earns_partial_credit() {
        // ratio 0.9 lands only in the 0.2..=1.0 band.
        let frames: Vec<FrameRecord> = (0..10).map(|_| frame(500.0, 27.0)).collect();
        let estimate = detect_target_fps(&frames, &[30]);
        assert_eq!(estimate.score, 25.0);
        assert_eq!(estimate.confidence, TargetFpsConfidence::Low);
    }

    #[test]
    fn delta_fraction_is_proportional() {
        // Half the deltas inside [26.7, 83.3], half far outside.
        let mut frames: Vec<FrameRecord> = (0..5).map(|_| frame(33.3, 0.0)).collect();
        frames.extend((0..5).map(|_| frame(500.0, 0.0)));
        let estimate = detect_target_fps(&frames, &[30]);
        assert_eq!(estimate.score, 15.0);
    }

    #[test]
    fn ties_keep_the_earlier_candidate() {
        // Ratio above 1.0 for both candidates and deltas outside both
        // windows: both score 0.
        let frames: Vec<FrameRecord> = (0..4).map(|_| frame(500.0, 200.0)).collect();
        let estimate = detect_target_fps(&frames, &[45, 90]);
        assert_eq!(estimate.target_fps, 45);
        assert_eq!(estimate.score, 0.0);
    }

    #[test]
    fn best_scoring_candidate_wins() {
        // 60 fps cadence: ratio 0.75 for 60 (50+20), 1.5 for 30 (nothing).
        let frames: Vec<FrameRecord> = (0..10).map(|_| frame(16.7, 45.0)).collect();
        let estimate = detect_target_fps(&frames, &[30, 60]);
        assert_eq!(estimate.target_fps, 60);
        assert_eq!(estimate.confidence, TargetFpsConfidence::High);
    }

    #[test]
    fn empty_candidate_list_falls_back() {
        let frames = vec![frame(33.3, 20.0)];
        let estimate = detect_target_fps(&frames, &[]);
        assert_eq!(estimate.target_fps, FALLBACK_TARGET_FPS);
        assert_eq!(estimate.score, 0.0);
    }
}
