//! The frame-pacing metrics engine: dual-timeline FPS statistics plus
//! jank/slow-frame/instability analysis.
//!
//! Pure data transformation. Input records are never mutated; every call
//! derives fresh arrays, so concurrent callers need no coordination.

use serde::{Deserialize, Serialize};

use crate::{AnalysisConfig, FrameRecord, FramestatError, FramestatResult, ParseErrorKind};

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// FPS statistics over one timeline (presentation or vsync timestamps).
///
/// The two per-frame arrays keep `NaN` at positions whose interval was
/// non-positive or non-finite, so they stay index-aligned with the frame
/// sequence (length = frame count − 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineFps {
    #[serde(rename = "avgFps")]
    pub avg_fps: f64,
    #[serde(rename = "minFps")]
    pub min_fps: f64,
    #[serde(rename = "maxFps")]
    pub max_fps: f64,
    #[serde(rename = "avgFrameTimeMs")]
    pub avg_frame_time_ms: f64,
    #[serde(rename = "minFrameTimeMs")]
    pub min_frame_time_ms: f64,
    #[serde(rename = "maxFrameTimeMs")]
    pub max_frame_time_ms: f64,
    #[serde(rename = "frameTimesMs")]
    pub frame_times_ms: Vec<f64>,
    #[serde(rename = "instantFps")]
    pub instant_fps: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceRating {
    Excellent,
    Good,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoppinessRating {
    Smooth,
    Moderate,
    Choppy,
}

/// Jank statistics derived from the presentation timeline only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JankAnalysis {
    #[serde(rename = "slowFrameCount")]
    pub slow_frame_count: usize,
    #[serde(rename = "slowFramePercentage")]
    pub slow_frame_percentage: f64,
    #[serde(rename = "avgSlowFrameExcessMs")]
    pub avg_slow_frame_excess_ms: f64,
    #[serde(rename = "maxSlowFrameExcessMs")]
    pub max_slow_frame_excess_ms: f64,
    #[serde(rename = "jankInstabilityCount")]
    pub jank_instability_count: usize,
    #[serde(rename = "jankInstabilityPercentage")]
    pub jank_instability_percentage: f64,
    #[serde(rename = "avgInstabilityMs")]
    pub avg_instability_ms: f64,
    #[serde(rename = "maxInstabilityMs")]
    pub max_instability_ms: f64,
    #[serde(rename = "performanceRating")]
    pub performance_rating: PerformanceRating,
    #[serde(rename = "choppinessRating")]
    pub choppiness_rating: ChoppinessRating,
    #[serde(rename = "perFrameSlowFrameExcess")]
    pub per_frame_slow_frame_excess: Vec<f64>,
    #[serde(rename = "perFrameInstability")]
    pub per_frame_instability: Vec<f64>,
}

/// The engine's full output for one trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    #[serde(rename = "deviceRefreshRate")]
    pub device_refresh_rate: f64,
    /// Count of frame-to-frame intervals (input frame count − 1).
    #[serde(rename = "totalFrames")]
    pub total_frames: usize,
    #[serde(rename = "presentationTimeFps")]
    pub presentation_time_fps: TimelineFps,
    #[serde(rename = "vsyncTimeFps")]
    pub vsync_time_fps: TimelineFps,
    #[serde(rename = "jankAnalysis")]
    pub jank_analysis: JankAnalysis,
}

/// Compute the full report for one frame sequence. Requires at least two
/// records; deterministic for identical inputs.
pub fn compute_metrics(
    frames: &[FrameRecord],
    refresh_rate_hz: f64,
    target_fps: f64,
    cfg: &AnalysisConfig,
) -> FramestatResult<MetricsReport> {
    if frames.len() < 2 {
        return Err(FramestatError::parse(
            ParseErrorKind::InsufficientData,
            format!("need at least 2 frame records, got {}", frames.len()),
        ));
    }

    let actual: Vec<f64> = frames.iter().map(|f| f.actual_time_ns).collect();
    let scheduled: Vec<f64> = frames.iter().map(|f| f.scheduled_time_ns).collect();
    let presentation_time_fps = timeline_fps(&actual);
    let vsync_time_fps = timeline_fps(&scheduled);
    let jank_analysis = jank_analysis(
        &presentation_time_fps.frame_times_ms,
        presentation_time_fps.avg_fps,
        target_fps,
        cfg,
    );

    Ok(MetricsReport {
        device_refresh_rate: round2(refresh_rate_hz),
        total_frames: frames.len() - 1,
        presentation_time_fps,
        vsync_time_fps,
        jank_analysis,
    })
}

/// FPS statistics for one sequence of nanosecond timestamps.
///
/// The average FPS is the mean of the per-interval instantaneous FPS values
/// (average of ratios), not `1000 / mean(frame time)` — on bursty traces the
/// two differ and the dashboard is defined in terms of the former.
pub fn timeline_fps(timestamps_ns: &[f64]) -> TimelineFps {
    let intervals = timestamps_ns.len().saturating_sub(1);
    let mut frame_times_ms = Vec::with_capacity(intervals);
    let mut instant_fps = Vec::with_capacity(intervals);
    for pair in timestamps_ns.windows(2) {
        let render_ms = (pair[1] - pair[0]) / 1e6;
        if render_ms.is_finite() && render_ms > 0.0 {
            frame_times_ms.push(round2(render_ms));
            instant_fps.push(round2(1000.0 / render_ms));
        } else {
            frame_times_ms.push(f64::NAN);
            instant_fps.push(f64::NAN);
        }
    }

    let valid_times: Vec<f64> = frame_times_ms.iter().copied().filter(|v| v.is_finite()).collect();
    let valid_fps: Vec<f64> = instant_fps.iter().copied().filter(|v| v.is_finite()).collect();

    TimelineFps {
        avg_fps: round2(mean(&valid_fps)),
        min_fps: round2(fold_min(&valid_fps)),
        max_fps: round2(fold_max(&valid_fps)),
        avg_frame_time_ms: round2(mean(&valid_times)),
        min_frame_time_ms: round2(fold_min(&valid_times)),
        max_frame_time_ms: round2(fold_max(&valid_times)),
        frame_times_ms,
        instant_fps,
    }
}

/// Classify slow frames and frame-to-frame instability over one frame-time
/// array. The two tests are independent: a frame can be slow, unstable,
/// both, or neither.
pub fn jank_analysis(
    frame_times_ms: &[f64],
    avg_fps: f64,
    target_fps: f64,
    cfg: &AnalysisConfig,
) -> JankAnalysis {
    let target_frame_time_ms = 1000.0 / target_fps;
    let slow_threshold_ms = target_frame_time_ms * cfg.slow_frame_multiplier;

    let mut per_frame_slow = Vec::with_capacity(frame_times_ms.len());
    let mut per_frame_instability = Vec::with_capacity(frame_times_ms.len());
    let mut slow_count = 0usize;
    let mut slow_total = 0.0f64;
    let mut slow_max = 0.0f64;
    let mut unstable_count = 0usize;
    let mut unstable_total = 0.0f64;
    let mut unstable_max = 0.0f64;

    for (i, &frame_time) in frame_times_ms.iter().enumerate() {
        if !frame_time.is_finite() {
            per_frame_slow.push(f64::NAN);
            per_frame_instability.push(f64::NAN);
            continue;
        }

        if frame_time > slow_threshold_ms {
            let excess = frame_time - slow_threshold_ms;
            slow_count += 1;
            slow_total += excess;
            slow_max = slow_max.max(excess);
            per_frame_slow.push(round2(excess));
        } else {
            per_frame_slow.push(0.0);
        }

        let mut jump = 0.0;
        if i > 0 {
            let prev = frame_times_ms[i - 1];
            if prev.is_finite() && frame_time > prev * cfg.instability_factor {
                jump = frame_time - prev;
                unstable_count += 1;
                unstable_total += jump;
                unstable_max = unstable_max.max(jump);
            }
        }
        per_frame_instability.push(round2(jump));
    }

    let total = frame_times_ms.len();
    let percentage = |count: usize| -> f64 {
        if total == 0 {
            0.0
        } else {
            round1(count as f64 / total as f64 * 100.0)
        }
    };
    let flagged_avg = |sum: f64, count: usize| -> f64 {
        if count == 0 { 0.0 } else { round2(sum / count as f64) }
    };

    let jank_instability_percentage = percentage(unstable_count);
    let performance_rating = if avg_fps >= cfg.excellent_ratio * target_fps {
        PerformanceRating::Excellent
    } else if avg_fps >= cfg.good_ratio * target_fps {
        PerformanceRating::Good
    } else {
        PerformanceRating::Poor
    };
    let choppiness_rating = if jank_instability_percentage <= cfg.smooth_max_pct {
        ChoppinessRating::Smooth
    } else if jank_instability_percentage <= cfg.moderate_max_pct {
        ChoppinessRating::Moderate
    } else {
        ChoppinessRating::Choppy
    };

    JankAnalysis {
        slow_frame_count: slow_count,
        slow_frame_percentage: percentage(slow_count),
        avg_slow_frame_excess_ms: flagged_avg(slow_total, slow_count),
        max_slow_frame_excess_ms: round2(slow_max),
        jank_instability_count: unstable_count,
        jank_instability_percentage,
        avg_instability_ms: flagged_avg(unstable_total, unstable_count),
        max_instability_ms: round2(unstable_max),
        performance_rating,
        choppiness_rating,
        per_frame_slow_frame_excess: per_frame_slow,
        per_frame_instability,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn fold_min(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

fn fold_max(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}
