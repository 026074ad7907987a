//! Assembly of the flat analysis record that persistence, charting, and
//! summarization layers consume read-only.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use std::collections::BTreeMap;

use crate::{
    AnalysisConfig, ChoppinessRating, FpsBuckets, FrameRecord, FramestatResult, JankAnalysis,
    MetricsReport, PerformanceRating, TargetFpsConfidence, compute_metrics, detect_target_fps,
    parse_trace,
};

pub const ANALYSIS_SCHEMA_VERSION: &str = "framestat.analysis.v1";

/// How the jank-analysis target frame rate is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum TargetFpsMode {
    /// Use the session's display refresh rate.
    #[default]
    RefreshRate,
    /// Use the detector's best-scoring candidate.
    Detected,
    /// Use a caller-supplied rate.
    Fixed(f64),
}

#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Original file name, echoed into the record for display only.
    pub file_name: Option<String>,
    /// Overrides every other app-name source when set.
    pub app_name_override: Option<String>,
    /// Labels the record as `upload-<index>`.
    pub upload_index: usize,
    pub target_mode: TargetFpsMode,
}

/// One complete, flat analysis record. Produced once per trace and never
/// updated in place; a new upload always yields a fresh record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceAnalysis {
    #[serde(rename = "schemaVersion")]
    pub schema_version: String,
    #[serde(rename = "uploadLabel")]
    pub upload_label: String,
    #[serde(rename = "processedAt")]
    pub processed_at: String,
    #[serde(rename = "fileName", default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(rename = "appName")]
    pub app_name: String,
    #[serde(rename = "packageName")]
    pub package_name: String,
    #[serde(rename = "deviceRefreshRate")]
    pub device_refresh_rate: f64,
    #[serde(rename = "totalFrames")]
    pub total_frames: usize,

    #[serde(rename = "targetFps")]
    pub target_fps: u32,
    #[serde(rename = "targetFpsConfidence")]
    pub target_fps_confidence: TargetFpsConfidence,
    #[serde(rename = "targetFpsScore")]
    pub target_fps_score: f64,
    /// The rate the jank thresholds were actually computed against.
    #[serde(rename = "jankTargetFps")]
    pub jank_target_fps: f64,

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

    #[serde(rename = "vsyncAvgFps")]
    pub vsync_avg_fps: f64,
    #[serde(rename = "vsyncMinFps")]
    pub vsync_min_fps: f64,
    #[serde(rename = "vsyncMaxFps")]
    pub vsync_max_fps: f64,
    #[serde(rename = "vsyncAvgFrameTimeMs")]
    pub vsync_avg_frame_time_ms: f64,
    #[serde(rename = "vsyncMinFrameTimeMs")]
    pub vsync_min_frame_time_ms: f64,
    #[serde(rename = "vsyncMaxFrameTimeMs")]
    pub vsync_max_frame_time_ms: f64,

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

    #[serde(rename = "perFrameActualFrameTimesMs")]
    pub per_frame_actual_frame_times_ms: Vec<f64>,
    #[serde(rename = "perFrameInstantaneousFps")]
    pub per_frame_instantaneous_fps: Vec<f64>,
    #[serde(rename = "perFrameSlowFrameExcess")]
    pub per_frame_slow_frame_excess: Vec<f64>,
    #[serde(rename = "perFrameInstability")]
    pub per_frame_instability: Vec<f64>,

    /// Raw frame records, retained for charting.
    #[serde(rename = "rawFpsData")]
    pub raw_fps_data: Vec<FrameRecord>,
    #[serde(rename = "deviceInfo")]
    pub device_info: BTreeMap<String, String>,
    #[serde(rename = "fpsBuckets", default, skip_serializing_if = "Option::is_none")]
    pub fps_buckets: Option<FpsBuckets>,
}

/// Parse one trace and compute its full analysis record.
///
/// Either a complete record comes back or a single error does; warnings
/// raised along the way never abort the run.
pub fn analyze_trace(
    content: &str,
    options: &AnalyzeOptions,
    cfg: &AnalysisConfig,
) -> FramestatResult<TraceAnalysis> {
    let parsed = parse_trace(content, options.app_name_override.as_deref())?;
    let estimate = detect_target_fps(&parsed.frames, &cfg.target_fps_candidates);
    let jank_target_fps = match options.target_mode {
        TargetFpsMode::RefreshRate => parsed.session.refresh_rate_hz,
        TargetFpsMode::Detected => estimate.target_fps as f64,
        TargetFpsMode::Fixed(fps) => fps,
    };
    let report = compute_metrics(
        &parsed.frames,
        parsed.session.refresh_rate_hz,
        jank_target_fps,
        cfg,
    )?;

    let MetricsReport {
        device_refresh_rate,
        total_frames,
        presentation_time_fps: pres,
        vsync_time_fps: vsync,
        jank_analysis:
            JankAnalysis {
                slow_frame_count,
                slow_frame_percentage,
                avg_slow_frame_excess_ms,
                max_slow_frame_excess_ms,
                jank_instability_count,
                jank_instability_percentage,
                avg_instability_ms,
                max_instability_ms,
                performance_rating,
                choppiness_rating,
                per_frame_slow_frame_excess,
                per_frame_instability,
            },
    } = report;

    Ok(TraceAnalysis {
        schema_version: ANALYSIS_SCHEMA_VERSION.to_string(),
        upload_label: format!("upload-{}", options.upload_index),
        processed_at: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
        file_name: options.file_name.clone(),
        app_name: parsed.session.app_name,
        package_name: parsed.session.package_name,
        device_refresh_rate,
        total_frames,
        target_fps: estimate.target_fps,
        target_fps_confidence: estimate.confidence,
        target_fps_score: estimate.score,
        jank_target_fps,
        avg_fps: pres.avg_fps,
        min_fps: pres.min_fps,
        max_fps: pres.max_fps,
        avg_frame_time_ms: pres.avg_frame_time_ms,
        min_frame_time_ms: pres.min_frame_time_ms,
        max_frame_time_ms: pres.max_frame_time_ms,
        vsync_avg_fps: vsync.avg_fps,
        vsync_min_fps: vsync.min_fps,
        vsync_max_fps: vsync.max_fps,
        vsync_avg_frame_time_ms: vsync.avg_frame_time_ms,
        vsync_min_frame_time_ms: vsync.min_frame_time_ms,
        vsync_max_frame_time_ms: vsync.max_frame_time_ms,
        slow_frame_count,
        slow_frame_percentage,
        avg_slow_frame_excess_ms,
        max_slow_frame_excess_ms,
        jank_instability_count,
        jank_instability_percentage,
        avg_instability_ms,
        max_instability_ms,
        performance_rating,
        choppiness_rating,
        per_frame_actual_frame_times_ms: pres.frame_times_ms,
        per_frame_instantaneous_fps: pres.instant_fps,
        per_frame_slow_frame_excess,
        per_frame_instability,
        raw_fps_data: parsed.frames,
        device_info: parsed.session.device_info,
        fps_buckets: parsed.session.fps_buckets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseErrorKind;

    const CSV_HEADER: &str =
        "Test ID,Presentation Time,Fence Time,Vsync Time,Delta Time,Instant FPS";

    #[test]
    fn end_to_end_sixty_hz_scenario() {
        // Actual-time (column 4) deltas: 16.6 ms then 50 ms.
        let content = format!(
            "Refresh Period: 16666666 ns (60.00 Hz)\n\
             {CSV_HEADER}\n\
             com.example.game.t1,0,0,0,16.6,60\n\
             com.example.game.t2,16600000,0,16600000,16.6,60\n\
             com.example.game.t3,33200000,0,66600000,50.0,20\n"
        );
        let analysis =
            analyze_trace(&content, &AnalyzeOptions::default(), &AnalysisConfig::default())
                .unwrap();

        assert_eq!(analysis.total_frames, 2);
        assert!((analysis.device_refresh_rate - 60.0).abs() < 0.01);
        assert!((analysis.jank_target_fps - 60.0).abs() < 0.01);
        // 50 ms is over the ~25 ms threshold; 16.6 ms is not.
        assert_eq!(analysis.slow_frame_count, 1);
        assert_eq!(analysis.slow_frame_percentage, 50.0);
        // avg fps = mean(60.24, 20.0) ≈ 40.12, under 0.7 * 60.
        assert_eq!(analysis.performance_rating, PerformanceRating::Poor);
        assert_eq!(analysis.package_name, "com.example.game");
    }

    #[test]
    fn detected_mode_feeds_the_detector_result_into_jank() {
        let content = format!(
            "Refresh Period: 16666666 ns (60.00 Hz)\n\
             {CSV_HEADER}\n\
             t1,0,0,0,33.3,18\n\
             t2,1,0,33300000,33.3,18\n\
             t3,2,0,66600000,33.3,18\n"
        );
        let options = AnalyzeOptions {
            target_mode: TargetFpsMode::Detected,
            ..AnalyzeOptions::default()
        };
        let analysis = analyze_trace(&content, &options, &AnalysisConfig::default()).unwrap();
        assert_eq!(analysis.target_fps, 30);
        assert_eq!(analysis.jank_target_fps, 30.0);
        // 33.3 ms frames are fine against a 30 fps target (threshold 50 ms).
        assert_eq!(analysis.slow_frame_count, 0);
    }

    #[test]
    fn upload_label_and_schema_version_are_set() {
        let content = format!(
            "Refresh Period: 16666666 ns (60.00 Hz)\n{CSV_HEADER}\n\
             t1,0,0,0,1,1\nt2,1,0,16600000,1,1\n"
        );
        let options = AnalyzeOptions {
            file_name: Some("run.csv".to_string()),
            upload_index: 7,
            ..AnalyzeOptions::default()
        };
        let analysis = analyze_trace(&content, &options, &AnalysisConfig::default()).unwrap();
        assert_eq!(analysis.schema_version, ANALYSIS_SCHEMA_VERSION);
        assert_eq!(analysis.upload_label, "upload-7");
        assert_eq!(analysis.file_name.as_deref(), Some("run.csv"));
        assert!(!analysis.processed_at.is_empty());
    }

    #[test]
    fn per_frame_arrays_stay_index_aligned() {
        // Middle interval is negative, so index 1 must be NaN everywhere.
        let content = format!(
            "Refresh Period: 16666666 ns (60.00 Hz)\n{CSV_HEADER}\n\
             t1,0,0,0,1,1\n\
             t2,1,0,20000000,1,1\n\
             t3,2,0,10000000,1,1\n\
             t4,3,0,40000000,1,1\n"
        );
        let analysis =
            analyze_trace(&content, &AnalyzeOptions::default(), &AnalysisConfig::default())
                .unwrap();
        assert_eq!(analysis.total_frames, 3);
        assert_eq!(analysis.per_frame_actual_frame_times_ms.len(), 3);
        assert_eq!(analysis.per_frame_instantaneous_fps.len(), 3);
        assert_eq!(analysis.per_frame_slow_frame_excess.len(), 3);
        assert_eq!(analysis.per_frame_instability.len(), 3);
        assert!(analysis.per_frame_actual_frame_times_ms[1].is_nan());
        assert!(analysis.per_frame_slow_frame_excess[1].is_nan());
        assert!(analysis.per_frame_instability[1].is_nan());
    }

    #[test]
    fn single_frame_surfaces_insufficient_data() {
        let content = format!(
            "Refresh Period: 16666666 ns (60.00 Hz)\n{CSV_HEADER}\nt1,0,0,0,1,1\n"
        );
        let err = analyze_trace(&content, &AnalyzeOptions::default(), &AnalysisConfig::default())
            .unwrap_err();
        assert_eq!(err.parse_kind(), Some(ParseErrorKind::InsufficientData));
    }

    #[test]
    fn nan_markers_serialize_as_null() {
        let content = format!(
            "Refresh Period: 16666666 ns (60.00 Hz)\n{CSV_HEADER}\n\
             t1,0,0,0,1,1\n\
             t2,1,0,20000000,1,1\n\
             t3,2,0,10000000,1,1\n"
        );
        let analysis =
            analyze_trace(&content, &AnalyzeOptions::default(), &AnalysisConfig::default())
                .unwrap();
        let value = serde_json::to_value(&analysis).unwrap();
        assert!(value["perFrameActualFrameTimesMs"][1].is_null());
        assert!(value["perFrameInstability"][1].is_null());
        // Only the valid 20 ms interval counts: avg fps 50 against target 60.
        assert_eq!(value["performanceRating"], "Good");
    }
}
