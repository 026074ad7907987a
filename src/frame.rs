//! Frame records and per-session metadata parsed from a trace file.

use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

/// Labels for the 14 fixed FPS histogram ranges reported by the trace
/// producer's trailing summary line, in field order.
pub const FPS_BUCKET_LABELS: [&str; 14] = [
    "0-3", "3-5", "5-10", "10-15", "15-20", "20-25", "25-30", "30-35", "35-40", "40-45", "45-50",
    "50-60", "60-70", "70+",
];

/// One row of the input trace. Immutable once parsed; the metrics engine only
/// derives new sequences from these, it never mutates them.
///
/// Timestamps are kept as `f64` nanoseconds so that a malformed field can be
/// carried as `NaN` instead of aborting the whole parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(rename = "testId")]
    pub test_id: String,
    /// Time the frame was scheduled to be displayed (vsync), nanoseconds.
    #[serde(rename = "scheduledTimeNs")]
    pub scheduled_time_ns: f64,
    /// Time the frame was actually presented to the user, nanoseconds.
    #[serde(rename = "actualTimeNs")]
    pub actual_time_ns: f64,
    /// Auxiliary fence timestamp, passed through unmodified.
    #[serde(rename = "fenceTimeNs")]
    pub fence_time_ns: f64,
    /// Trace-reported inter-frame delta, used only by the target-FPS detector.
    #[serde(rename = "deltaTimeMs")]
    pub delta_time_ms: f64,
    /// Trace-reported instantaneous FPS, used only by the target-FPS detector.
    #[serde(rename = "instantFps")]
    pub instant_fps: f64,
    #[serde(rename = "latencyMs", default)]
    pub latency_ms: f64,
}

/// Pre-aggregated FPS histogram from the trailing summary line, present only
/// when that line carries enough comma-delimited fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FpsBuckets {
    /// Frame counts per [`FPS_BUCKET_LABELS`] range.
    pub buckets: [u64; 14],
    #[serde(rename = "avgFps")]
    pub avg_fps: f64,
    #[serde(rename = "elapsedTime")]
    pub elapsed_time: f64,
    #[serde(rename = "totalFrames")]
    pub total_frames: u64,
    #[serde(rename = "startBattery")]
    pub start_battery: f64,
    #[serde(rename = "endBattery")]
    pub end_battery: f64,
    #[serde(rename = "batteryDrain")]
    pub battery_drain: f64,
    #[serde(rename = "refreshRate")]
    pub refresh_rate: f64,
}

/// Session metadata parsed once per trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    #[serde(rename = "refreshPeriodNs")]
    pub refresh_period_ns: i64,
    #[serde(rename = "refreshRateHz")]
    pub refresh_rate_hz: f64,
    #[serde(rename = "appName")]
    pub app_name: String,
    #[serde(rename = "packageName")]
    pub package_name: String,
    /// Open device/OS/SoC property map. The key set is externally defined and
    /// untrusted; read with `get` and tolerate missing keys.
    #[serde(rename = "deviceInfo", default)]
    pub device_info: BTreeMap<String, String>,
    #[serde(rename = "fpsBuckets", default, skip_serializing_if = "Option::is_none")]
    pub fps_buckets: Option<FpsBuckets>,
}
