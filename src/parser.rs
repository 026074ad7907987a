//! Trace file parsing: raw text to `(SessionInfo, Vec<FrameRecord>)`.

use std::collections::BTreeMap;

use crate::sanitize::normalize_doubled_quotes;
use crate::{
    FpsBuckets, FrameRecord, FramestatError, FramestatResult, ParseErrorKind, SessionInfo, appname,
};

pub const DEFAULT_REFRESH_RATE_HZ: f64 = 60.0;
pub const DEFAULT_REFRESH_PERIOD_NS: i64 = 16_666_666;

const CSV_HEADER_MARKER: &str = "Test ID,Presentation Time";

/// Everything the parser extracts from one trace file, in original file
/// order. Fed directly into the metrics engine.
#[derive(Debug, Clone)]
pub struct ParsedTrace {
    pub session: SessionInfo,
    pub frames: Vec<FrameRecord>,
}

/// Parse a complete trace file.
///
/// Structural problems (no content, missing CSV header, zero valid data
/// lines) abort with a [`FramestatError::Parse`]; content-level anomalies
/// (malformed refresh header, bad device-info JSON, unparsable summary
/// fields) are logged and replaced by documented fallbacks.
pub fn parse_trace(content: &str, app_name_override: Option<&str>) -> FramestatResult<ParsedTrace> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        return Err(FramestatError::parse(
            ParseErrorKind::EmptyInput,
            "trace contains no non-blank lines",
        ));
    }

    let (refresh_period_ns, refresh_rate_hz) = match parse_refresh_header(lines[0]) {
        Some(parsed) => parsed,
        None => {
            tracing::warn!("missing or malformed refresh-period header, assuming 60 Hz");
            (DEFAULT_REFRESH_PERIOD_NS, DEFAULT_REFRESH_RATE_HZ)
        }
    };

    let header_idx = lines
        .iter()
        .position(|line| line.contains(CSV_HEADER_MARKER))
        .ok_or_else(|| {
            FramestatError::parse(
                ParseErrorKind::MissingCsvHeader,
                format!("csv header marker {CSV_HEADER_MARKER:?} not found"),
            )
        })?;

    let mut package_name = String::new();
    let mut csv_app_name: Option<String> = None;
    let mut json_app_name: Option<String> = None;
    let mut device_info = BTreeMap::new();
    let mut fps_buckets = None;

    // The last line may carry a summary: a CSV prefix with an appended
    // device-info JSON blob whose quotes were doubled by the producer.
    let last_idx = lines.len() - 1;
    let summary = if last_idx > header_idx {
        split_summary_line(lines[last_idx]).map(|parts| (last_idx, parts))
    } else {
        None
    };

    if let Some((_, (csv_prefix, blob))) = summary {
        let fields: Vec<&str> = csv_prefix.split(',').collect();
        if let Some(pkg) = fields.get(2) {
            let pkg = pkg.trim();
            if !pkg.is_empty() {
                package_name = pkg.to_string();
            }
        }
        csv_app_name = fields.get(3).map(|name| name.trim().to_string());

        match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(
            &normalize_doubled_quotes(blob),
        ) {
            Ok(map) => {
                json_app_name = map
                    .get("appName")
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                device_info = flatten_device_info(&map);
            }
            Err(err) => {
                tracing::warn!("unparsable device-info blob, keeping empty map: {err}");
            }
        }

        if fields.len() >= 24 {
            fps_buckets = Some(parse_fps_buckets(&fields));
        }
    }

    let data_end = summary.map_or(lines.len(), |(idx, _)| idx);
    let frames: Vec<FrameRecord> = lines[header_idx + 1..data_end]
        .iter()
        .filter_map(|line| parse_data_line(line))
        .collect();
    if frames.is_empty() {
        return Err(FramestatError::parse(
            ParseErrorKind::NoFrameData,
            "no csv line yielded a valid frame record",
        ));
    }

    if package_name.is_empty() {
        package_name = guess_package_name(&frames[0].test_id);
    }
    let app_name = appname::resolve_app_name(
        app_name_override,
        csv_app_name.as_deref(),
        json_app_name.as_deref(),
        &package_name,
    );

    Ok(ParsedTrace {
        session: SessionInfo {
            refresh_period_ns,
            refresh_rate_hz,
            app_name,
            package_name,
            device_info,
            fps_buckets,
        },
        frames,
    })
}

/// Parse `Refresh Period: <int> ns (<float> Hz)`. The reported rate is
/// derived from the period rather than read back from the Hz group.
fn parse_refresh_header(line: &str) -> Option<(i64, f64)> {
    let rest = line.strip_prefix("Refresh Period:")?.trim_start();
    let (period, rest) = rest.split_once(" ns")?;
    let period = period.trim().parse::<i64>().ok()?;
    if period <= 0 {
        return None;
    }
    let hz = rest
        .trim_start()
        .strip_prefix('(')?
        .trim_end()
        .strip_suffix("Hz)")?;
    hz.trim().parse::<f64>().ok()?;
    Some((period, 1e9 / period as f64))
}

/// Split a candidate summary line into its CSV prefix and JSON blob.
fn split_summary_line(line: &str) -> Option<(&str, &str)> {
    let brace = line.find('{')?;
    if brace == 0 || !line.ends_with('}') {
        return None;
    }
    Some((&line[..brace], &line[brace..]))
}

/// Parse one CSV data line into a frame record. Lines with fewer than 6
/// fields are dropped; malformed numeric fields become `NaN` so the record
/// keeps its position in the sequence.
fn parse_data_line(line: &str) -> Option<FrameRecord> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 6 {
        return None;
    }
    let num =
        |idx: usize| -> f64 { fields[idx].trim().parse().unwrap_or(f64::NAN) };
    Some(FrameRecord {
        test_id: fields[0].trim().to_string(),
        // Column 2 carries the scheduled (vsync) timestamp and column 4 the
        // presented one, despite what the header row calls them. Every
        // downstream metric is defined against this assignment; do not
        // "fix" it without confirming against the trace producers.
        scheduled_time_ns: num(1),
        fence_time_ns: num(2),
        actual_time_ns: num(3),
        delta_time_ms: num(4),
        instant_fps: num(5),
        latency_ms: fields
            .get(6)
            .and_then(|f| f.trim().parse().ok())
            .unwrap_or(0.0),
    })
}

/// Best-effort package guess from a test id: dot-delimited with at least
/// three segments keeps the first three.
fn guess_package_name(test_id: &str) -> String {
    let segments: Vec<&str> = test_id.split('.').collect();
    if segments.len() >= 3 {
        segments[..3].join(".")
    } else {
        String::new()
    }
}

fn flatten_device_info(
    map: &serde_json::Map<String, serde_json::Value>,
) -> BTreeMap<String, String> {
    map.iter()
        .map(|(key, value)| {
            let rendered = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}

/// Summary-line histogram fields start at index 3: 14 bucket counts, then
/// avgFps, elapsedTime, totalFrames, startBattery, endBattery, batteryDrain,
/// refreshRate. Each field falls back individually on parse failure.
fn parse_fps_buckets(fields: &[&str]) -> FpsBuckets {
    let float = |idx: usize, default: f64| -> f64 {
        fields
            .get(idx)
            .and_then(|f| f.trim().parse().ok())
            .unwrap_or(default)
    };
    let count = |idx: usize| -> u64 {
        fields
            .get(idx)
            .and_then(|f| f.trim().parse().ok())
            .unwrap_or(0)
    };
    let mut buckets = [0u64; 14];
    for (i, bucket) in buckets.iter_mut().enumerate() {
        *bucket = count(3 + i);
    }
    FpsBuckets {
        buckets,
        avg_fps: float(17, 0.0),
        elapsed_time: float(18, 0.0),
        total_frames: count(19),
        start_battery: float(20, 0.0),
        end_battery: float(21, 0.0),
        battery_drain: float(22, 0.0),
        refresh_rate: float(23, 60.0),
    }
}
