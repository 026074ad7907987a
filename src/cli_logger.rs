use anyhow::Result;
use framestat::{
    ChoppinessRating, FPS_BUCKET_LABELS, FpsBuckets, PerformanceRating, TraceAnalysis,
};
use serde::Serialize;

pub struct CliLogger {
    json: bool,
    no_color: bool,
}

impl CliLogger {
    pub fn new(json: bool, no_color: bool) -> Self {
        Self { json, no_color }
    }

    pub fn print_serialized<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string(value)?);
        Ok(())
    }

    pub fn print_analysis(&self, analysis: &TraceAnalysis) -> Result<()> {
        if self.json {
            return self.print_serialized(analysis);
        }

        let performance = match analysis.performance_rating {
            PerformanceRating::Excellent => self.style("Excellent", "32;1"),
            PerformanceRating::Good => self.style("Good", "33;1"),
            PerformanceRating::Poor => self.style("Poor", "31;1"),
        };
        let choppiness = match analysis.choppiness_rating {
            ChoppinessRating::Smooth => self.style("Smooth", "32;1"),
            ChoppinessRating::Moderate => self.style("Moderate", "33;1"),
            ChoppinessRating::Choppy => self.style("Choppy", "31;1"),
        };

        let mut out = String::new();
        out.push_str(&format!(
            "{} {} {performance} / {choppiness}\n",
            self.style("framestat", "36;1"),
            self.style(&analysis.upload_label, "37;1"),
        ));
        out.push_str(&format!(
            "{} {} ({})\n",
            self.style("app", "90"),
            analysis.app_name,
            if analysis.package_name.is_empty() {
                "unknown package"
            } else {
                &analysis.package_name
            }
        ));
        out.push_str(&format!(
            "{} {} intervals @ {} Hz\n",
            self.style("frames", "90"),
            analysis.total_frames,
            analysis.device_refresh_rate
        ));
        out.push_str(&format!(
            "{} avg={} min={} max={} (vsync avg={})\n",
            self.style("fps", "90"),
            analysis.avg_fps,
            analysis.min_fps,
            analysis.max_fps,
            analysis.vsync_avg_fps
        ));
        out.push_str(&format!(
            "{} avg={}ms min={}ms max={}ms\n",
            self.style("frame time", "90"),
            analysis.avg_frame_time_ms,
            analysis.min_frame_time_ms,
            analysis.max_frame_time_ms
        ));
        out.push_str(&format!(
            "{} {} ({}%) avg_excess={}ms max_excess={}ms\n",
            self.style("slow frames", "90"),
            analysis.slow_frame_count,
            analysis.slow_frame_percentage,
            analysis.avg_slow_frame_excess_ms,
            analysis.max_slow_frame_excess_ms
        ));
        out.push_str(&format!(
            "{} {} ({}%) avg={}ms max={}ms\n",
            self.style("instability", "90"),
            analysis.jank_instability_count,
            analysis.jank_instability_percentage,
            analysis.avg_instability_ms,
            analysis.max_instability_ms
        ));
        out.push_str(&format!(
            "{} {} fps ({:?}, score {}) jank thresholds vs {} fps\n",
            self.style("detected target", "90"),
            analysis.target_fps,
            analysis.target_fps_confidence,
            analysis.target_fps_score,
            analysis.jank_target_fps
        ));
        if !analysis.device_info.is_empty() {
            out.push_str(&format!(
                "{} {} keys\n",
                self.style("device info", "90"),
                analysis.device_info.len()
            ));
        }

        println!("{}", out.trim_end());
        Ok(())
    }

    pub fn print_buckets(&self, buckets: &FpsBuckets) -> Result<()> {
        if self.json {
            return self.print_serialized(buckets);
        }

        let mut out = String::new();
        out.push_str(&format!(
            "{} avg={} frames={} elapsed={}s refresh={}Hz\n",
            self.style("summary", "36;1"),
            buckets.avg_fps,
            buckets.total_frames,
            buckets.elapsed_time,
            buckets.refresh_rate
        ));
        out.push_str(&format!(
            "{} start={}% end={}% drain={}%\n",
            self.style("battery", "90"),
            buckets.start_battery,
            buckets.end_battery,
            buckets.battery_drain
        ));
        for (label, count) in FPS_BUCKET_LABELS.iter().zip(buckets.buckets.iter()) {
            out.push_str(&format!("  {:>5} fps {count}\n", label));
        }
        println!("{}", out.trim_end());
        Ok(())
    }

    pub fn print_error(&self, msg: &str) {
        if self.json {
            let out = serde_json::json!({
                "status": "error",
                "message": msg,
            });
            println!("{out}");
            return;
        }
        eprintln!("{} {msg}", self.style("error", "31;1"));
    }

    pub fn print_warning(&self, msg: &str) {
        if self.json {
            let out = serde_json::json!({
                "status": "warning",
                "message": msg,
            });
            eprintln!("{out}");
            return;
        }
        eprintln!("{} {msg}", self.style("warn", "33;1"));
    }

    fn style(&self, text: &str, ansi: &str) -> String {
        if self.no_color {
            return text.to_string();
        }
        format!("\x1b[{ansi}m{text}\x1b[0m")
    }
}
