//! Framestat core library: trace parsing and frame-pacing metrics shared by
//! the CLI and the dashboard ingestion pipeline.

mod appname;
mod config;
mod error;
mod frame;
mod metrics;
mod parser;
mod report;
mod sanitize;
mod target_fps;

pub use appname::*;
pub use config::*;
pub use error::*;
pub use frame::*;
pub use metrics::*;
pub use parser::*;
pub use report::*;
pub use sanitize::*;
pub use target_fps::*;
