//! Crate-wide error types.

use thiserror::Error;

pub type FramestatResult<T> = Result<T, FramestatError>;

/// Structural failure classes surfaced by the parser and metrics engine.
///
/// Content-level anomalies (bad refresh header, malformed device-info JSON,
/// unparsable bucket fields) are absorbed with documented fallbacks and never
/// produce one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Trace text has no non-blank lines.
    EmptyInput,
    /// The `Test ID,Presentation Time` CSV header marker is absent.
    MissingCsvHeader,
    /// No data line yielded a valid frame record.
    NoFrameData,
    /// Fewer than 2 frame records reached the metrics engine.
    InsufficientData,
}

impl ParseErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::MissingCsvHeader => "missing_csv_header",
            Self::NoFrameData => "no_frame_data",
            Self::InsufficientData => "insufficient_data",
        }
    }
}

#[derive(Debug, Error)]
pub enum FramestatError {
    #[error("trace parse error ({}): {message}", .kind.as_str())]
    Parse {
        kind: ParseErrorKind,
        message: String,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl FramestatError {
    pub fn parse(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self::Parse {
            kind,
            message: message.into(),
        }
    }

    /// The structural failure class, if this is a parse error.
    pub fn parse_kind(&self) -> Option<ParseErrorKind> {
        match self {
            Self::Parse { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
