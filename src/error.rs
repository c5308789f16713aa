//! Crate-wide error type.
//!
//! Every failure carries a stable numeric code (rendered as `E###`) so log
//! scrapers and scripts can match on it, an exit-code group for the CLI, and
//! where it helps, a hint telling the trainee what to try next.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Stable error codes, grouped by hundreds. The hundreds digit decides the
/// CLI exit code, so codes must stay inside their band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // 1xx configuration
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // 2xx file IO
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // 3xx credential and transport
    CredentialMissing = 300,
    CredentialFetch = 301,
    TransportConnect = 310,
    TransportClosed = 311,
    TransportSend = 312,

    // 4xx realtime protocol
    ProtocolMalformed = 400,

    // 5xx persona catalog
    PersonaUnknown = 500,
    PersonaInvalid = 501,

    // 6xx persisted state
    Persistence = 600,

    // 7xx scoring input
    TranscriptMalformed = 700,

    // 9xx internal
    InternalError = 900,
}

impl ErrorCode {
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Exit code for the CLI: ten times the hundreds band (E1xx -> 10,
    /// E3xx -> 30, ...).
    pub fn exit_code(&self) -> i32 {
        (*self as i32 / 100) * 10
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The provider answered but had no secret to give.
    #[error("No session credential provided by {endpoint}")]
    CredentialMissing { endpoint: String },

    /// The credential request itself failed.
    #[error("Failed to fetch session credential from {endpoint}: {message}")]
    CredentialFetch { endpoint: String, message: String },

    #[error("Failed to connect realtime transport to {url}: {message}")]
    TransportConnect { url: String, message: String },

    /// A send was attempted with no live session.
    #[error("Realtime transport is not connected")]
    TransportClosed,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed realtime event: {message}")]
    ProtocolMalformed { message: String },

    #[error("Unknown persona '{name}'. Valid: {valid}")]
    PersonaUnknown { name: String, valid: String },

    /// A bundled persona config failed to parse; this is a packaging bug,
    /// not a user error.
    #[error("Invalid persona config '{name}': {reason}")]
    PersonaInvalid { name: String, reason: String },

    #[error("Progress persistence error: {0}")]
    Persistence(String),

    #[error("Malformed transcript: {message}")]
    TranscriptMalformed { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        use ErrorCode as C;
        match self {
            Error::ConfigNotFound { .. } => C::ConfigNotFound,
            Error::ConfigParse { .. } | Error::Toml(_) => C::ConfigParseError,
            Error::Config(_) => C::ConfigValidation,

            Error::IoRead { .. } => C::IoRead,
            Error::IoWrite { .. } => C::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => C::IoNotFound,
                std::io::ErrorKind::PermissionDenied => C::IoPermission,
                _ => C::IoRead,
            },

            Error::CredentialMissing { .. } => C::CredentialMissing,
            Error::CredentialFetch { .. } => C::CredentialFetch,
            Error::TransportConnect { .. } | Error::WebSocket(_) => C::TransportConnect,
            Error::TransportClosed => C::TransportClosed,
            Error::Transport(_) => C::TransportSend,

            Error::ProtocolMalformed { .. } | Error::Json(_) => C::ProtocolMalformed,

            Error::PersonaUnknown { .. } => C::PersonaUnknown,
            Error::PersonaInvalid { .. } => C::PersonaInvalid,

            Error::Persistence(_) => C::Persistence,
            Error::TranscriptMalformed { .. } => C::TranscriptMalformed,
            Error::Internal(_) => C::InternalError,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    /// A next step to suggest to the user, when there is an obvious one.
    pub fn suggestion(&self) -> Option<&'static str> {
        let hint = match self {
            Error::ConfigNotFound { .. } => {
                "Run 'claimsim config init' to create a default configuration file."
            }
            Error::ConfigParse { .. } => {
                "Check your configuration file syntax. Run 'claimsim config validate' to see details."
            }
            Error::Config(_) => "Review the configuration file and fix the invalid values.",
            Error::CredentialMissing { .. } | Error::CredentialFetch { .. } => {
                "Verify [transport] credential_url in your config and that the session endpoint is reachable."
            }
            Error::TransportConnect { .. } => {
                "Check your network connection and the realtime transport URL, then retry manually."
            }
            Error::PersonaUnknown { .. } => {
                "Run 'claimsim personas list' to see the available customer personas."
            }
            Error::TranscriptMalformed { .. } => {
                "The transcript file must be the JSON array written by 'claimsim run --transcript-out'."
            }
            _ => return None,
        };
        Some(hint)
    }

    /// Colored rendering for stderr: the code, the message, and the hint.
    pub fn format_for_terminal(&self) -> String {
        let mut out = format!("\x1b[31mError [{}]\x1b[0m: {}\n", self.code(), self);
        if let Some(hint) = self.suggestion() {
            out.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }
        out
    }

    /// Plain rendering for log files.
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code(), self)
    }

    pub fn credential_fetch(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Error::CredentialFetch {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn transport_connect(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::TransportConnect {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn transcript_malformed(message: impl Into<String>) -> Self {
        Error::TranscriptMalformed {
            message: message.into(),
        }
    }
}
