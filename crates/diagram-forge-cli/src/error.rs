use std::path::PathBuf;

use diagram_forge_dsl::DslError;

/// Exit codes for the CLI process.
///
/// - 0: success
/// - 1: general error
/// - 2: invalid arguments / usage error
/// - 3: parse error (fatal lexical error, or a failed check)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArguments = 2,
    ParseError = 3,
}

/// Errors returned by CLI command handlers.
///
/// Each variant maps to an `ExitCode` and can produce structured
/// output in JSON mode.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Fatal error from diagram-forge-dsl.
    #[error("cannot parse {file}: {error}")]
    Parse {
        error: DslError,
        source_text: String,
        file: PathBuf,
    },

    /// `check` found problems in one or more files.
    #[error("{failed} of {total} files failed checks")]
    CheckFailed { failed: usize, total: usize },

    /// `fmt --check` found files that are not in canonical form.
    #[error("{} files are not formatted", files.len())]
    Unformatted { files: Vec<PathBuf> },

    /// IO errors (file not found, permission denied).
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// No diagram files at the given path.
    #[error("no diagram files found in {path}")]
    NoDiagramFiles { path: PathBuf },

    /// JSON encoding failed.
    #[error("cannot encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Maps this error to the appropriate exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Parse { .. } | Self::CheckFailed { .. } => ExitCode::ParseError,
            Self::Config { .. } | Self::NoDiagramFiles { .. } => ExitCode::InvalidArguments,
            Self::Unformatted { .. } | Self::Io { .. } | Self::Json(_) | Self::Other(_) => {
                ExitCode::GeneralError
            }
        }
    }

    /// Serializes this error as a JSON value for `--format json` output.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Parse { error, file, .. } => {
                let position = error.position();
                serde_json::json!({
                    "error": "parse_error",
                    "file": file.display().to_string(),
                    "message": error.to_string(),
                    "line": position.map(|p| p.line),
                    "column": position.map(|p| p.column),
                })
            }
            Self::CheckFailed { failed, total } => serde_json::json!({
                "error": "check_failed",
                "failed": failed,
                "total": total,
            }),
            Self::Unformatted { files } => serde_json::json!({
                "error": "unformatted",
                "files": files
                    .iter()
                    .map(|f| f.display().to_string())
                    .collect::<Vec<_>>(),
            }),
            Self::Io { path, source } => serde_json::json!({
                "error": "io_error",
                "path": path.display().to_string(),
                "message": source.to_string(),
            }),
            Self::NoDiagramFiles { path } => serde_json::json!({
                "error": "no_diagram_files",
                "path": path.display().to_string(),
            }),
            Self::Config { message } => serde_json::json!({
                "error": "config_error",
                "message": message,
            }),
            other => serde_json::json!({
                "error": "error",
                "message": other.to_string(),
            }),
        }
    }
}
