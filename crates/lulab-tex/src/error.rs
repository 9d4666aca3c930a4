use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors that stop a build run before any template is attempted.
///
/// Failures of individual templates are not errors; they are reported through
/// [`BuildResult`](crate::BuildResult) and the failure log.
#[derive(Debug, Error)]
pub enum TexError {
    #[error("missing template directory: {}", .0.display())]
    MissingTexDir(PathBuf),
    #[error("missing template: {}", .0.display())]
    MissingTemplate(PathBuf),
    #[error("no templates matched patterns: {0:?}")]
    NoTemplatesMatched(Vec<String>),
    #[error("invalid glob pattern {pattern:?}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("I/O error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
