use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while decoding a dictionary document.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("YAML must contain a mapping at top-level, found {found}")]
    NotAMapping { found: &'static str },
}

/// Errors raised by the label resolver.
///
/// Only structural problems are errors. A key with no translation is not:
/// lookups degrade to the key itself.
#[derive(Debug, Error)]
pub enum I18nError {
    #[error("unsupported language {0:?} (expected one of: en, ru)")]
    InvalidLanguage(String),
    #[error("missing i18n {kind} file: {}", path.display())]
    NotFound { kind: &'static str, path: PathBuf },
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed i18n file {}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
}
