//! # lulab TeX
//!
//! Turns a topic's `tex/*.tpl.tex` templates into PDFs with `latexmk`.
//!
//! ## Pipeline
//!
//! ```text
//!  discover_templates ──► for each template (sorted):
//!                           sanitize_headers(template)
//!                           discover_body_dependencies(template)
//!                           sanitize_unicode_math(each body)
//!                           latexmk -pdf ... -jobname=<job> <template>
//!                             └─ on failure: FailureLog::append
//! ```
//!
//! Sanitization is a pure text stage ([`sanitize`]); running the engine goes
//! through the [`CommandExecutor`] trait so tests never need a TeX
//! distribution.
//!
//! ## Example
//!
//! ```no_run
//! use lulab_tex::{BatchOptions, Builder, Compiler, TexLayout};
//! use std::path::Path;
//!
//! let layout = TexLayout::for_topic(Path::new("topics/TOP_0001_exoplanet_birth_radius"));
//! let templates = layout.discover_templates(None, &["ACAP_*.tpl.tex".to_string()])?;
//! let builder = Builder::new(layout.clone(), Compiler::new(&layout));
//! let report = builder.run_batch(&templates, &BatchOptions::default())?;
//! if !report.is_success() {
//!     eprintln!("failed: {:?}", report.failed);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod batch;
pub mod build;
pub mod compiler;
pub mod discover;
mod error;
pub mod failure_log;
pub mod sanitize;

pub use batch::{BatchOptions, BatchReport};
pub use build::{BuildResult, BuildStatus, Builder};
pub use compiler::{CommandExecutor, Compiler, ExitReport, Invocation, RealCommandExecutor};
pub use discover::{TexLayout, derive_job_name, split_patterns};
pub use error::TexError;
pub use failure_log::{FailureLog, FailureLogHeader, FailureRecord};
pub use sanitize::{SanitizeOptions, sanitize_file_in_place, sanitize_headers, sanitize_unicode_math};
