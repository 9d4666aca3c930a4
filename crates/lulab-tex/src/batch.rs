use crate::build::{BuildResult, Builder};
use crate::discover::derive_job_name;
use crate::failure_log::FailureLogHeader;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// Controls how [`Builder::run_batch`] treats the failure log and failing templates.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub stop_on_failure: bool,
    /// Append to the existing failure log instead of resetting it.
    pub keep_failure_log: bool,
    /// Used only when exactly one template is built.
    pub job_name_override: Option<String>,
    /// Topic directory recorded in the failure log header.
    pub topic_dir: Option<PathBuf>,
}

/// What happened during one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub attempted: Vec<String>,
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
    pub results: Vec<BuildResult>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Builder {
    /// Starts a fresh failure log unless `keep_failure_log` is set.
    ///
    /// [`Builder::run_batch`] calls this itself. Callers that can still fail
    /// before the batch starts, such as during template discovery, call it first.
    pub fn reset_failure_log(&self, options: &BatchOptions) -> io::Result<()> {
        if options.keep_failure_log {
            return Ok(());
        }
        self.failure_log().reset(&FailureLogHeader {
            tool: "build_pdfs".to_string(),
            topic_dir: options.topic_dir.clone(),
            tex_dir: self.layout().tex_dir.clone(),
            build_dir: self.layout().build_dir.clone(),
        })
    }

    /// Builds `templates` in sorted order.
    ///
    /// Failing templates are recorded and the batch moves on, unless
    /// `stop_on_failure` is set. The error case is reserved for the failure log
    /// itself being unwritable at the start of the run.
    pub fn run_batch(&self, templates: &[PathBuf], options: &BatchOptions) -> io::Result<BatchReport> {
        self.reset_failure_log(options)?;

        let mut ordered: Vec<&Path> = templates.iter().map(PathBuf::as_path).collect();
        ordered.sort();
        let job_override = match ordered.len() {
            1 => options.job_name_override.as_deref(),
            _ => None,
        };

        log::info!("[TEMPLATES] {}", ordered.len());
        let mut report = BatchReport::default();
        for template in ordered {
            log::info!("BUILD: {}", template.display());
            let result = self.build_one(template, job_override);
            report.attempted.push(result.job_name.clone());
            if result.is_success() {
                report.succeeded.push(result.job_name.clone());
                report.results.push(result);
            } else {
                // Failures are listed under the template's own job name.
                report.failed.push(derive_job_name(template));
                report.results.push(result);
                if options.stop_on_failure {
                    log::warn!("Stopping after first failure");
                    break;
                }
            }
        }

        if report.is_success() {
            log::info!("[SUMMARY] ALL OK ({} built)", report.succeeded.len());
        } else {
            log::error!(
                "[SUMMARY] FAILED: {} (see {:?})",
                report.failed.join(", "),
                self.failure_log().path()
            );
        }
        Ok(report)
    }
}
