use crate::compiler::{CommandExecutor, Compiler, RealCommandExecutor};
use crate::discover::{TexLayout, derive_job_name};
use crate::failure_log::{FAILURE_LOG_NAME, FailureLog, FailureRecord, error_chain};
use crate::sanitize::{SanitizeOptions, sanitize_file_in_place};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The outcome of one template build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildStatus {
    /// The tool exited successfully; the PDF is expected at `pdf`.
    Success { pdf: PathBuf },
    /// The tool exited with `return_code`, or could not be run (`error`).
    Failure {
        return_code: Option<i32>,
        error: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResult {
    pub job_name: String,
    pub template: PathBuf,
    #[serde(flatten)]
    pub status: BuildStatus,
}

impl BuildResult {
    pub fn is_success(&self) -> bool {
        matches!(self.status, BuildStatus::Success { .. })
    }
}

/// Sanitizes and compiles templates of one topic, logging failures.
#[derive(Debug)]
pub struct Builder {
    layout: TexLayout,
    compiler: Compiler,
    executor: Box<dyn CommandExecutor>,
    failure_log: FailureLog,
}

impl Builder {
    /// A builder running the real toolchain, logging to `<build>/build_pdfs_failures.log`.
    pub fn new(layout: TexLayout, compiler: Compiler) -> Self {
        let failure_log = FailureLog::new(layout.build_dir.join(FAILURE_LOG_NAME));
        Self {
            layout,
            compiler,
            executor: Box::new(RealCommandExecutor),
            failure_log,
        }
    }

    /// Replaces the command executor (for testing).
    pub fn with_executor(mut self, executor: Box<dyn CommandExecutor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_failure_log(mut self, failure_log: FailureLog) -> Self {
        self.failure_log = failure_log;
        self
    }

    pub fn layout(&self) -> &TexLayout {
        &self.layout
    }

    pub fn failure_log(&self) -> &FailureLog {
        &self.failure_log
    }

    /// Builds one template.
    ///
    /// Steps, in order: escape the template's header characters, find its
    /// `_body.tex` inputs, rewrite Unicode in each body, run the compiler.
    /// Any failure is appended to the failure log and returned as
    /// [`BuildStatus::Failure`].
    pub fn build_one(&self, template: &Path, job_name_override: Option<&str>) -> BuildResult {
        let job_name = job_name_override
            .map(str::to_string)
            .unwrap_or_else(|| derive_job_name(template));
        let invocation = self.compiler.invocation(template, &job_name);

        let outcome = self
            .prepare(template)
            .and_then(|()| fs::create_dir_all(&self.layout.build_dir))
            .and_then(|()| self.executor.execute(&invocation));

        let status = match outcome {
            Ok(report) if report.success() => {
                let pdf = self.layout.pdf_path(&job_name);
                log::info!("[DONE] {} -> {:?}", job_name, pdf);
                return BuildResult {
                    job_name,
                    template: template.to_path_buf(),
                    status: BuildStatus::Success { pdf },
                };
            }
            Ok(report) => {
                log::error!(
                    "[FAILED] {} (see {:?})",
                    job_name,
                    self.layout.log_path(&job_name)
                );
                BuildStatus::Failure {
                    return_code: report.code,
                    error: None,
                }
            }
            Err(e) => {
                log::error!(
                    "[FAILED] {}: {} (see {:?})",
                    job_name,
                    e,
                    self.failure_log.path()
                );
                BuildStatus::Failure {
                    return_code: None,
                    error: Some(error_chain(&e)),
                }
            }
        };

        if let BuildStatus::Failure { return_code, error } = &status {
            let record = FailureRecord {
                job_name: job_name.clone(),
                template: template.to_path_buf(),
                return_code: *return_code,
                command_line: invocation.command_line(),
                log_path: self.layout.log_path(&job_name),
                pdf_path: self.layout.pdf_path(&job_name),
                error: error.clone(),
            };
            if let Err(e) = self.failure_log.append(&record) {
                log::warn!(
                    "Could not write failure log {:?}: {}",
                    self.failure_log.path(),
                    e
                );
            }
        }

        BuildResult {
            job_name,
            template: template.to_path_buf(),
            status,
        }
    }

    fn prepare(&self, template: &Path) -> io::Result<()> {
        let name = template.file_name().unwrap_or_default().to_string_lossy();
        if sanitize_file_in_place(template, SanitizeOptions::HEADERS)? {
            log::info!("Sanitized template headers: {}", name);
        }

        let bodies = self.layout.discover_body_dependencies(template)?;
        if bodies.is_empty() {
            log::info!("NOTE: {} has no *_body.tex inputs (ok if intended).", name);
        }
        for body in &bodies {
            log::debug!("Body input: {:?}", body);
            if sanitize_file_in_place(body, SanitizeOptions::UNICODE_MATH)? {
                log::info!("Sanitized body unicode math: {:?}", body);
            }
        }
        Ok(())
    }
}
