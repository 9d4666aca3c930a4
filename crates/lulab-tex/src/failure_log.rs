use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default file name of the failure log inside the build directory.
pub const FAILURE_LOG_NAME: &str = "build_pdfs_failures.log";
/// Engine log lines copied into each record.
pub const DEFAULT_TAIL_LINES: usize = 80;

const RULE_WIDTH: usize = 90;

/// Context written at the top of a fresh failure log.
#[derive(Debug, Clone)]
pub struct FailureLogHeader {
    pub tool: String,
    pub topic_dir: Option<PathBuf>,
    pub tex_dir: PathBuf,
    pub build_dir: PathBuf,
}

/// Everything known about one failed template build.
#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub job_name: String,
    pub template: PathBuf,
    pub return_code: Option<i32>,
    pub command_line: String,
    pub log_path: PathBuf,
    pub pdf_path: PathBuf,
    /// Error raised while preparing or running the build, with its sources.
    pub error: Option<String>,
}

/// Plain-text, human-readable log shared by all templates of a run.
#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
    tail_lines: usize,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tail_lines: DEFAULT_TAIL_LINES,
        }
    }

    pub fn with_tail_lines(mut self, n: usize) -> Self {
        self.tail_lines = n;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncates the log and writes `header`.
    pub fn reset(&self, header: &FailureLogHeader) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = String::new();
        out.push_str(&format!("{} failures log\n", header.tool));
        if let Some(topic) = &header.topic_dir {
            out.push_str(&format!("TOPIC_DIR: {}\n", topic.display()));
        }
        out.push_str(&format!("TEX_DIR  : {}\n", header.tex_dir.display()));
        out.push_str(&format!("BUILD_DIR: {}\n", header.build_dir.display()));
        out.push_str(&"=".repeat(RULE_WIDTH));
        out.push('\n');
        fs::write(&self.path, out)
    }

    /// Appends one record. The engine log is read at this point, not when the build ran.
    pub fn append(&self, record: &FailureRecord) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = self.render(record);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(text.as_bytes())
    }

    fn render(&self, record: &FailureRecord) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let return_code = record
            .return_code
            .map_or_else(|| "None".to_string(), |c| c.to_string());
        let tail = tail_text(&record.log_path, self.tail_lines);

        let mut out = String::new();
        out.push('\n');
        out.push_str(&"=".repeat(RULE_WIDTH));
        out.push('\n');
        out.push_str(&format!("FAILED: {}\n", record.job_name));
        out.push_str(&format!("Time: {timestamp}\n"));
        out.push_str(&format!("Template: {}\n", record.template.display()));
        out.push_str(&format!("Return code: {return_code}\n"));
        out.push_str(&format!("Command: {}\n", record.command_line));
        out.push_str(&format!(
            "Expected build log: {}  (exists={})\n",
            record.log_path.display(),
            record.log_path.exists()
        ));
        out.push_str(&format!(
            "Expected PDF      : {}  (exists={})\n",
            record.pdf_path.display(),
            record.pdf_path.exists()
        ));

        if let Some(error) = &record.error {
            out.push_str(&"-".repeat(RULE_WIDTH));
            out.push('\n');
            out.push_str("Error:\n");
            out.push_str(error);
            out.push('\n');
        }

        if let Some(first) = first_engine_error(&tail) {
            out.push_str(&format!("First engine error: {first}\n"));
        }

        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push('\n');
        out.push_str(&format!(
            "TAIL of build log (last ~{} lines):\n",
            self.tail_lines
        ));
        out.push_str(&tail);
        out.push('\n');
        out
    }
}

/// The last `n` lines of a file, or a marker explaining why there are none.
pub fn tail_text(path: &Path, n: usize) -> String {
    if !path.exists() {
        return format!("(missing: {})", path.display());
    }
    match fs::read(path) {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            let lines: Vec<&str> = text.lines().collect();
            let start = lines.len().saturating_sub(n);
            lines[start..].join("\n")
        }
        Err(e) => format!("(failed to read {}: {})", path.display(), e),
    }
}

/// First TeX error line (`! ...`) in engine output, without the leading `!`.
pub fn first_engine_error(log_text: &str) -> Option<&str> {
    log_text
        .lines()
        .filter_map(|line| line.strip_prefix('!'))
        .map(str::trim)
        .find(|msg| !msg.is_empty())
}

/// Renders an error and its chain of sources, one per line.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        out.push_str(&format!("\nCaused by: {cause}"));
        source = cause.source();
    }
    out
}
