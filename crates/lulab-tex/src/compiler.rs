use crate::TexLayout;
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Environment variable holding TeX's include search path.
pub const SEARCH_PATH_VAR: &str = "TEXINPUTS";

#[cfg(windows)]
const SEARCH_PATH_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const SEARCH_PATH_SEPARATOR: &str = ":";

/// A Compiler holds the configuration for executing an external TeX build tool.
#[derive(Debug, Clone)]
pub struct Compiler {
    pub engine: String, // e.g., "latexmk"
    pub working_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Directory prepended to [`SEARCH_PATH_VAR`].
    pub search_dir: PathBuf,
    pub extra_args: Vec<String>,
    base_search_path: Option<OsString>,
}

impl Compiler {
    /// A `latexmk` compiler for a topic layout. The inherited `TEXINPUTS` is captured here.
    pub fn new(layout: &TexLayout) -> Self {
        Self {
            engine: "latexmk".to_string(),
            working_dir: layout.tex_dir.clone(),
            output_dir: layout.build_dir.clone(),
            search_dir: layout.tex_dir.clone(),
            extra_args: Vec::new(),
            base_search_path: std::env::var_os(SEARCH_PATH_VAR),
        }
    }

    pub fn with_engine(mut self, engine: &str) -> Self {
        self.engine = engine.to_string();
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Overrides the captured `TEXINPUTS` value that the search directory is prepended to.
    pub fn with_base_search_path(mut self, base: Option<OsString>) -> Self {
        self.base_search_path = base;
        self
    }

    /// `<search_dir><sep><inherited>`; always ends in the separator when nothing is
    /// inherited so TeX keeps its default search paths.
    pub fn search_path(&self) -> OsString {
        let mut value = self.search_dir.clone().into_os_string();
        value.push(SEARCH_PATH_SEPARATOR);
        if let Some(base) = &self.base_search_path {
            value.push(base);
        }
        value
    }

    /// Builds the command line for one template.
    ///
    /// `latexmk -pdf -interaction=nonstopmode -halt-on-error -outdir=<build> -jobname=<job> <template>`
    pub fn invocation(&self, template: &Path, job_name: &str) -> Invocation {
        let mut args = vec![
            "-pdf".to_string(),
            "-interaction=nonstopmode".to_string(),
            "-halt-on-error".to_string(),
            format!("-outdir={}", self.output_dir.display()),
            format!("-jobname={job_name}"),
        ];
        args.extend(self.extra_args.iter().cloned());
        args.push(template.to_string_lossy().into_owned());

        Invocation {
            program: self.engine.clone(),
            args,
            working_dir: self.working_dir.clone(),
            env: vec![(SEARCH_PATH_VAR.to_string(), self.search_path())],
        }
    }
}

/// A fully specified external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Variables set on top of the inherited environment.
    pub env: Vec<(String, OsString)>,
}

impl Invocation {
    /// The command as it would be typed, for logs and failure records.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// How an external command ended. `code` is `None` when it was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    pub code: Option<i32>,
}

impl ExitReport {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ExitReport {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Trait for executing build commands.
/// This allows us to replace the real TeX toolchain in tests.
pub trait CommandExecutor: fmt::Debug {
    /// Runs the command to completion. `Err` means it could not be run at all.
    fn execute(&self, invocation: &Invocation) -> io::Result<ExitReport>;
}

/// Runs commands with `std::process::Command`, blocking until they exit.
///
/// Output is inherited so the engine's progress shows in the terminal. There
/// is no timeout: a hung engine hangs the caller.
#[derive(Debug, Default)]
pub struct RealCommandExecutor;

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, invocation: &Invocation) -> io::Result<ExitReport> {
        log::info!("+ {}", invocation.command_line());
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .status()?;
        Ok(status.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> TexLayout {
        TexLayout::new("/topic/tex", "/topic/build")
    }

    #[test]
    fn test_invocation_flags() {
        let compiler = Compiler::new(&layout()).with_base_search_path(None);
        let inv = compiler.invocation(Path::new("/topic/tex/AZ_001_EN.tpl.tex"), "AZ_001_EN");

        assert_eq!(inv.program, "latexmk");
        assert_eq!(inv.working_dir, PathBuf::from("/topic/tex"));
        assert_eq!(
            inv.command_line(),
            "latexmk -pdf -interaction=nonstopmode -halt-on-error -outdir=/topic/build -jobname=AZ_001_EN /topic/tex/AZ_001_EN.tpl.tex"
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn test_search_path_keeps_defaults() {
        let fresh = Compiler::new(&layout()).with_base_search_path(None);
        assert_eq!(fresh.search_path(), OsString::from("/topic/tex:"));

        let inherited = Compiler::new(&layout()).with_base_search_path(Some("/core/tex:".into()));
        assert_eq!(inherited.search_path(), OsString::from("/topic/tex:/core/tex:"));

        let inv = inherited.invocation(Path::new("x.tpl.tex"), "x");
        assert_eq!(
            inv.env,
            vec![(SEARCH_PATH_VAR.to_string(), OsString::from("/topic/tex:/core/tex:"))]
        );
    }

    #[test]
    fn test_extra_args_precede_template() {
        let compiler = Compiler::new(&layout())
            .with_engine("latexmk-custom")
            .with_args(vec!["-file-line-error".to_string()]);
        let inv = compiler.invocation(Path::new("t.tpl.tex"), "t");
        assert_eq!(inv.program, "latexmk-custom");
        assert_eq!(inv.args.last().map(String::as_str), Some("t.tpl.tex"));
        assert_eq!(inv.args[inv.args.len() - 2], "-file-line-error");
    }

    #[test]
    fn test_exit_report() {
        assert!(ExitReport { code: Some(0) }.success());
        assert!(!ExitReport { code: Some(12) }.success());
        assert!(!ExitReport { code: None }.success());
    }
}
