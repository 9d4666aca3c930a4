use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use lulab_i18n::I18n;
use lulab_tex::{BatchOptions, BatchReport, Builder, Compiler, SanitizeOptions, TexLayout};
use lulab_topic::TopicLayout;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "lulab")]
#[command(about = "Attractor Lab document tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build PDFs from one template, a pattern set, or all templates of a topic
    BuildPdfs(BuildArgs),
    /// Sanitize a TeX file in place
    Sanitize {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Escape `#` and `&` (header material only)
        #[arg(long)]
        headers: bool,
        /// Rewrite Greek letters, sub/superscripts and invisible characters
        #[arg(long)]
        unicode_math: bool,
    },
    /// Resolve a plot label key
    Label(LookupArgs),
    /// Resolve a plot title key
    Title(LookupArgs),
    /// Print the loaded i18n state of a topic
    I18nState(I18nArgs),
    /// Print the canonical paths of a topic
    Topic {
        /// Directory to start the topic search from (default: current directory)
        #[arg(long)]
        start: Option<PathBuf>,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Topic directory (default: the topic enclosing the current directory)
    #[arg(long)]
    topic: Option<PathBuf>,
    /// Build only this template filename inside tex/ (e.g. ACAP_001_EN.tpl.tex)
    #[arg(long)]
    tpl: Option<String>,
    /// Glob pattern(s) relative to tex/; repeatable or comma-separated
    #[arg(long = "pattern")]
    patterns: Vec<String>,
    /// Override the job name (only with --tpl)
    #[arg(long)]
    jobname: Option<String>,
    /// Do not reset the failures log at start
    #[arg(long)]
    keep_fail_log: bool,
    /// Stop at the first failed PDF
    #[arg(long)]
    stop_on_fail: bool,
    /// Print the batch report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct I18nArgs {
    /// Topic directory (default: the topic enclosing the current directory)
    #[arg(long)]
    topic: Option<PathBuf>,
    /// Language code (en, ru)
    #[arg(long, default_value = "en")]
    lang: String,
    /// Notebook namespace, e.g. ACAP_001
    #[arg(long)]
    notebook: Option<String>,
    /// Fail if labels.yaml or titles.yaml is missing
    #[arg(long)]
    strict: bool,
}

#[derive(Args)]
struct LookupArgs {
    #[arg(value_name = "KEY")]
    key: String,
    #[command(flatten)]
    i18n: I18nArgs,
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::BuildPdfs(args) => build_pdfs(args),
        Commands::Sanitize {
            path,
            headers,
            unicode_math,
        } => {
            let options = SanitizeOptions {
                headers,
                unicode_math,
            };
            let changed = lulab_tex::sanitize_file_in_place(&path, options)
                .with_context(|| format!("Failed to sanitize {}", path.display()))?;
            println!("{}: {}", path.display(), if changed { "sanitized" } else { "unchanged" });
            Ok(ExitCode::SUCCESS)
        }
        Commands::Label(args) => {
            let i18n = load_i18n(&args.i18n)?;
            println!("{}", i18n.label(&args.key));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Title(args) => {
            let i18n = load_i18n(&args.i18n)?;
            println!("{}", i18n.title(&args.key));
            Ok(ExitCode::SUCCESS)
        }
        Commands::I18nState(args) => {
            let i18n = load_i18n(&args)?;
            println!("{}", i18n.summary());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Topic { start } => {
            let layout = topic_layout(start.as_deref())?;
            for (name, path) in layout.entries() {
                println!("{:<15} {}", name, path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn topic_layout(explicit: Option<&Path>) -> anyhow::Result<TopicLayout> {
    match explicit {
        Some(dir) => Ok(TopicLayout::new(dir)),
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            Ok(TopicLayout::discover(&cwd)?)
        }
    }
}

fn load_i18n(args: &I18nArgs) -> anyhow::Result<I18n> {
    let topic = topic_layout(args.topic.as_deref())?;
    let mut i18n = I18n::new();
    i18n.load_dictionaries(&topic.root, args.strict)
        .with_context(|| format!("Failed to load i18n for {}", topic.root.display()))?;
    i18n.set_language(&args.lang)?;
    i18n.set_namespace(args.notebook.as_deref());
    Ok(i18n)
}

fn build_pdfs(args: BuildArgs) -> anyhow::Result<ExitCode> {
    let topic = topic_layout(args.topic.as_deref())?;
    let layout = TexLayout::for_topic(&topic.root);
    let builder = Builder::new(layout.clone(), Compiler::new(&layout));

    let mut options = batch_options(&args, &topic);
    builder
        .reset_failure_log(&options)
        .with_context(|| format!("Failed to reset {}", builder.failure_log().path().display()))?;
    options.keep_failure_log = true;

    let templates = layout.discover_templates(args.tpl.as_deref(), &args.patterns)?;
    for t in &templates {
        log::info!(" - {}", t.file_name().unwrap_or_default().to_string_lossy());
    }

    let report = builder
        .run_batch(&templates, &options)
        .with_context(|| format!("Failed to write {}", builder.failure_log().path().display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.is_success() {
        println!("ALL OK. PDFs in: {}", layout.build_dir.display());
    } else {
        println!("FAILED:");
        for job in &report.failed {
            println!(" - {}", job);
        }
        println!("See: {}", builder.failure_log().path().display());
    }

    Ok(exit_code(&report))
}

fn exit_code(report: &BatchReport) -> ExitCode {
    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn batch_options(args: &BuildArgs, topic: &TopicLayout) -> BatchOptions {
    BatchOptions {
        stop_on_failure: args.stop_on_fail,
        keep_failure_log: args.keep_fail_log,
        // A job name only makes sense for an explicitly named template.
        job_name_override: args.tpl.as_ref().and(args.jobname.clone()),
        topic_dir: Some(topic.root.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_args(argv: &[&str]) -> BuildArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::BuildPdfs(args) => args,
            _ => panic!("expected build-pdfs"),
        }
    }

    #[test]
    fn test_parse_build_pdfs() {
        let args = build_args(&[
            "lulab",
            "build-pdfs",
            "--pattern",
            "ACAP_*.tpl.tex,ANIM_*.tpl.tex",
            "--pattern",
            "X.tpl.tex",
            "--stop-on-fail",
            "--keep-fail-log",
        ]);
        assert_eq!(args.patterns.len(), 2);
        assert!(args.stop_on_fail);
        assert!(args.keep_fail_log);
        assert!(args.tpl.is_none());
    }

    #[test]
    fn test_jobname_ignored_without_tpl() {
        let topic = TopicLayout::new("/p/topics/TOP_0001_x");

        let batch = build_args(&["lulab", "build-pdfs", "--jobname", "J"]);
        assert_eq!(batch_options(&batch, &topic).job_name_override, None);

        let single = build_args(&["lulab", "build-pdfs", "--tpl", "A.tpl.tex", "--jobname", "J"]);
        let options = batch_options(&single, &topic);
        assert_eq!(options.job_name_override.as_deref(), Some("J"));
        assert_eq!(options.topic_dir, Some(PathBuf::from("/p/topics/TOP_0001_x")));
    }

    #[test]
    fn test_parse_label() {
        let cli = Cli::try_parse_from([
            "lulab", "label", "age_gyr", "--lang", "ru", "--notebook", "ACAP_001", "--strict",
        ])
        .unwrap();
        match cli.command {
            Commands::Label(args) => {
                assert_eq!(args.key, "age_gyr");
                assert_eq!(args.i18n.lang, "ru");
                assert_eq!(args.i18n.notebook.as_deref(), Some("ACAP_001"));
                assert!(args.i18n.strict);
            }
            _ => panic!("expected label"),
        }
    }

    #[test]
    fn test_load_i18n_for_explicit_topic() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("i18n")).unwrap();
        std::fs::write(
            dir.path().join("i18n").join("labels.yaml"),
            "en:\n  common:\n    k: common\n  NB:\n    k: scoped\n",
        )
        .unwrap();

        let args = I18nArgs {
            topic: Some(dir.path().to_path_buf()),
            lang: "en".to_string(),
            notebook: Some("NB".to_string()),
            strict: false,
        };
        let i18n = load_i18n(&args).unwrap();
        assert_eq!(i18n.label("k"), "scoped");
        assert_eq!(i18n.title("k"), "k");

        let strict = I18nArgs { strict: true, ..args };
        assert!(load_i18n(&strict).is_err());
    }

    #[test]
    fn test_exit_code_follows_report() {
        let mut report = BatchReport::default();
        assert_eq!(exit_code(&report), ExitCode::SUCCESS);

        report.succeeded.push("A".to_string());
        report.failed.push("B".to_string());
        assert_eq!(exit_code(&report), ExitCode::FAILURE);
    }

    #[test]
    fn test_missing_template_still_resets_failure_log() {
        let dir = tempfile::tempdir().unwrap();
        let layout = TexLayout::for_topic(dir.path());
        std::fs::create_dir_all(&layout.tex_dir).unwrap();
        std::fs::create_dir_all(&layout.build_dir).unwrap();
        let log_path = layout.build_dir.join(lulab_tex::failure_log::FAILURE_LOG_NAME);
        std::fs::write(&log_path, "FAILED: stale\n").unwrap();

        let args = build_args(&[
            "lulab",
            "build-pdfs",
            "--topic",
            dir.path().to_str().unwrap(),
            "--tpl",
            "MISSING.tpl.tex",
        ]);
        assert!(build_pdfs(args).is_err());

        let log = std::fs::read_to_string(&log_path).unwrap();
        assert!(!log.contains("stale"));
        assert!(log.starts_with("build_pdfs failures log"));
    }
}
