use crate::TexError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Suffix identifying a buildable template, e.g. `ACA_001_RU.tpl.tex`.
pub const TEMPLATE_SUFFIX: &str = ".tpl.tex";
/// Suffix identifying a generated body fragment pulled in by a template.
pub const BODY_SUFFIX: &str = "_body.tex";

// \input{<anything without a closing brace>_body.tex}
static BODY_INPUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\input\{([^}]*_body\.tex)\}").expect("valid body input regex"));

/// Where a topic keeps its templates and where build output goes.
///
/// Templates are compiled with `tex_dir` as the working directory, so every
/// relative `\input` path is resolved against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexLayout {
    pub tex_dir: PathBuf,
    pub build_dir: PathBuf,
}

impl TexLayout {
    pub fn new(tex_dir: impl AsRef<Path>, build_dir: impl AsRef<Path>) -> Self {
        Self {
            tex_dir: normalize_path(tex_dir.as_ref()),
            build_dir: normalize_path(build_dir.as_ref()),
        }
    }

    /// `<topic>/tex` and `<topic>/build`.
    pub fn for_topic(topic_root: &Path) -> Self {
        Self::new(topic_root.join("tex"), topic_root.join("build"))
    }

    pub fn pdf_path(&self, job_name: &str) -> PathBuf {
        self.build_dir.join(format!("{job_name}.pdf"))
    }

    /// The engine's own log for a job.
    pub fn log_path(&self, job_name: &str) -> PathBuf {
        self.build_dir.join(format!("{job_name}.log"))
    }

    /// Returns the `\input{..._body.tex}` targets of a template, in source order.
    ///
    /// Paths are resolved against `tex_dir` and not deduplicated. Inputs whose
    /// name does not end in `_body.tex` are ignored.
    pub fn discover_body_dependencies(&self, template: &Path) -> io::Result<Vec<PathBuf>> {
        let text = fs::read_to_string(template)?;
        Ok(BODY_INPUT
            .captures_iter(&text)
            .filter_map(|cap| cap.get(1))
            .map(|rel| normalize_path(&self.tex_dir.join(rel.as_str())))
            .collect())
    }

    /// Selects the templates to build.
    ///
    /// 1. `explicit`: exactly that file inside `tex_dir`; `patterns` are ignored.
    /// 2. `patterns` (repeatable, comma-separated): glob matches relative to
    ///    `tex_dir`, limited to `*.tpl.tex` files, deduplicated in first-seen order.
    /// 3. Otherwise every `*.tpl.tex` file in `tex_dir`, sorted.
    pub fn discover_templates(
        &self,
        explicit: Option<&str>,
        patterns: &[String],
    ) -> Result<Vec<PathBuf>, TexError> {
        if !self.tex_dir.is_dir() {
            return Err(TexError::MissingTexDir(self.tex_dir.clone()));
        }

        if let Some(name) = explicit.filter(|n| !n.is_empty()) {
            let path = self.tex_dir.join(name);
            if !path.exists() {
                return Err(TexError::MissingTemplate(path));
            }
            return Ok(vec![normalize_path(&path)]);
        }

        let patterns = split_patterns(patterns);
        if !patterns.is_empty() {
            return self.glob_templates(&patterns);
        }

        let entries = fs::read_dir(&self.tex_dir).map_err(|source| TexError::Io {
            path: self.tex_dir.clone(),
            source,
        })?;
        let mut templates: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| is_template_file(p))
            .map(|p| normalize_path(&p))
            .collect();
        templates.sort();
        Ok(templates)
    }

    fn glob_templates(&self, patterns: &[String]) -> Result<Vec<PathBuf>, TexError> {
        let base = glob::Pattern::escape(&self.tex_dir.to_string_lossy());
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for pattern in patterns {
            let full = format!("{base}/{pattern}");
            let paths = glob::glob(&full).map_err(|source| TexError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;

            let mut matches: Vec<PathBuf> = paths
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        log::warn!("Skipping unreadable glob match: {}", e);
                        None
                    }
                })
                .collect();
            matches.sort();

            for path in matches.into_iter().filter(|p| is_template_file(p)) {
                let key = fs::canonicalize(&path).unwrap_or_else(|_| normalize_path(&path));
                if seen.insert(key) {
                    found.push(normalize_path(&path));
                }
            }
        }

        if found.is_empty() {
            return Err(TexError::NoTemplatesMatched(patterns.to_vec()));
        }
        Ok(found)
    }
}

fn is_template_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().ends_with(TEMPLATE_SUFFIX))
}

/// Job name for a template: `ACA_001_RU.tpl.tex` becomes `ACA_001_RU`.
///
/// Files without the template suffix use their stem.
pub fn derive_job_name(template: &Path) -> String {
    let name = template
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(TEMPLATE_SUFFIX) {
        Some(job) => job.to_string(),
        None => template
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// Flattens repeated and comma-separated pattern arguments, dropping blanks.
pub fn split_patterns(patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .flat_map(|p| p.split(','))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Makes `path` absolute and removes `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_job_name() {
        assert_eq!(derive_job_name(Path::new("ACA_001_RU.tpl.tex")), "ACA_001_RU");
        assert_eq!(derive_job_name(Path::new("/t/tex/AZ_001_EN.tpl.tex")), "AZ_001_EN");
        assert_eq!(derive_job_name(Path::new("CHR.tex")), "CHR");
        assert_eq!(derive_job_name(Path::new("notes.tpl")), "notes");
    }

    #[test]
    fn test_split_patterns() {
        let raw = vec![
            "ACAP_*.tpl.tex, ANIM_*.tpl.tex".to_string(),
            " ".to_string(),
            "X.tpl.tex,,".to_string(),
        ];
        assert_eq!(
            split_patterns(&raw),
            vec!["ACAP_*.tpl.tex", "ANIM_*.tpl.tex", "X.tpl.tex"]
        );
        assert!(split_patterns(&[]).is_empty());
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert!(normalize_path(Path::new("rel")).is_absolute());
    }

    #[test]
    fn test_body_regex_matches_only_body_inputs() {
        let text = r"\input{a_body.tex} \input{b.tex} \input{../_tmp/c_body.tex}\include{d_body.tex}";
        let found: Vec<&str> = BODY_INPUT
            .captures_iter(text)
            .map(|c| c.get(1).unwrap().as_str())
            .collect();
        assert_eq!(found, vec!["a_body.tex", "../_tmp/c_body.tex"]);
    }
}
