//! Directory conventions of the Attractor Lab repository.
//!
//! ```text
//! <project>/
//!   topics/
//!     TOP_0001_exoplanet_birth_radius/   <- topic root (has meta/)
//!       meta/  data/{raw,interim,processed}/  notebooks/  figures/<lang>/
//!       i18n/  tex/  build/  animations/ ...
//! ```

use lulab_i18n::Language;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory whose presence marks the project root.
pub const TOPICS_DIR: &str = "topics";
/// Name prefix of every topic directory.
pub const TOPIC_PREFIX: &str = "TOP_";
/// Subdirectory that, together with the prefix, identifies a topic.
pub const META_DIR: &str = "meta";

#[derive(Debug, Error)]
pub enum TopicError {
    #[error("could not locate project root (folder containing '{marker}') starting from {}", start.display())]
    ProjectRootNotFound { marker: String, start: PathBuf },
    #[error("could not locate topic directory starting from {}", .0.display())]
    TopicNotFound(PathBuf),
    #[error("topic directory not found: {}", .0.display())]
    MissingTopic(PathBuf),
    #[error("I/O error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn absolute(start: &Path) -> Result<PathBuf, TopicError> {
    std::path::absolute(start).map_err(|source| TopicError::Io {
        path: start.to_path_buf(),
        source,
    })
}

/// Walks up from `start` to the first directory containing `marker`.
pub fn find_project_root(start: &Path, marker: &str) -> Result<PathBuf, TopicError> {
    let start = absolute(start)?;
    start
        .ancestors()
        .find(|dir| dir.join(marker).exists())
        .map(Path::to_path_buf)
        .ok_or_else(|| TopicError::ProjectRootNotFound {
            marker: marker.to_string(),
            start: start.clone(),
        })
}

/// Walks up from `start` (inclusive) to the enclosing `TOP_*` directory that has `meta/`.
pub fn find_topic_dir(start: &Path) -> Result<PathBuf, TopicError> {
    let start = absolute(start)?;
    start
        .ancestors()
        .find(|dir| is_topic_dir(dir))
        .map(Path::to_path_buf)
        .ok_or_else(|| TopicError::TopicNotFound(start.clone()))
}

pub fn is_topic_dir(dir: &Path) -> bool {
    dir.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with(TOPIC_PREFIX))
        && dir.join(META_DIR).is_dir()
}

/// `<project_root>/topics/<name>`, optionally creating it.
pub fn topic_root(project_root: &Path, name: &str, create: bool) -> Result<PathBuf, TopicError> {
    let root = project_root.join(TOPICS_DIR).join(name);
    if create {
        ensure_dir(&root)?;
    }
    if !root.exists() {
        return Err(TopicError::MissingTopic(root));
    }
    Ok(root)
}

pub fn ensure_dir(path: &Path) -> Result<(), TopicError> {
    fs::create_dir_all(path).map_err(|source| TopicError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Canonical paths inside one topic. Nothing is created until asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicLayout {
    pub root: PathBuf,
}

impl TopicLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout of the topic enclosing `start`.
    pub fn discover(start: &Path) -> Result<Self, TopicError> {
        let root = find_topic_dir(start)?;
        log::debug!("Topic root: {:?}", root);
        Ok(Self::new(root))
    }

    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn meta(&self) -> PathBuf {
        self.root.join(META_DIR)
    }

    pub fn sources(&self) -> PathBuf {
        self.root.join("sources")
    }

    pub fn data_raw(&self) -> PathBuf {
        self.root.join("data").join("raw")
    }

    pub fn data_interim(&self) -> PathBuf {
        self.root.join("data").join("interim")
    }

    pub fn data_processed(&self) -> PathBuf {
        self.root.join("data").join("processed")
    }

    pub fn notebooks(&self) -> PathBuf {
        self.root.join("notebooks")
    }

    pub fn scripts(&self) -> PathBuf {
        self.root.join("scripts")
    }

    pub fn figures(&self) -> PathBuf {
        self.root.join("figures")
    }

    /// Per-language figure directory, e.g. `figures/ru`.
    pub fn figures_for(&self, language: Language) -> PathBuf {
        self.figures().join(language.as_str())
    }

    pub fn tables(&self) -> PathBuf {
        self.root.join("tables")
    }

    pub fn tex(&self) -> PathBuf {
        self.root.join("tex")
    }

    pub fn build(&self) -> PathBuf {
        self.root.join("build")
    }

    pub fn i18n(&self) -> PathBuf {
        self.root.join("i18n")
    }

    pub fn animations(&self) -> PathBuf {
        self.root.join("animations")
    }

    /// Named paths in a stable order, for listing.
    pub fn entries(&self) -> Vec<(&'static str, PathBuf)> {
        vec![
            ("topic", self.root.clone()),
            ("meta", self.meta()),
            ("sources", self.sources()),
            ("data_raw", self.data_raw()),
            ("data_interim", self.data_interim()),
            ("data_processed", self.data_processed()),
            ("notebooks", self.notebooks()),
            ("scripts", self.scripts()),
            ("figures", self.figures()),
            ("tables", self.tables()),
            ("tex", self.tex()),
            ("build", self.build()),
            ("i18n", self.i18n()),
            ("animations", self.animations()),
        ]
    }
}
