//! # lulab i18n
//!
//! Localized display text for plots in Attractor Lab topics.
//!
//! ## Overview
//!
//! Plotting code asks for short keys (`age_gyr`, `legend_host_stars`) and gets
//! back a label or title in the active language. Translations live in two YAML
//! files per topic, `i18n/labels.yaml` and `i18n/titles.yaml`, which have grown
//! through several layouts over time. All of them are accepted:
//!
//! ```yaml
//! en:
//!   common:              # shared by every notebook
//!     age_gyr: "Age (Gyr)"
//!   ACAP_001:            # notebook namespace, wins over `common`
//!     legend_host_stars: "host stars"
//!   mass: "Mass"         # flat per-language entry, lowest priority
//! ru:
//!   common:
//!     age_gyr: "Возраст (млрд лет)"
//! ```
//!
//! plus the older `key -> {en, ru}` layout and plain `key: "text"` entries.
//! Each file is decoded once into a [`Dictionary`] variant.
//!
//! A missing translation is never an error: [`I18n::label`] and
//! [`I18n::title`] return the key itself so a plot never fails on text.
//!
//! ## Example
//!
//! ```
//! use lulab_i18n::{Dictionary, I18n};
//!
//! let mut i18n = I18n::new();
//! i18n.set_dictionaries(
//!     Dictionary::from_yaml_str("en:\n  common:\n    mass: Mass\nru:\n  common:\n    mass: Масса\n")?,
//!     Dictionary::default(),
//! );
//! i18n.set_language("ru")?;
//! assert_eq!(i18n.label("mass"), "Масса");
//! assert_eq!(i18n.label("radius"), "radius");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod context;
pub mod dictionary;
mod error;
pub mod fonts;
mod lang;

pub use context::{I18n, I18nSummary};
pub use dictionary::{Bundle, Dictionary, Entry};
pub use error::{DecodeError, I18nError};
pub use fonts::{FontHook, FontSettings};
pub use lang::Language;
