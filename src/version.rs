use crate::books::LAST_OLD_TESTAMENT_BOOK;
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Sentinel selecting the original-language edition of whichever book is shown.
pub const ORIGINAL: &str = "original";
pub const HEBREW_OT: &str = "wlc";
pub const GREEK_NT: &str = "na28-ubs5";
pub const DEFAULT_VERSION: &str = "esv";

/// Identifier of a translation or original-language edition, e.g. `esv` or `original`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionCode(String);

impl VersionCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_lowercase())
    }

    pub fn original() -> Self {
        Self(ORIGINAL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_original(&self) -> bool {
        self.0 == ORIGINAL
    }

    /// Concrete edition to read for `book`: the sentinel becomes WLC for the
    /// Old Testament and NA28/UBS5 for the New Testament.
    pub fn resolve_for_book(&self, book: u8) -> VersionCode {
        if !self.is_original() {
            return self.clone();
        }
        if book <= LAST_OLD_TESTAMENT_BOOK {
            VersionCode(HEBREW_OT.to_string())
        } else {
            VersionCode(GREEK_NT.to_string())
        }
    }

    /// True when `book` is displayed with its Hebrew book name.
    pub fn uses_hebrew_names(&self, book: u8) -> bool {
        (self.0 == HEBREW_OT || self.is_original()) && book <= LAST_OLD_TESTAMENT_BOOK
    }

    /// Directory under the text root holding this (resolved) edition.
    pub fn language_dir(&self) -> &'static str {
        match self.0.as_str() {
            "wlc" | "hhh" => "hebrew",
            "na28" | "na28-ubs5" => "greek",
            "em" | "lbla" | "rvr1995" | "se" => "spanish",
            "ls" => "french",
            "lut" => "german",
            "cht" => "chinese",
            "nav" | "svd" => "arabic",
            "kor" => "korean",
            "rst" => "russian",
            "vul" => "latin",
            "abtag2001" | "apsd-ceb" | "ceb" => "filipino",
            "erv-hi" | "shb" => "hindi",
            "jlb" => "japanese",
            "ukr" => "ukrainian",
            _ => "english",
        }
    }
}

impl Default for VersionCode {
    fn default() -> Self {
        Self(DEFAULT_VERSION.to_string())
    }
}

impl fmt::Display for VersionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionCode {
    fn from(code: &str) -> Self {
        VersionCode::new(code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub code: VersionCode,
    pub name: String,
    pub language: String,
}

impl VersionInfo {
    /// The part of the name before " - " ("ESV - English Standard Version" -> "ESV").
    pub fn short_code(&self) -> &str {
        self.name.split(" - ").next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionsFile {
    languages: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    language_names: serde_json::Map<String, serde_json::Value>,
}

/// Selectable editions, grouped by language in file order. The
/// original-language sentinel is always first.
#[derive(Debug, Clone)]
pub struct VersionCatalog {
    versions: Vec<VersionInfo>,
}

impl VersionCatalog {
    pub fn load(bible_dir: &Path) -> Self {
        let path = bible_dir.join("versions.json");
        match Self::load_from_file(&path) {
            Ok(catalog) => {
                debug!("Loaded {} versions from {:?}", catalog.len(), path);
                catalog
            }
            Err(e) => {
                warn!("Failed to load version catalog {:?}: {e:#}", path);
                Self::fallback()
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read versions.json")?;
        Self::parse(&content)
    }

    pub fn parse(json: &str) -> Result<Self> {
        let file: VersionsFile =
            serde_json::from_str(json).context("Failed to parse versions.json")?;

        let mut versions = vec![original_entry()];
        for (language, entries) in &file.languages {
            let Some(entries) = entries.as_object() else {
                warn!("Ignoring malformed language group {language:?}");
                continue;
            };
            let language = match file.language_names.get(language).and_then(|n| n.as_str()) {
                Some(native) if native != language => format!("{language} ({native})"),
                _ => language.clone(),
            };
            for (id, name) in entries {
                if id == ORIGINAL {
                    continue;
                }
                versions.push(VersionInfo {
                    code: VersionCode::new(id.as_str()),
                    name: name.as_str().unwrap_or(id).to_string(),
                    language: language.clone(),
                });
            }
        }

        Ok(Self { versions })
    }

    pub fn fallback() -> Self {
        Self {
            versions: vec![
                original_entry(),
                VersionInfo {
                    code: VersionCode::default(),
                    name: "ESV - English Standard Version".to_string(),
                    language: "English".to_string(),
                },
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn versions(&self) -> &[VersionInfo] {
        &self.versions
    }

    pub fn get(&self, code: &VersionCode) -> Option<&VersionInfo> {
        self.versions.iter().find(|v| &v.code == code)
    }

    pub fn contains(&self, code: &VersionCode) -> bool {
        self.get(code).is_some()
    }

    pub fn short_code<'a>(&'a self, code: &'a VersionCode) -> &'a str {
        self.get(code).map(|v| v.short_code()).unwrap_or(code.as_str())
    }

    /// Neighbour of `code` in catalog order, wrapping around. Unknown codes
    /// start from the first entry.
    pub fn cycle(&self, code: &VersionCode, forward: bool) -> VersionCode {
        let len = self.versions.len();
        if len == 0 {
            return code.clone();
        }
        let next = match self.versions.iter().position(|v| &v.code == code) {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        self.versions[next].code.clone()
    }
}

fn original_entry() -> VersionInfo {
    VersionInfo {
        code: VersionCode::original(),
        name: "WLC/UBS5 - Hebrew / Greek".to_string(),
        language: "Original Languages".to_string(),
    }
}
