use super::{LoadError, TextLoader, Verse};
use crate::books;
use crate::version::VersionCode;
use log::{debug, error};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// "<book> <chapter>:<verse> [(<title>)] <text>", titles may nest one level of
// parentheses for footnote markers.
static VERSE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)\s+(\d+):(\d+)\s*(?:\(((?:[^()]|\([^)]*\))*)\))?\s*(.+)$")
        .expect("verse line pattern")
});
static BOOK_NAME_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s+\d+:\d+").expect("book name pattern"));
// Cross-reference markers such as "(A)" in titles and verse text.
static FOOTNOTE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([A-C]\)\s*").expect("footnote marker pattern"));

fn strip_markers(text: &str, separator: &str) -> String {
    FOOTNOTE_MARKER
        .replace_all(text, separator)
        .trim()
        .to_string()
}

/// A whole book in one edition.
#[derive(Debug, Clone, Default)]
pub struct BookText {
    pub book_name: Option<String>,
    chapters: BTreeMap<u16, Vec<Verse>>,
}

impl BookText {
    pub fn chapter_count(&self) -> u16 {
        u16::try_from(self.chapters.len()).unwrap_or(u16::MAX)
    }

    pub fn chapter(&self, chapter: u16) -> Option<&[Verse]> {
        self.chapters.get(&chapter).map(Vec::as_slice)
    }
}

pub fn parse_book_text(text: &str) -> BookText {
    let text = text.trim();
    let first = text.lines().next().unwrap_or_default();
    let book_name = BOOK_NAME_PREFIX
        .captures(first)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string());

    let mut chapters: BTreeMap<u16, Vec<Verse>> = BTreeMap::new();
    for line in text.lines() {
        let Some(caps) = VERSE_LINE.captures(line.trim_end()) else {
            continue;
        };
        let (Ok(chapter), Ok(number)) = (caps[2].parse::<u16>(), caps[3].parse::<u16>()) else {
            continue;
        };
        let title = caps
            .get(4)
            .map(|m| strip_markers(m.as_str(), ""))
            .filter(|t| !t.is_empty());

        chapters.entry(chapter).or_default().push(Verse {
            chapter,
            number,
            title,
            text: strip_markers(&caps[5], " "),
            book_name: book_name.clone(),
        });
    }

    BookText {
        book_name,
        chapters,
    }
}

/// Reads `<root>/<language>/<version>/<NN>-<slug>-<version>.txt` files.
pub struct FileTextLoader {
    root: PathBuf,
    cache: Mutex<HashMap<(u8, VersionCode), Arc<BookText>>>,
}

impl FileTextLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn book_path(&self, book: u8, version: &VersionCode) -> Option<PathBuf> {
        let entry = books::by_number(book)?;
        let resolved = version.resolve_for_book(book);
        let file_name = format!("{:02}-{}-{}.txt", book, entry.slug(), resolved);
        Some(
            self.root
                .join(resolved.language_dir())
                .join(resolved.as_str())
                .join(file_name),
        )
    }

    pub fn load_book(&self, book: u8, version: &VersionCode) -> Result<Arc<BookText>, LoadError> {
        let resolved = version.resolve_for_book(book);
        let key = (book, resolved.clone());
        if let Some(cached) = self.cache.lock().ok().and_then(|c| c.get(&key).cloned()) {
            return Ok(cached);
        }

        let path = self
            .book_path(book, &resolved)
            .ok_or(LoadError::UnknownBook(book))?;
        let text = fs::read_to_string(&path).map_err(|source| {
            error!("Failed to read {:?}: {source}", path);
            LoadError::Io {
                path: path.clone(),
                source,
            }
        })?;

        let parsed = parse_book_text(&text);
        if parsed.chapters.is_empty() {
            error!("No verses parsed from {:?}", path);
            return Err(LoadError::Empty(book));
        }
        debug!(
            "Loaded {} book {}: {} chapters",
            resolved,
            book,
            parsed.chapter_count()
        );

        let parsed = Arc::new(parsed);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, parsed.clone());
        }
        Ok(parsed)
    }
}

impl TextLoader for FileTextLoader {
    fn chapter_count(&self, book: u8, version: &VersionCode) -> Result<u16, LoadError> {
        self.load_book(book, version).map(|b| b.chapter_count())
    }

    fn chapter_verses(
        &self,
        book: u8,
        chapter: u16,
        version: &VersionCode,
    ) -> Result<Vec<Verse>, LoadError> {
        let text = self.load_book(book, version)?;
        text.chapter(chapter)
            .map(<[Verse]>::to_vec)
            .ok_or(LoadError::MissingChapter { book, chapter })
    }
}
