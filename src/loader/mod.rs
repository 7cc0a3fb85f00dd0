pub mod dispatch;
pub mod text_file;

pub use dispatch::{
    BackgroundDispatcher, InlineDispatcher, LoadCompletion, LoadDispatcher, LoadRequest,
    LoadTicket,
};
pub use text_file::FileTextLoader;

use crate::version::VersionCode;
use std::path::PathBuf;
use thiserror::Error;

/// One parsed verse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verse {
    pub chapter: u16,
    pub number: u16,
    pub title: Option<String>,
    pub text: String,
    /// Book name as written in the source text (Hebrew for WLC).
    pub book_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("book {0} is not in the catalog")]
    UnknownBook(u8),
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("chapter {chapter} not found in book {book}")]
    MissingChapter { book: u8, chapter: u16 },
    #[error("no verses could be parsed for book {0}")]
    Empty(u8),
}

/// Source of chapter text. Implementations cache internally and are shared
/// between the panels and the single-panel view.
pub trait TextLoader: Send + Sync {
    fn chapter_count(&self, book: u8, version: &VersionCode) -> Result<u16, LoadError>;

    fn chapter_verses(
        &self,
        book: u8,
        chapter: u16,
        version: &VersionCode,
    ) -> Result<Vec<Verse>, LoadError>;
}
