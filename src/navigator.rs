use crate::books::BOOK_COUNT;
use crate::loader::TextLoader;
use crate::state::Position;
use crate::version::VersionCode;
use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterDirection {
    Next,
    Previous,
}

/// Number of chapters in `book`. An unresolvable count is treated as a
/// single chapter so navigation degrades instead of failing.
pub fn chapter_count_or_one(loader: &dyn TextLoader, book: u8, version: &VersionCode) -> u16 {
    match loader.chapter_count(book, version) {
        Ok(0) => 1,
        Ok(count) => count,
        Err(e) => {
            warn!("Chapter count unavailable for book {book} ({version}): {e}");
            1
        }
    }
}

/// Computes the chapter one step away from `from`, rolling over book
/// boundaries and saturating at Genesis 1 and the last chapter of Revelation.
pub fn step(
    loader: &dyn TextLoader,
    from: Position,
    direction: ChapterDirection,
    version: &VersionCode,
) -> Position {
    let max = chapter_count_or_one(loader, from.book, version);

    match direction {
        ChapterDirection::Previous if from.chapter > 1 => {
            Position::new(from.book, from.chapter.min(max.saturating_add(1)) - 1)
        }
        ChapterDirection::Previous if from.book > 1 => {
            let book = from.book - 1;
            Position::new(book, chapter_count_or_one(loader, book, version))
        }
        ChapterDirection::Next if from.chapter < max => Position::new(from.book, from.chapter + 1),
        ChapterDirection::Next if from.book < BOOK_COUNT => Position::new(from.book + 1, 1),
        _ => from,
    }
}
