//! In-memory collaborators for exercising the reader without files or a terminal.

use crate::books;
use crate::loader::{
    LoadCompletion, LoadDispatcher, LoadError, LoadRequest, LoadTicket, TextLoader, Verse,
};
use crate::render::{RenderTarget, Renderer};
use crate::state::Position;
use crate::version::VersionCode;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

/// Real chapter counts of the canonical books, Genesis through Revelation.
pub const CHAPTER_COUNTS: [u16; 66] = [
    50, 40, 27, 36, 34, 24, 21, 4, 31, 24, 22, 25, 29, 36, 10, 13, 10, 42, 150, 31, 12, 8, 66, 52,
    5, 48, 12, 14, 3, 9, 1, 4, 7, 3, 3, 3, 2, 14, 4, 28, 16, 24, 21, 28, 16, 16, 13, 6, 6, 4, 4, 5,
    3, 6, 4, 3, 1, 13, 5, 5, 3, 5, 1, 1, 1, 22,
];

/// Loader answering from the chapter-count table. Verse text encodes the
/// address and resolved version, e.g. `43:3:1 kjv`.
#[derive(Debug, Clone, Default)]
pub struct FakeLoader {
    overrides: HashMap<(u8, VersionCode), u16>,
    failing_books: HashSet<u8>,
    failing_versions: HashSet<VersionCode>,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count(mut self, book: u8, version: &str, count: u16) -> Self {
        self.overrides.insert((book, VersionCode::new(version)), count);
        self
    }

    pub fn failing_book(mut self, book: u8) -> Self {
        self.failing_books.insert(book);
        self
    }

    pub fn failing_version(mut self, version: &str) -> Self {
        self.failing_versions.insert(VersionCode::new(version));
        self
    }

    pub fn count_for(&self, book: u8) -> u16 {
        CHAPTER_COUNTS[usize::from(book) - 1]
    }

    fn check(&self, book: u8, version: &VersionCode) -> Result<(), LoadError> {
        if books::by_number(book).is_none() {
            return Err(LoadError::UnknownBook(book));
        }
        if self.failing_books.contains(&book) || self.failing_versions.contains(version) {
            return Err(LoadError::Io {
                path: PathBuf::from(format!("fake/{version}/{book:02}.txt")),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "fake failure"),
            });
        }
        Ok(())
    }
}

impl TextLoader for FakeLoader {
    fn chapter_count(&self, book: u8, version: &VersionCode) -> Result<u16, LoadError> {
        self.check(book, version)?;
        Ok(self
            .overrides
            .get(&(book, version.clone()))
            .copied()
            .unwrap_or_else(|| self.count_for(book)))
    }

    fn chapter_verses(
        &self,
        book: u8,
        chapter: u16,
        version: &VersionCode,
    ) -> Result<Vec<Verse>, LoadError> {
        let count = self.chapter_count(book, version)?;
        if chapter == 0 || chapter > count {
            return Err(LoadError::MissingChapter { book, chapter });
        }
        let resolved = version.resolve_for_book(book);
        let book_name = version
            .uses_hebrew_names(book)
            .then(|| format!("hebrew-{book}"));
        Ok((1..=3)
            .map(|number| Verse {
                chapter,
                number,
                title: (number == 1).then(|| format!("Section {chapter}")),
                text: format!("{book}:{chapter}:{number} {resolved}"),
                book_name: book_name.clone(),
            })
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderCall {
    pub target: RenderTarget,
    pub verses: Vec<Verse>,
    pub display_book_name: String,
}

impl RenderCall {
    /// First verse text, or `None` for an empty-content render.
    pub fn first_text(&self) -> Option<&str> {
        self.verses.first().map(|v| v.text.as_str())
    }
}

/// Renderer that records every call.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<RenderCall>,
    pub cleared: Vec<RenderTarget>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_for(&self, target: RenderTarget) -> Option<&RenderCall> {
        self.calls.iter().rev().find(|c| c.target == target)
    }

    pub fn count_for(&self, target: RenderTarget) -> usize {
        self.calls.iter().filter(|c| c.target == target).count()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, target: RenderTarget, verses: &[Verse], display_book_name: &str) {
        self.calls.push(RenderCall {
            target,
            verses: verses.to_vec(),
            display_book_name: display_book_name.to_string(),
        });
    }

    fn clear(&mut self, target: RenderTarget) {
        self.cleared.push(target);
    }
}

struct ManualQueue {
    loader: Arc<dyn TextLoader>,
    pending: Vec<LoadRequest>,
    completed: Vec<LoadCompletion>,
}

/// Dispatcher that parks every request until the test completes it.
pub struct ManualDispatcher {
    queue: Rc<RefCell<ManualQueue>>,
}

/// Test-side view of a [`ManualDispatcher`].
#[derive(Clone)]
pub struct ManualDispatchHandle {
    queue: Rc<RefCell<ManualQueue>>,
}

impl ManualDispatcher {
    pub fn new(loader: Arc<dyn TextLoader>) -> (Self, ManualDispatchHandle) {
        let queue = Rc::new(RefCell::new(ManualQueue {
            loader,
            pending: Vec::new(),
            completed: Vec::new(),
        }));
        (
            Self {
                queue: queue.clone(),
            },
            ManualDispatchHandle { queue },
        )
    }
}

impl LoadDispatcher for ManualDispatcher {
    fn dispatch(&mut self, request: LoadRequest) {
        self.queue.borrow_mut().pending.push(request);
    }

    fn drain(&mut self) -> Vec<LoadCompletion> {
        std::mem::take(&mut self.queue.borrow_mut().completed)
    }
}

impl ManualDispatchHandle {
    pub fn pending(&self) -> Vec<LoadRequest> {
        self.queue.borrow().pending.clone()
    }

    pub fn pending_for(&self, target: RenderTarget) -> Vec<LoadRequest> {
        self.pending()
            .into_iter()
            .filter(|r| r.target == target)
            .collect()
    }

    /// Resolves one parked request. Returns false if the ticket is unknown.
    pub fn complete(&self, ticket: LoadTicket) -> bool {
        let mut queue = self.queue.borrow_mut();
        let Some(idx) = queue.pending.iter().position(|r| r.ticket == ticket) else {
            return false;
        };
        let request = queue.pending.remove(idx);
        let completion = LoadCompletion::run(queue.loader.as_ref(), request);
        queue.completed.push(completion);
        true
    }

    /// Resolves a parked request with a caller-chosen result.
    pub fn complete_with(&self, ticket: LoadTicket, result: Result<Vec<Verse>, LoadError>) -> bool {
        let mut queue = self.queue.borrow_mut();
        let Some(idx) = queue.pending.iter().position(|r| r.ticket == ticket) else {
            return false;
        };
        let request = queue.pending.remove(idx);
        queue.completed.push(LoadCompletion { request, result });
        true
    }

    pub fn complete_all(&self) {
        let tickets: Vec<LoadTicket> = self.pending().iter().map(|r| r.ticket).collect();
        for ticket in tickets {
            self.complete(ticket);
        }
    }

    pub fn complete_all_reversed(&self) {
        let tickets: Vec<LoadTicket> = self.pending().iter().rev().map(|r| r.ticket).collect();
        for ticket in tickets {
            self.complete(ticket);
        }
    }
}

/// Expected verse text of the fake loader for quick assertions.
pub fn fake_text(position: Position, version: &str, verse: u16) -> String {
    let resolved = VersionCode::new(version).resolve_for_book(position.book);
    format!("{}:{}:{} {}", position.book, position.chapter, verse, resolved)
}
