use crate::books;
use crate::version::VersionCode;
use std::fmt;

/// A chapter address: canonical book number (1-66) and 1-based chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub book: u8,
    pub chapter: u16,
}

impl Position {
    pub const fn new(book: u8, chapter: u16) -> Self {
        Self { book, chapter }
    }

    /// Genesis 1.
    pub const fn first() -> Self {
        Self::new(1, 1)
    }

    pub fn is_valid(&self) -> bool {
        books::is_valid_book(self.book) && self.chapter >= 1
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::first()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match books::by_number(self.book) {
            Some(book) => write!(f, "{} {}", book.name, self.chapter),
            None => write!(f, "book#{} {}", self.book, self.chapter),
        }
    }
}

/// Stable identifier of one of the two split-view panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelId {
    Left,
    Right,
}

impl PanelId {
    pub fn other(self) -> PanelId {
        match self {
            PanelId::Left => PanelId::Right,
            PanelId::Right => PanelId::Left,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PanelId::Left => "left",
            PanelId::Right => "right",
        }
    }
}

/// The primary panel is seeded from and synchronized back to global state and
/// can never be closed on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelRole {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    pub id: PanelId,
    pub role: PanelRole,
    pub position: Position,
    pub version: VersionCode,
}

impl PanelState {
    pub fn new(id: PanelId, role: PanelRole, position: Position, version: VersionCode) -> Self {
        Self {
            id,
            role,
            position,
            version,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.role == PanelRole::Primary
    }
}

/// What the single-panel view shows. While split view is active it mirrors
/// the primary panel's version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalNavigationState {
    pub position: Position,
    pub version: VersionCode,
}

impl GlobalNavigationState {
    pub fn new(position: Position, version: VersionCode) -> Self {
        Self { position, version }
    }
}

impl Default for GlobalNavigationState {
    fn default() -> Self {
        Self::new(Position::first(), VersionCode::default())
    }
}
