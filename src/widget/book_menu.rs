use crate::books::{self, Testament};
use crate::main_app::VimNavMotions;
use crate::state::Position;
use crate::theme::Base16Palette;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

pub enum BookMenuAction {
    Close,
    Select { book: u8, chapter: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuStage {
    Books,
    Chapters { book: u8, count: u16 },
}

/// Sidebar listing the books, then the chapters of the chosen book.
pub struct BookMenu {
    stage: MenuStage,
    state: ListState,
    // Book row to return to when backing out of the chapter list.
    book_index: usize,
    current: Position,
}

impl BookMenu {
    pub fn new(current: Position) -> Self {
        let book_index = usize::from(current.book.max(1)) - 1;
        let mut state = ListState::default();
        state.select(Some(book_index));
        Self {
            stage: MenuStage::Books,
            state,
            book_index,
            current,
        }
    }

    /// Highlights the position shown in the reading view and, on the book
    /// list, moves the cursor to its book.
    pub fn set_current(&mut self, current: Position) {
        self.current = current;
        if self.stage == MenuStage::Books && books::is_valid_book(current.book) {
            self.book_index = usize::from(current.book) - 1;
            self.state.select(Some(self.book_index));
        }
    }

    pub fn is_choosing_chapter(&self) -> bool {
        matches!(self.stage, MenuStage::Chapters { .. })
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    fn len(&self) -> usize {
        match self.stage {
            MenuStage::Books => books::all().len(),
            MenuStage::Chapters { count, .. } => usize::from(count),
        }
    }

    fn select_clamped(&mut self, index: usize) {
        let len = self.len();
        if len > 0 {
            self.state.select(Some(index.min(len - 1)));
        }
    }

    fn open_chapters(&mut self, book: u8, count: u16) {
        self.book_index = self.state.selected().unwrap_or(0);
        self.stage = MenuStage::Chapters {
            book,
            count: count.max(1),
        };
        let start = if self.current.book == book {
            usize::from(self.current.chapter.saturating_sub(1))
        } else {
            0
        };
        self.state = ListState::default();
        self.select_clamped(start);
    }

    fn back_to_books(&mut self) {
        self.stage = MenuStage::Books;
        self.state = ListState::default();
        self.state.select(Some(self.book_index));
    }

    pub fn handle_key(
        &mut self,
        key: crossterm::event::KeyEvent,
        chapter_count: &dyn Fn(u8) -> u16,
    ) -> Option<BookMenuAction> {
        use crossterm::event::{KeyCode, KeyModifiers};

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.handle_j();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.handle_k();
                None
            }
            KeyCode::Char('g') => {
                self.handle_gg();
                None
            }
            KeyCode::Char('G') => {
                self.handle_upper_g();
                None
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.handle_ctrl_d();
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.handle_ctrl_u();
                None
            }
            KeyCode::Enter => {
                let index = self.state.selected()?;
                match self.stage {
                    MenuStage::Books => {
                        let book = books::all().get(index)?.number;
                        self.open_chapters(book, chapter_count(book));
                        None
                    }
                    MenuStage::Chapters { book, .. } => {
                        let chapter = u16::try_from(index + 1).ok()?;
                        self.back_to_books();
                        Some(BookMenuAction::Select { book, chapter })
                    }
                }
            }
            KeyCode::Esc | KeyCode::Backspace if self.is_choosing_chapter() => {
                self.back_to_books();
                None
            }
            KeyCode::Esc | KeyCode::Char('b') => Some(BookMenuAction::Close),
            _ => None,
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, is_focused: bool, palette: &Base16Palette) {
        let (text_color, border_color, bg_color) = palette.get_panel_colors(is_focused);
        let (selection_bg, selection_fg) = palette.get_selection_colors(is_focused);

        let (title, items): (String, Vec<ListItem>) = match self.stage {
            MenuStage::Books => {
                let items = books::all()
                    .iter()
                    .map(|book| {
                        let marker = match book.testament() {
                            Testament::Old => "OT",
                            Testament::New => "NT",
                        };
                        let style = if book.number == self.current.book {
                            Style::default()
                                .fg(palette.base_0b)
                                .add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(text_color)
                        };
                        ListItem::new(Line::from(vec![
                            Span::styled(format!("{marker} "), Style::default().fg(palette.base_03)),
                            Span::styled(book.name, style),
                        ]))
                    })
                    .collect();
                (" Books ".to_string(), items)
            }
            MenuStage::Chapters { book, count } => {
                let name = books::by_number(book).map_or("", |b| b.display_name());
                let items = (1..=count)
                    .map(|chapter| {
                        let is_current =
                            self.current == Position::new(book, chapter);
                        let style = if is_current {
                            Style::default()
                                .fg(palette.base_0b)
                                .add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(text_color)
                        };
                        ListItem::new(Span::styled(format!("{name} {chapter}"), style))
                    })
                    .collect();
                (format!(" {name} "), items)
            }
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border_color))
                    .style(Style::default().bg(bg_color)),
            )
            .highlight_style(
                Style::default()
                    .bg(selection_bg)
                    .fg(selection_fg)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("» ");

        f.render_stateful_widget(list, area, &mut self.state);
    }
}

impl VimNavMotions for BookMenu {
    fn handle_j(&mut self) {
        let next = self.state.selected().map_or(0, |i| i + 1);
        self.select_clamped(next);
    }

    fn handle_k(&mut self) {
        let previous = self.state.selected().map_or(0, |i| i.saturating_sub(1));
        self.select_clamped(previous);
    }

    fn handle_ctrl_d(&mut self) {
        let next = self.state.selected().map_or(0, |i| i + 10);
        self.select_clamped(next);
    }

    fn handle_ctrl_u(&mut self) {
        let previous = self.state.selected().map_or(0, |i| i.saturating_sub(10));
        self.select_clamped(previous);
    }

    fn handle_gg(&mut self) {
        self.select_clamped(0);
    }

    fn handle_upper_g(&mut self) {
        self.select_clamped(usize::MAX);
    }
}
