use crate::event_source::EventSource;
use crate::navigator::{self, ChapterDirection};
use crate::reader::Reader;
use crate::render::RenderTarget;
use crate::state::PanelId;
use crate::theme::{self, current_theme};
use crate::version::VersionCatalog;
use crate::widget::book_menu::{BookMenu, BookMenuAction};
use crate::widget::chapter_view::ChapterViews;
use crate::widget::help_popup::{HelpPopup, HelpPopupAction};

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use log::{debug, info};
use ratatui::{
    Terminal,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const BOOK_MENU_WIDTH: u16 = 28;
const RESIZE_STEP: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
}

pub trait VimNavMotions {
    fn handle_j(&mut self);
    fn handle_k(&mut self);
    fn handle_ctrl_d(&mut self);
    fn handle_ctrl_u(&mut self);
    fn handle_gg(&mut self);
    fn handle_upper_g(&mut self);
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum FocusedPanel {
    Main(MainPanel),
    Popup(PopupWindow),
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum MainPanel {
    BookMenu,
    Reading(RenderTarget),
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum PopupWindow {
    Help,
}

pub struct App {
    reader: Reader<ChapterViews>,
    catalog: VersionCatalog,
    pub focused_panel: FocusedPanel,
    previous_main_panel: MainPanel,
    book_menu: BookMenu,
    show_book_menu: bool,
    help_popup: Option<HelpPopup>,
    reading_area: Rect,
    dragging_divider: bool,
}

impl App {
    pub fn new(reader: Reader<ChapterViews>, catalog: VersionCatalog) -> Self {
        let book_menu = BookMenu::new(reader.global().position);
        Self {
            reader,
            catalog,
            focused_panel: FocusedPanel::Main(MainPanel::Reading(RenderTarget::Main)),
            previous_main_panel: MainPanel::Reading(RenderTarget::Main),
            book_menu,
            show_book_menu: false,
            help_popup: None,
            reading_area: Rect::default(),
            dragging_divider: false,
        }
    }

    /// Loads the last read chapter, reopening split view if it was open.
    pub fn start(&mut self) {
        self.reader.restore_session();
        self.focus_reading();
    }

    pub fn reader(&self) -> &Reader<ChapterViews> {
        &self.reader
    }

    /// Applies finished chapter loads. Returns true if anything changed on
    /// screen.
    pub fn tick(&mut self) -> bool {
        self.reader.process_completions() > 0
    }

    pub fn is_book_menu_visible(&self) -> bool {
        self.show_book_menu
    }

    fn set_main_panel_focus(&mut self, panel: MainPanel) {
        self.focused_panel = FocusedPanel::Main(panel);
        self.previous_main_panel = panel;
    }

    fn close_popup_to_previous(&mut self) {
        self.help_popup = None;
        self.focused_panel = FocusedPanel::Main(self.previous_main_panel);
    }

    /// The reading view that keys like j/k and v/V act on.
    pub fn focused_target(&self) -> RenderTarget {
        let wanted = match self.previous_main_panel {
            MainPanel::Reading(target) => target,
            MainPanel::BookMenu => RenderTarget::Main,
        };
        match (self.reader.is_split_open(), wanted) {
            (true, RenderTarget::Main) => RenderTarget::Panel(PanelId::Left),
            (false, RenderTarget::Panel(_)) => RenderTarget::Main,
            (_, target) => target,
        }
    }

    fn focus_reading(&mut self) {
        let target = self.focused_target();
        self.set_main_panel_focus(MainPanel::Reading(target));
    }

    fn toggle_book_menu(&mut self) {
        self.show_book_menu = !self.show_book_menu;
        if self.show_book_menu {
            self.book_menu.set_current(self.reader.global().position);
            self.set_main_panel_focus(MainPanel::BookMenu);
        } else {
            self.focus_reading();
        }
    }

    fn cycle_focus(&mut self) {
        let next = match self.focused_panel {
            FocusedPanel::Main(MainPanel::BookMenu) => MainPanel::Reading(self.focused_target()),
            FocusedPanel::Main(MainPanel::Reading(RenderTarget::Panel(PanelId::Left)))
                if self.reader.is_split_open() =>
            {
                MainPanel::Reading(RenderTarget::Panel(PanelId::Right))
            }
            _ if self.show_book_menu => MainPanel::BookMenu,
            _ if self.reader.is_split_open() => {
                MainPanel::Reading(RenderTarget::Panel(PanelId::Left))
            }
            _ => MainPanel::Reading(RenderTarget::Main),
        };
        self.set_main_panel_focus(next);
    }

    fn navigate_focused(&mut self, direction: ChapterDirection) {
        match self.focused_target() {
            RenderTarget::Panel(id) => self.reader.navigate_panel(id, direction),
            RenderTarget::Main => self.reader.navigate(direction),
        }
    }

    fn cycle_focused_version(&mut self, forward: bool) {
        match self.focused_target() {
            RenderTarget::Panel(id) => {
                let Some(current) = self.reader.panel(id).map(|p| p.version.clone()) else {
                    return;
                };
                let next = self.catalog.cycle(&current, forward);
                info!("{} panel version: {} -> {}", id.label(), current, next);
                self.reader.change_panel_version(id, next);
            }
            RenderTarget::Main => {
                let current = self.reader.global().version.clone();
                let next = self.catalog.cycle(&current, forward);
                info!("Version: {} -> {}", current, next);
                self.reader.change_version(next);
            }
        }
    }

    fn resize_split(&mut self, delta: f32) {
        let available = f32::from(self.reading_area.width);
        let percent = self.reader.resize_split(delta, available);
        debug!("Split at {percent:.1}% of {available} columns");
    }

    fn divider_column(&self) -> Option<u16> {
        if !self.reader.is_split_open() {
            return None;
        }
        let (left_width, _) = self.reader.layout().split_cells(self.reading_area.width);
        Some(self.reading_area.x + left_width)
    }

    /// Dragging with the left button from the panel border moves the divider.
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) -> bool {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.dragging_divider = self
                    .divider_column()
                    .is_some_and(|col| mouse.column.abs_diff(col) <= 1);
                false
            }
            MouseEventKind::Drag(MouseButton::Left) if self.dragging_divider => {
                let offset = mouse.column.saturating_sub(self.reading_area.x);
                self.reader
                    .drag_split(f32::from(offset), f32::from(self.reading_area.width));
                true
            }
            MouseEventKind::Up(MouseButton::Left) => {
                std::mem::take(&mut self.dragging_divider)
            }
            _ => false,
        }
    }

    fn handle_book_menu_key(&mut self, key: KeyEvent) {
        let reader = &self.reader;
        let version = reader.global().version.clone();
        let chapter_count =
            |book: u8| navigator::chapter_count_or_one(reader.loader(), book, &version);

        match self.book_menu.handle_key(key, &chapter_count) {
            Some(BookMenuAction::Select { book, chapter }) => {
                self.reader.select_chapter(book, chapter);
                self.show_book_menu = false;
                self.focus_reading();
            }
            Some(BookMenuAction::Close) => {
                self.show_book_menu = false;
                self.focus_reading();
            }
            None => {}
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<AppAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        if self.focused_panel == FocusedPanel::Popup(PopupWindow::Help) {
            let action = self
                .help_popup
                .as_mut()
                .and_then(|popup| popup.handle_key(key));
            if let Some(HelpPopupAction::Close) = action {
                self.close_popup_to_previous();
            }
            return None;
        }

        if self.focused_panel == FocusedPanel::Main(MainPanel::BookMenu)
            && !matches!(key.code, KeyCode::Char('q' | '?') | KeyCode::Tab)
        {
            self.handle_book_menu_key(key);
            return None;
        }

        let target = self.focused_target();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') => return Some(AppAction::Quit),
            KeyCode::Char('c') if ctrl => return Some(AppAction::Quit),
            KeyCode::Char('?') => {
                self.help_popup = Some(HelpPopup::new());
                self.focused_panel = FocusedPanel::Popup(PopupWindow::Help);
            }
            KeyCode::Char('b') => self.toggle_book_menu(),
            KeyCode::Tab => self.cycle_focus(),
            KeyCode::Char('h') | KeyCode::Left => self.reader.navigate(ChapterDirection::Previous),
            KeyCode::Char('l') | KeyCode::Right => self.reader.navigate(ChapterDirection::Next),
            KeyCode::Char('p') => self.navigate_focused(ChapterDirection::Previous),
            KeyCode::Char('n') => self.navigate_focused(ChapterDirection::Next),
            KeyCode::Char('s') => {
                self.reader.toggle_split();
                self.focus_reading();
            }
            KeyCode::Char('x') => {
                if let RenderTarget::Panel(id) = target {
                    if self.reader.close_panel(id) {
                        self.focus_reading();
                    }
                }
            }
            KeyCode::Char('v') => self.cycle_focused_version(true),
            KeyCode::Char('V') => self.cycle_focused_version(false),
            KeyCode::Char('<') => self.resize_split(-RESIZE_STEP),
            KeyCode::Char('>') => self.resize_split(RESIZE_STEP),
            KeyCode::Char('d') if ctrl => self.reader.renderer_mut().scroll(target, 10),
            KeyCode::Char('u') if ctrl => self.reader.renderer_mut().scroll(target, -10),
            KeyCode::Char('j') | KeyCode::Down => self.reader.renderer_mut().scroll(target, 1),
            KeyCode::Char('k') | KeyCode::Up => self.reader.renderer_mut().scroll(target, -1),
            KeyCode::Char('g') => self.reader.renderer_mut().scroll_to_top(target),
            KeyCode::Char('t') => theme::toggle_theme(),
            _ => {}
        }
        None
    }

    pub fn draw(&mut self, f: &mut ratatui::Frame) {
        let palette = current_theme();
        let background_block = Block::default().style(Style::default().bg(palette.base_00));
        f.render_widget(background_block, f.area());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        let reading_area = if self.show_book_menu {
            let main_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(BOOK_MENU_WIDTH), Constraint::Min(0)])
                .split(chunks[0]);
            let focused = self.focused_panel == FocusedPanel::Main(MainPanel::BookMenu);
            self.book_menu.render(f, main_chunks[0], focused, palette);
            main_chunks[1]
        } else {
            chunks[0]
        };
        self.reading_area = reading_area;

        let focused_target = match self.focused_panel {
            FocusedPanel::Main(MainPanel::Reading(_)) => Some(self.focused_target()),
            _ => None,
        };

        if let Some(session) = self.reader.panels().session() {
            let (left_width, right_width) =
                self.reader.layout().split_cells(reading_area.width);
            let panel_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(left_width), Constraint::Length(right_width)])
                .split(reading_area);

            for (panel, area) in session.panels().into_iter().zip(panel_chunks.iter()) {
                let target = RenderTarget::Panel(panel.id);
                self.reader.renderer().render_pane(
                    f,
                    *area,
                    target,
                    self.catalog.short_code(&panel.version),
                    focused_target == Some(target),
                    palette,
                );
            }
        } else {
            let global = self.reader.global();
            self.reader.renderer().render_pane(
                f,
                reading_area,
                RenderTarget::Main,
                self.catalog.short_code(&global.version),
                focused_target == Some(RenderTarget::Main),
                palette,
            );
        }

        self.render_help_bar(f, chunks[1]);

        if self.focused_panel == FocusedPanel::Popup(PopupWindow::Help) {
            let dim_block = Block::default().style(
                Style::default()
                    .bg(Color::Rgb(10, 10, 10))
                    .add_modifier(Modifier::DIM),
            );
            f.render_widget(dim_block, f.area());

            if let Some(ref mut help_popup) = self.help_popup {
                help_popup.render(f, f.area());
            }
        }
    }

    fn render_help_bar(&self, f: &mut ratatui::Frame, area: Rect) {
        let palette = current_theme();
        let global = self.reader.global();

        let help_text = match self.focused_panel {
            FocusedPanel::Main(MainPanel::BookMenu) => {
                "j/k: Move | Enter: Open | Esc: Back | b: Hide menu | q: Quit"
            }
            FocusedPanel::Main(MainPanel::Reading(_)) if self.reader.is_split_open() => {
                "h/l: Chapter | p/n: Panel chapter | Tab: Focus | v: Version | x: Close | </>: Resize | ?: Help"
            }
            FocusedPanel::Main(MainPanel::Reading(_)) => {
                "h/l: Chapter | j/k: Scroll | v: Version | s: Split | b: Books | ?: Help | q: Quit"
            }
            FocusedPanel::Popup(_) => "Esc: Close",
        };

        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", self.catalog.short_code(&global.version)),
                Style::default()
                    .fg(palette.base_00)
                    .bg(palette.base_0d)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {} ", global.position),
                Style::default().fg(palette.base_0b),
            ),
            Span::styled(help_text, Style::default().fg(palette.base_03)),
        ]);

        let help = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.base_02))
                .style(Style::default().bg(palette.base_00)),
        );
        f.render_widget(help, area);
    }
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()> {
    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();
    let mut first_render = true;
    loop {
        let mut events_processed = 0;
        let mut should_quit = false;
        while event_source.poll(Duration::from_millis(0))? && events_processed < 50 {
            let event = event_source.read()?;
            events_processed += 1;

            match event {
                Event::Key(key) => {
                    if app.handle_key_event(key) == Some(AppAction::Quit) {
                        should_quit = true;
                    }
                }
                Event::Mouse(mouse) => {
                    app.handle_mouse_event(mouse);
                }
                Event::Resize(cols, rows) => {
                    debug!("Terminal resized to {cols}x{rows}");
                }
                _ => {}
            }

            if should_quit {
                break;
            }
        }

        let mut needs_redraw = events_processed > 0 || first_render;
        first_render = false;

        if last_tick.elapsed() >= tick_rate {
            if app.tick() {
                needs_redraw = true;
            }
            last_tick = Instant::now();
        }

        if needs_redraw && !should_quit {
            let draw_start = Instant::now();
            terminal.draw(|f| app.draw(f))?;
            let draw_duration = draw_start.elapsed();
            if draw_duration.as_millis() > 10 {
                debug!("Terminal draw/flush took {}ms", draw_duration.as_millis());
            }
        }

        if should_quit {
            return Ok(());
        }

        // If no events were processed, wait a bit to avoid busy-waiting
        if events_processed == 0 {
            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));
            let _ = event_source.poll(timeout)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_source::ScriptedEventSource;
    use crate::loader::InlineDispatcher;
    use crate::reader::ReaderOptions;
    use crate::storage::MemoryStore;
    use crate::test_utils::FakeLoader;
    use crate::version::VersionCode;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    fn test_app() -> App {
        let loader = Arc::new(FakeLoader::new());
        let reader = Reader::with_options(
            loader.clone(),
            Box::new(InlineDispatcher::new(loader)),
            Box::new(MemoryStore::with_values([
                ("last_book", "43"),
                ("last_chapter", "3"),
            ])),
            ChapterViews::new(),
            ReaderOptions {
                default_version: VersionCode::new("esv"),
                min_panel_width: 20.0,
            },
        );
        let mut app = App::new(reader, VersionCatalog::fallback());
        app.start();
        app.tick();
        app
    }

    fn press(app: &mut App, code: KeyCode) -> Option<AppAction> {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_draws_restored_chapter() {
        let mut app = test_app();
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("John 3 · ESV"));
        assert!(text.contains("43:3:1 esv"));
    }

    #[test]
    fn test_split_shows_both_versions() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('s'));
        app.tick();
        assert_eq!(
            app.focused_target(),
            RenderTarget::Panel(PanelId::Left)
        );

        let mut terminal = Terminal::new(TestBackend::new(120, 24)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("John 3 · ESV"));
        assert!(text.contains("John 3 · WLC/UBS5"));
        assert!(text.contains("43:3:1 na28-ubs5"));
    }

    #[test]
    fn test_right_panel_version_cycle_keeps_indicator() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Tab);
        assert_eq!(
            app.focused_target(),
            RenderTarget::Panel(PanelId::Right)
        );

        press(&mut app, KeyCode::Char('v'));
        app.tick();
        let reader = app.reader();
        assert_eq!(reader.panel(PanelId::Right).unwrap().version.as_str(), "esv");
        assert_eq!(reader.global().version.as_str(), "esv");
        assert!(reader.versions_isolated());
    }

    #[test]
    fn test_book_menu_selection_navigates() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('b'));
        assert!(app.is_book_menu_visible());
        // John is highlighted; move to Acts and open chapter 1.
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        app.tick();

        assert!(!app.is_book_menu_visible());
        assert_eq!(app.reader().global().position.book, 44);
        assert_eq!(app.reader().global().position.chapter, 1);
    }

    #[test]
    fn test_dragging_divider_resizes_split() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('s'));
        app.tick();
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();

        let mouse = |kind, column| MouseEvent {
            kind,
            column,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 50));
        assert!(app.handle_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), 70)));
        app.handle_mouse_event(mouse(MouseEventKind::Up(MouseButton::Left), 70));

        assert!((app.reader().layout().left_percent() - 70.0).abs() < 0.01);
        assert_eq!(app.reader().storage().get("split_ratio").as_deref(), Some("70.0%"));
    }

    #[test]
    fn test_run_loop_quits_on_q() {
        let mut app = test_app();
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let mut events = ScriptedEventSource::new([
            Event::Key(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::NONE)),
            Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)),
        ]);
        run_app_with_event_source(&mut terminal, &mut app, &mut events).unwrap();

        assert_eq!(events.remaining(), 0);
        assert_eq!(app.reader().global().position.chapter, 4);
    }
}
