pub mod book_menu;
pub mod chapter_view;
pub mod help_popup;
