// Export modules for use in tests
pub mod books;
pub mod event_source;
pub mod layout;
pub mod loader;
pub mod main_app;
pub mod navigator;
pub mod panel_store;
pub mod panic_handler;
pub mod reader;
pub mod render;
pub mod settings;
pub mod state;
pub mod storage;
pub mod theme;
pub mod version;
pub mod widget;

// Test utilities - only available when test-utils feature is enabled or during tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export the reading engine and main app components
pub use main_app::{App, FocusedPanel, MainPanel, PopupWindow, run_app_with_event_source};
pub use reader::{NavigationQueue, NavigationRequest, Reader, ReaderOptions};
