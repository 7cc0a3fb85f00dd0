use crossterm::{
    event::DisableMouseCapture,
    execute,
    terminal::{LeaveAlternateScreen, disable_raw_mode},
};
use log::error;
use std::panic;

/// Installs a hook that gives the terminal back before reporting the panic.
/// Debug builds print a full backtrace; release builds write a crash report.
pub fn initialize_panic_handler() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        error!("Panic: {panic_info}");

        if cfg!(debug_assertions) {
            better_panic::Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .verbosity(better_panic::Verbosity::Full)
                .create_panic_handler()(panic_info);
        } else {
            let metadata = human_panic::metadata!();
            let file_path = human_panic::handle_dump(&metadata, panic_info);
            human_panic::print_msg(file_path, &metadata)
                .unwrap_or_else(|_| default_hook(panic_info));
        }

        std::process::exit(1);
    }));
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(std::io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
}
