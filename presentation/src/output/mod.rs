//! Output formatting for calibration data

pub mod console;

pub use console::ConsoleFormatter;
