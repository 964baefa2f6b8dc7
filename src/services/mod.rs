//! Services separating I/O, format rules and reporting from pipeline logic

pub mod format;
pub mod io;
pub mod progress;

pub use format::{FormatValidator, OUTPUT_SUFFIX, SUPPORTED_EXTENSIONS};
pub use io::ImageIOService;
pub use progress::{ConsoleProgressReporter, NoOpProgressReporter, ProgressReporter};
