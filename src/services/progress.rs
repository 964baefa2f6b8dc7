//! Progress reporting service
//!
//! Separates user-facing reporting from the pipelines, allowing the CLI to
//! print status lines while library callers stay silent.

use std::path::Path;

/// Trait for reporting pipeline events to the user
pub trait ProgressReporter: Send + Sync {
    /// A file was processed and written
    fn file_completed(&self, input: &Path, output: &Path);

    /// A file could not be processed
    fn file_failed(&self, input: &Path, error: &str);

    /// A batch listing found `count` supported files
    fn batch_started(&self, count: usize);

    /// A batch is about to process item `index` (1-based) of `total`
    fn batch_item(&self, index: usize, total: usize, input: &Path) {
        let _ = (index, total, input);
    }

    /// A batch listing found no supported files
    fn batch_empty(&self, folder: &Path);

    /// A batch finished with `succeeded` of `total` files written
    fn batch_finished(&self, succeeded: usize, total: usize);
}

/// No-op progress reporter that discards all events
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn file_completed(&self, _input: &Path, _output: &Path) {}

    fn file_failed(&self, _input: &Path, _error: &str) {}

    fn batch_started(&self, _count: usize) {}

    fn batch_empty(&self, _folder: &Path) {}

    fn batch_finished(&self, _succeeded: usize, _total: usize) {}
}

/// Console progress reporter that prints status lines to stdout
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    /// Create a new console progress reporter
    ///
    /// # Arguments
    /// * `verbose` - Also emit per-item batch headers
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn file_completed(&self, input: &Path, output: &Path) {
        println!("✅ Background removed successfully!");
        println!("📁 Input: {}", input.display());
        println!("💾 Output: {}", output.display());
    }

    fn file_failed(&self, input: &Path, error: &str) {
        println!("❌ Error processing {}: {}", input.display(), error);
    }

    fn batch_started(&self, count: usize) {
        println!("🔍 Found {count} image(s) to process...");
    }

    fn batch_item(&self, index: usize, total: usize, input: &Path) {
        let name = input
            .file_name()
            .map_or_else(|| input.display().to_string(), |n| n.to_string_lossy().into_owned());
        println!("\n📸 Processing {index}/{total}: {name}");
        if self.verbose {
            tracing::debug!(path = %input.display(), "Batch item");
        }
    }

    fn batch_empty(&self, folder: &Path) {
        println!("❌ No supported image files found in {}", folder.display());
    }

    fn batch_finished(&self, succeeded: usize, total: usize) {
        println!(
            "\n✅ Batch processing complete! {succeeded}/{total} files processed successfully."
        );
    }
}

#[cfg(test)]
pub(crate) mod recording {
    //! Reporter that records events for assertions

    use super::ProgressReporter;
    use std::path::Path;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Event {
        Completed(String),
        Failed(String),
        Started(usize),
        Empty,
        Finished(usize, usize),
    }

    #[derive(Default)]
    pub(crate) struct RecordingReporter {
        pub(crate) events: Mutex<Vec<Event>>,
    }

    impl RecordingReporter {
        pub(crate) fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn name(path: &Path) -> String {
        path.file_name().unwrap().to_string_lossy().into_owned()
    }

    impl ProgressReporter for RecordingReporter {
        fn file_completed(&self, _input: &Path, output: &Path) {
            self.push(Event::Completed(name(output)));
        }

        fn file_failed(&self, input: &Path, _error: &str) {
            self.push(Event::Failed(name(input)));
        }

        fn batch_started(&self, count: usize) {
            self.push(Event::Started(count));
        }

        fn batch_empty(&self, _folder: &Path) {
            self.push(Event::Empty);
        }

        fn batch_finished(&self, succeeded: usize, total: usize) {
            self.push(Event::Finished(succeeded, total));
        }
    }
}
