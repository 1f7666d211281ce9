// Output trait abstraction for mocking in tests.

use std::fmt::Debug;
use std::io;
use std::path::Path;

/// Destinations that rendered reports can be written to.
///
/// This trait is automatically mocked by mockall in test builds, generating `MockOutput`.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Output: Debug + Send + Sync + 'static {
    /// Writes the text to the console.
    fn write_console(&self, text: &str);

    /// Replaces the contents of the file with the text, creating the file if necessary.
    fn overwrite_file(&self, path: &Path, text: &str) -> io::Result<()>;
}
