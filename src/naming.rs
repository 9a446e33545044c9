//! Output file naming: `<store-path>/<stub>-<timestamp>.<extension>`.

use std::path::PathBuf;

use jiff::Zoned;
use jiff::fmt::strtime;

use crate::camera::CameraError;

/// Sortable, second-precision timestamp used in file names.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Generates session file names stamped with the session start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    dir: PathBuf,
    stub: String,
    extension: String,
    timestamp_format: String,
}

impl Naming {
    /// A leading `.` on the extension is accepted and dropped.
    pub fn new(
        dir: impl Into<PathBuf>,
        stub: impl Into<String>,
        extension: &str,
        timestamp_format: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            stub: stub.into(),
            extension: extension.trim_start_matches('.').to_string(),
            timestamp_format: timestamp_format.into(),
        }
    }

    /// The output path for a session starting at `at`.
    pub fn output_path(&self, at: &Zoned) -> Result<PathBuf, CameraError> {
        let stamp = strtime::format(&self.timestamp_format, at).map_err(|source| {
            CameraError::DateFormatting {
                format: self.timestamp_format.clone(),
                source,
            }
        })?;

        let name = if self.extension.is_empty() {
            format!("{}-{stamp}", self.stub)
        } else {
            format!("{}-{stamp}.{}", self.stub, self.extension)
        };

        Ok(self.dir.join(name))
    }
}
