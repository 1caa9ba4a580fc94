use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{CollageError, CollageResult};

/// Default download name for an export taken at `unix_millis`.
pub fn export_file_name(unix_millis: u128) -> String {
    format!("thumbnail-{unix_millis}.png")
}

/// Destination for exported PNG bytes (file download, share sheet, ...).
///
/// Picking a sink is the host's decision; the engine only produces bytes.
pub trait ExportSink {
    fn deliver(&mut self, file_name: &str, png: &[u8]) -> CollageResult<()>;
}

/// Writes exports into a directory.
#[derive(Debug, Clone)]
pub struct FileExportSink {
    dir: PathBuf,
}

impl FileExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for FileExportSink {
    fn deliver(&mut self, file_name: &str, png: &[u8]) -> CollageResult<()> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(CollageError::export(format!(
                "invalid export file name '{file_name}'"
            )));
        }
        let path = self.path_for(file_name);
        std::fs::create_dir_all(&self.dir)
            .and_then(|()| std::fs::write(&path, png))
            .with_context(|| format!("write export '{}'", path.display()))
            .map_err(|e| CollageError::export(format!("{e:#}")))?;
        tracing::debug!(path = %path.display(), bytes = png.len(), "export written");
        Ok(())
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryExportSink {
    exports: Vec<(String, Vec<u8>)>,
}

impl InMemoryExportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured `(file_name, png)` pairs in delivery order.
    pub fn exports(&self) -> &[(String, Vec<u8>)] {
        &self.exports
    }
}

impl ExportSink for InMemoryExportSink {
    fn deliver(&mut self, file_name: &str, png: &[u8]) -> CollageResult<()> {
        self.exports.push((file_name.to_owned(), png.to_vec()));
        Ok(())
    }
}
