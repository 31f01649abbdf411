use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::ExportDocument;
use crate::common::ExportResult;

/// Where a finished export ends up.
pub trait SaveTarget {
    fn save(&mut self, doc: &ExportDocument) -> ExportResult<()>;
}

/// Writes exports into a directory under their own file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_of(&self, doc: &ExportDocument) -> PathBuf {
        self.dir.join(Path::new(&doc.file_name))
    }
}

impl SaveTarget for DirectoryTarget {
    fn save(&mut self, doc: &ExportDocument) -> ExportResult<()> {
        let path = self.path_of(doc);
        fs::write(&path, &doc.bytes)?;
        info!(path = %path.display(), size = doc.bytes.len(), "Export saved");
        Ok(())
    }
}
