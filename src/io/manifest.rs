use crate::types::GridResult;
use std::fs;
use std::path::Path;

/// Reader for batch manifest files
pub struct ManifestReader;

impl ManifestReader {
    /// Read a manifest of table asset ids, one per line.
    ///
    /// The whole file is read into memory up front; lines are
    /// whitespace-trimmed and blank lines dropped. The same manifest is
    /// reused across every tile of a run.
    pub fn read_manifest<P: AsRef<Path>>(path: P) -> GridResult<Vec<String>> {
        let content = fs::read_to_string(path.as_ref())?;
        let ids: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        log::debug!(
            "read {} batch ids from manifest {}",
            ids.len(),
            path.as_ref().display()
        );
        Ok(ids)
    }
}
