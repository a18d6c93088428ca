//! Insertion of generated lines into existing files.
//!
//! Files produced by the application generator carry marker comments
//! ("needles"). Entity generation inserts lines right before the marker, with
//! the marker's indentation, so that repeated insertions keep their order.

use crate::error::Result;
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// Outcome of a needle insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeedleResult {
    Inserted,
    /// The line is already present.
    Unchanged,
    /// The target file or the needle does not exist.
    Missing,
}

/// Inserts `line` before the line containing `needle` in `content`.
///
/// Returns `None` when the needle is absent.
pub fn insert_before_needle(content: &str, needle: &str, line: &str) -> Option<String> {
    if content.lines().any(|existing| existing.trim() == line.trim()) {
        return Some(content.to_string());
    }
    let mut output = String::with_capacity(content.len() + line.len() + 1);
    let mut found = false;
    for existing in content.split_inclusive('\n') {
        if !found && existing.contains(needle) {
            let indent: String = existing.chars().take_while(|c| c.is_whitespace()).collect();
            output.push_str(&indent);
            output.push_str(line.trim());
            output.push('\n');
            found = true;
        }
        output.push_str(existing);
    }
    found.then_some(output)
}

/// Applies [`insert_before_needle`] to a file.
///
/// A missing file or needle is reported as a warning: the project may have
/// been customized, and generation continues.
pub fn add_to_file(path: &Path, needle: &str, line: &str) -> Result<NeedleResult> {
    if !path.is_file() {
        warn!("File {} not found, cannot add '{}'", path.display(), line.trim());
        return Ok(NeedleResult::Missing);
    }
    let content = fs::read_to_string(path)?;
    match insert_before_needle(&content, needle, line) {
        None => {
            warn!("Needle '{}' not found in {}, cannot add '{}'", needle, path.display(), line.trim());
            Ok(NeedleResult::Missing)
        }
        Some(updated) if updated == content => Ok(NeedleResult::Unchanged),
        Some(updated) => {
            debug!("Adding '{}' to {}", line.trim(), path.display());
            fs::write(path, updated)?;
            Ok(NeedleResult::Inserted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MASTER: &str = "<databaseChangeLog>\n    <!-- needle-add -->\n</databaseChangeLog>\n";

    #[test]
    fn inserts_with_needle_indentation() {
        let updated = insert_before_needle(MASTER, "needle-add", "<include file=\"a.xml\"/>").unwrap();
        assert_eq!(
            updated,
            "<databaseChangeLog>\n    <include file=\"a.xml\"/>\n    <!-- needle-add -->\n</databaseChangeLog>\n"
        );
    }

    #[test]
    fn insertion_is_idempotent() {
        let once = insert_before_needle(MASTER, "needle-add", "<include file=\"a.xml\"/>").unwrap();
        let twice = insert_before_needle(&once, "needle-add", "<include file=\"a.xml\"/>").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_needle_or_file() {
        assert!(insert_before_needle(MASTER, "other-needle", "x").is_none());

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("master.xml");
        assert_eq!(add_to_file(&path, "needle-add", "x").unwrap(), NeedleResult::Missing);

        fs::write(&path, MASTER).unwrap();
        assert_eq!(add_to_file(&path, "needle-add", "x").unwrap(), NeedleResult::Inserted);
        assert_eq!(add_to_file(&path, "needle-add", "x").unwrap(), NeedleResult::Unchanged);
    }
}
