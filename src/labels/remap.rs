//! Per-line and per-file class index rewriting.

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;

use super::mapping::{ClassTarget, RemapTable};
use crate::log;

/// A YOLO label line is `<class> <x> <y> <w> <h>`.
const MIN_LABEL_FIELDS: usize = 5;

/// What happened to one line of a label file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineOutcome {
    /// Empty or whitespace-only line, written back empty
    Blank,
    /// Too few fields to be a box; kept as is
    Passthrough(String),
    Remapped {
        line: String,
        from: u32,
        to: u32,
        ambiguous: bool,
    },
    /// Class index not in the table; kept as is
    UnknownClass { line: String, class: u32 },
}

impl LineOutcome {
    /// The text to write back for this line.
    pub fn text(&self) -> &str {
        match self {
            LineOutcome::Blank => "",
            LineOutcome::Passthrough(line)
            | LineOutcome::Remapped { line, .. }
            | LineOutcome::UnknownClass { line, .. } => line,
        }
    }
}

/// Counts for one rewritten file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileReport {
    pub lines: usize,
    pub remapped: usize,
    pub ambiguous: usize,
    pub unknown: usize,
}

/// Rewrites the class index of a single label line.
///
/// Fails only when a line with enough fields does not start with a class
/// index, which aborts the whole file.
pub fn remap_line(line: &str, table: &RemapTable) -> Result<LineOutcome> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(LineOutcome::Blank);
    }

    let fields: Vec<&str> = trimmed.split_whitespace().collect();
    if fields.len() < MIN_LABEL_FIELDS {
        return Ok(LineOutcome::Passthrough(trimmed.to_string()));
    }

    let class: u32 = fields[0]
        .parse()
        .map_err(|_| anyhow!("Invalid class index {:?} in line {:?}", fields[0], trimmed))?;

    match table.get(class) {
        Some(target) => {
            let to = target.new_index();
            let line = format!("{} {}", to, fields[1..].join(" "));
            Ok(LineOutcome::Remapped {
                line,
                from: class,
                to,
                ambiguous: matches!(target, ClassTarget::Ambiguous { .. }),
            })
        }
        None => Ok(LineOutcome::UnknownClass {
            line: trimmed.to_string(),
            class,
        }),
    }
}

/// Rewrites every class index in a label file in place.
///
/// All lines are transformed in memory first; the file is only written when
/// every line succeeded, so a bad line leaves the file untouched.
pub fn remap_label_file(path: &Path, table: &RemapTable) -> Result<FileReport> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut report = FileReport::default();
    let mut output: Vec<String> = Vec::new();

    for (line_no, line) in contents.lines().enumerate() {
        let outcome = remap_line(line, table)
            .with_context(|| format!("{}:{}", path.display(), line_no + 1))?;

        match &outcome {
            LineOutcome::Remapped { ambiguous: true, from, to, .. } => {
                report.remapped += 1;
                report.ambiguous += 1;
                log(&format!(
                    "Warning: ambiguous class {} mapped to {} in {}:{}",
                    from,
                    to,
                    path.display(),
                    line_no + 1
                ));
            }
            LineOutcome::Remapped { .. } => report.remapped += 1,
            LineOutcome::UnknownClass { class, .. } => {
                report.unknown += 1;
                log(&format!(
                    "Warning: Unknown class {} in {}, keeping as is",
                    class,
                    path.display()
                ));
            }
            LineOutcome::Blank | LineOutcome::Passthrough(_) => {}
        }

        output.push(outcome.text().to_string());
        report.lines += 1;
    }

    let mut text = output.join("\n");
    if !output.is_empty() {
        text.push('\n');
    }
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_remap_line_known_classes() {
        let table = RemapTable::neckdeep();

        let outcome = remap_line("4 0.5 0.5 0.1 0.2", &table).unwrap();
        assert_eq!(outcome.text(), "1 0.5 0.5 0.1 0.2");

        assert_eq!(remap_line("5 0.1 0.1 0.1 0.1", &table).unwrap().text(), "6 0.1 0.1 0.1 0.1");
        assert_eq!(remap_line("6 0.1 0.1 0.1 0.1", &table).unwrap().text(), "3 0.1 0.1 0.1 0.1");
        assert_eq!(remap_line("0 0.1 0.1 0.1 0.1", &table).unwrap().text(), "0 0.1 0.1 0.1 0.1");
    }

    #[test]
    fn test_remap_line_normalizes_whitespace() {
        let table = RemapTable::neckdeep();
        let outcome = remap_line("  1\t0.25  0.5 0.1   0.1  ", &table).unwrap();
        assert_eq!(
            outcome,
            LineOutcome::Remapped {
                line: "4 0.25 0.5 0.1 0.1".to_string(),
                from: 1,
                to: 4,
                ambiguous: false
            }
        );
    }

    #[test]
    fn test_remap_line_ambiguous_is_flagged() {
        let table = RemapTable::neckdeep();
        let outcome = remap_line("7 0.1 0.2 0.3 0.4", &table).unwrap();
        assert!(matches!(outcome, LineOutcome::Remapped { to: 3, ambiguous: true, .. }));
    }

    #[test]
    fn test_remap_line_unknown_and_passthrough() {
        let table = RemapTable::neckdeep();
        assert_eq!(
            remap_line("9 0.1 0.2 0.3 0.4", &table).unwrap(),
            LineOutcome::UnknownClass {
                line: "9 0.1 0.2 0.3 0.4".to_string(),
                class: 9
            }
        );
        assert_eq!(
            remap_line("1 0.5", &table).unwrap(),
            LineOutcome::Passthrough("1 0.5".to_string())
        );
        assert_eq!(remap_line("   ", &table).unwrap(), LineOutcome::Blank);
    }

    #[test]
    fn test_remap_line_bad_index_is_error() {
        let table = RemapTable::neckdeep();
        assert!(remap_line("x 0.1 0.2 0.3 0.4", &table).is_err());
        assert!(remap_line("-1 0.1 0.2 0.3 0.4", &table).is_err());
    }

    #[test]
    fn test_remap_label_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame_100.txt");
        fs::write(&path, "1 0.1 0.2 0.3 0.4\n\n9 0.5 0.5 0.5 0.5\n7 0.1 0.1 0.1 0.1\n").unwrap();

        let report = remap_label_file(&path, &RemapTable::neckdeep()).unwrap();
        assert_eq!(
            report,
            FileReport {
                lines: 4,
                remapped: 2,
                ambiguous: 1,
                unknown: 1
            }
        );
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "4 0.1 0.2 0.3 0.4\n\n9 0.5 0.5 0.5 0.5\n3 0.1 0.1 0.1 0.1\n"
        );
    }

    #[test]
    fn test_failed_file_is_left_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.txt");
        let original = "1 0.1 0.2 0.3 0.4\nPlane 0.1 0.2 0.3 0.4\n";
        fs::write(&path, original).unwrap();

        assert!(remap_label_file(&path, &RemapTable::neckdeep()).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_remap_is_not_idempotent() {
        // Remapping is a one-time migration: a second pass treats new indices
        // as old ones and moves them again.
        let dir = tempdir().unwrap();
        let path = dir.path().join("twice.txt");
        fs::write(&path, "1 0.1 0.2 0.3 0.4\n").unwrap();
        let table = RemapTable::neckdeep();

        remap_label_file(&path, &table).unwrap();
        let once = fs::read_to_string(&path).unwrap();
        assert_eq!(once, "4 0.1 0.2 0.3 0.4\n");

        remap_label_file(&path, &table).unwrap();
        let twice = fs::read_to_string(&path).unwrap();
        assert_eq!(twice, "1 0.1 0.2 0.3 0.4\n");
        assert_ne!(once, twice);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        assert!(remap_label_file(&dir.path().join("nope.txt"), &RemapTable::neckdeep()).is_err());
    }
}
