//! Whole-dataset remapping over the `labels/<split>` folders.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::mapping::{NEW_CLASSES, RemapTable};
use super::remap::remap_label_file;
use crate::log;

pub const CLASSES_FILE: &str = "classes.txt";

/// Splits processed by default, in order.
pub const DEFAULT_SPLITS: [&str; 2] = ["train", "val"];

/// Result for one split folder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitReport {
    pub name: String,
    pub total: usize,
    pub succeeded: usize,
    /// Skipped because classes.txt already lists the new order
    pub already_remapped: bool,
    pub classes_updated: bool,
    /// classes.txt could not be rewritten, so the split was left untouched
    pub classes_failed: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DatasetReport {
    pub splits: Vec<SplitReport>,
}

/// Returns `<dataset>/labels/<split>`.
pub fn split_dir(dataset_root: &Path, split: &str) -> PathBuf {
    dataset_root.join("labels").join(split)
}

/// Collects every label file under `dir`, excluding `classes.txt`.
pub fn label_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|res| res.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "txt")
                && path.file_name().is_some_and(|name| name != CLASSES_FILE)
        })
        .collect();
    files.sort();
    files
}

/// Reads a class list, one name per line, skipping blank lines.
pub fn read_class_names(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Writes a class list, one name per line.
pub fn write_class_names(path: &Path, names: &[&str]) -> Result<()> {
    let mut text = names.join("\n");
    text.push('\n');
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

/// True if the split's classes.txt already lists the new class order.
pub fn is_already_remapped(split: &Path) -> bool {
    let classes = split.join(CLASSES_FILE);
    match read_class_names(&classes) {
        Ok(names) => names.iter().map(String::as_str).eq(NEW_CLASSES.iter().copied()),
        Err(_) => false,
    }
}

/// Remaps every label file of every split.
///
/// A split whose classes.txt already has the new order was migrated before;
/// it is skipped unless `force` is set. An existing classes.txt is rewritten
/// before any label file of its split, so the guard sees every split that was
/// touched. When that write fails the split is skipped with its files left
/// alone. Files that fail are logged and left unchanged; the rest of the
/// split still runs.
pub fn remap_dataset(
    dataset_root: &Path,
    splits: &[&str],
    table: &RemapTable,
    force: bool,
) -> Result<DatasetReport> {
    let mut report = DatasetReport::default();

    for &name in splits {
        let split = remap_split(dataset_root, name, table, force);
        report.splits.push(split);
    }

    Ok(report)
}

fn remap_split(dataset_root: &Path, name: &str, table: &RemapTable, force: bool) -> SplitReport {
    let dir = split_dir(dataset_root, name);
    let mut split = SplitReport {
        name: name.to_string(),
        ..Default::default()
    };

    if !dir.is_dir() {
        log(&format!("Warning: {} not found, skipping", dir.display()));
        return split;
    }

    let classes = dir.join(CLASSES_FILE);
    if !force && is_already_remapped(&dir) {
        log(&format!(
            "Warning: {} already lists the new class order, skipping (use --force to remap again)",
            classes.display()
        ));
        split.already_remapped = true;
        return split;
    }

    if classes.exists() {
        if let Err(e) = write_class_names(&classes, &NEW_CLASSES) {
            log(&format!(
                "Error: {:#}. Skipping {} split, its labels were not changed",
                e, name
            ));
            split.classes_failed = true;
            return split;
        }
        split.classes_updated = true;
        log(&format!("Updated {}", classes.display()));
    }

    let files = label_files(&dir);
    split.total = files.len();
    log(&format!("Processing {} {} label files...", files.len(), name));

    for file in &files {
        match remap_label_file(file, table) {
            Ok(_) => split.succeeded += 1,
            Err(e) => log(&format!("Error processing {}: {:#}", file.display(), e)),
        }
    }

    split
}
