//! YOLO label migration.
//!
//! The dataset was first labeled with the class order of an old
//! `classes.txt`; the training YAML uses a different order. This module
//! rewrites the class index of every label line and then the class lists.
//! It is a one-time migration, not an idempotent normalization.

pub mod dataset;
pub mod mapping;
pub mod remap;

pub use dataset::{DEFAULT_SPLITS, DatasetReport, SplitReport, remap_dataset};
pub use mapping::{ClassTarget, NEW_CLASSES, OLD_CLASSES, RemapTable};
pub use remap::{FileReport, LineOutcome, remap_label_file, remap_line};
