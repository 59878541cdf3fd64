//! Rewrites YOLO label files from the old class order to the YAML order.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use neckdeep_tools::labels::{ClassTarget, NEW_CLASSES, OLD_CLASSES, RemapTable, remap_dataset};
use neckdeep_tools::{install_panic_hook, log, paths};

#[derive(Parser, Debug)]
#[command(
    name = "remap_labels",
    version,
    about = "Remap label class indices to match the dataset YAML class order"
)]
struct Args {
    /// Dataset root containing labels/<split>/
    #[arg(long, default_value = "datasets/NeckDeep")]
    dataset: PathBuf,

    /// Comma-separated split folders to process
    #[arg(long, value_delimiter = ',', default_value = "train,val")]
    splits: Vec<String>,

    /// Remap splits whose classes.txt already lists the new order
    #[arg(long, default_value_t = false)]
    force: bool,
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn main() -> Result<()> {
    install_panic_hook();
    paths::ensure_directories()?;

    let args = Args::parse();
    let table = RemapTable::neckdeep();

    println!("Remapping label files to match YAML class order...");
    for (old, target) in table.iter() {
        let old_name = OLD_CLASSES.get(old as usize).copied().unwrap_or("?");
        match target {
            ClassTarget::Mapped(new) => println!(
                "  {} ({}) -> {} ({})",
                old, old_name, new, NEW_CLASSES[new as usize]
            ),
            ClassTarget::Ambiguous { to, note } => {
                println!("  {} -> {} (ambiguous: {})", old, to, note)
            }
        }
    }
    for (new, olds) in table.collisions() {
        log(&format!(
            "Warning: old classes {:?} all map to {} ({})",
            olds, new, NEW_CLASSES.get(new as usize).copied().unwrap_or("?")
        ));
    }
    println!();

    let splits: Vec<&str> = args.splits.iter().map(String::as_str).collect();
    let report = remap_dataset(&args.dataset, &splits, &table, args.force)?;

    println!("\nDone!");
    for split in &report.splits {
        if split.already_remapped {
            println!("{}: skipped (already remapped)", capitalize(&split.name));
        } else if split.classes_failed {
            println!("{}: skipped (classes.txt not writable)", capitalize(&split.name));
        } else {
            println!(
                "{}: {}/{} files remapped",
                capitalize(&split.name),
                split.succeeded,
                split.total
            );
        }
    }
    Ok(())
}
