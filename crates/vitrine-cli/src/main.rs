//! Vitrine CLI - command-line surface for the report showcase catalog.
//!
//! Every mutating command prints what changed and where the pre-change
//! snapshot went, so the immediately prior state is always identifiable
//! and restorable.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use vitrine_core::{CatalogConfig, ReconcileOutcome, SnapshotKind, Vitrine};

#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(about = "Curated showcase catalog for generated report pages")]
struct Args {
    /// Site root (expects showcase.html and reports/ inside)
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Showcase document path (overrides the root layout)
    #[arg(long)]
    document: Option<PathBuf>,

    /// Report artifact directory (overrides the root layout)
    #[arg(long)]
    reports: Option<PathBuf>,

    /// Snapshot directory (overrides the root layout)
    #[arg(long)]
    backups: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile the showcase against the report directory
    Sync {
        /// Re-derive title/snippet/categories for existing records
        /// (visibility is always preserved)
        #[arg(long)]
        refresh: bool,
    },
    /// List catalog records in display order
    List,
    /// List registered categories
    Categories,
    /// Add a category to the registry
    AddCategory { key: String },
    /// Rename a category, cascading to every record
    RenameCategory { old: String, new: String },
    /// Delete a category from the registry and every record
    DeleteCategory { key: String },
    /// Replace a record's category set
    Assign {
        identifier: String,
        categories: Vec<String>,
    },
    /// Move a record to a 1-based display position
    Reorder { identifier: String, position: usize },
    /// Rename a record's title (also rewrites the report page itself)
    Rename { identifier: String, title: String },
    /// Show a hidden record
    Enable { identifier: String },
    /// Hide a record without removing it
    Disable { identifier: String },
    /// List retained snapshots, most recent first
    Snapshots,
    /// Restore the showcase from a snapshot, then reconcile once
    Restore { snapshot: PathBuf },
    /// Remove records whose report files are gone from disk
    Prune,
    /// Normalize accumulated double-escaped entities in the showcase
    Doctor,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::WARN };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let defaults = CatalogConfig::for_root(&args.root);
    let config = CatalogConfig::new(
        args.document.unwrap_or(defaults.document_path),
        args.reports.unwrap_or(defaults.artifacts_dir),
        args.backups.unwrap_or(defaults.backups_dir),
    );
    let vitrine = Vitrine::new(config);

    match args.command {
        Command::Sync { refresh } => {
            let outcome = vitrine.sync(refresh)?;
            print_reconcile(&outcome);
        }
        Command::List => {
            for record in vitrine.records()? {
                let marker = if record.enabled { " " } else { "x" };
                println!(
                    "{:>3} [{}] {}  ({})  [{}]",
                    record.position,
                    marker,
                    record.title,
                    record.identifier,
                    record.categories.join(", ")
                );
            }
        }
        Command::Categories => {
            for key in vitrine.categories()? {
                println!("{}", key);
            }
        }
        Command::AddCategory { key } => {
            let change = vitrine.add_category(&key)?;
            println!("Added category '{}'", change.value);
            print_snapshot(&change.snapshot);
        }
        Command::RenameCategory { old, new } => {
            let change = vitrine.rename_category(&old, &new)?;
            println!("Renamed category '{}' -> '{}'", change.value.0, change.value.1);
            print_snapshot(&change.snapshot);
        }
        Command::DeleteCategory { key } => {
            let change = vitrine.delete_category(&key)?;
            println!("Deleted category '{}' ({} records touched)", key, change.value);
            print_snapshot(&change.snapshot);
        }
        Command::Assign {
            identifier,
            categories,
        } => {
            let change = vitrine.assign_categories(&identifier, &categories)?;
            println!("Assigned [{}] to {}", change.value.join(", "), identifier);
            print_snapshot(&change.snapshot);
        }
        Command::Reorder {
            identifier,
            position,
        } => {
            let change = vitrine.reorder(&identifier, position)?;
            println!("Moved {} to position {}", identifier, position);
            print_snapshot(&change.snapshot);
        }
        Command::Rename { identifier, title } => {
            let change = vitrine.rename_title(&identifier, &title)?;
            println!("Renamed {} to \"{}\"", identifier, title);
            print_snapshot(&change.snapshot);
        }
        Command::Enable { identifier } => {
            let change = vitrine.set_enabled(&identifier, true)?;
            println!("Enabled {}", identifier);
            print_snapshot(&change.snapshot);
        }
        Command::Disable { identifier } => {
            let change = vitrine.set_enabled(&identifier, false)?;
            println!("Disabled {} (record retained, card hidden)", identifier);
            print_snapshot(&change.snapshot);
        }
        Command::Snapshots => {
            for entry in vitrine.list_snapshots()? {
                let kind = match entry.kind {
                    SnapshotKind::Document => "document",
                    SnapshotKind::Structured => "data",
                };
                println!("{:<8} {}", kind, entry.path.display());
            }
        }
        Command::Restore { snapshot } => {
            let outcome = vitrine.restore(&snapshot)?;
            match outcome.pre_restore_snapshot {
                Some(path) => println!("Previous showcase saved to {}", path.display()),
                None => println!("No previous showcase existed"),
            }
            print_reconcile(&outcome.reconcile);
        }
        Command::Prune => {
            let change = vitrine.prune()?;
            if change.value.is_empty() {
                println!("Nothing to prune");
            } else {
                println!("Pruned {} record(s): {}", change.value.len(), change.value.join(", "));
            }
            print_snapshot(&change.snapshot);
        }
        Command::Doctor => {
            let change = vitrine.repair_entities()?;
            if change.value {
                println!("Showcase entities normalized");
            } else {
                println!("Showcase already clean");
            }
            print_snapshot(&change.snapshot);
        }
    }

    Ok(())
}

fn print_reconcile(outcome: &ReconcileOutcome) {
    println!(
        "Reconciled: {} created, {} updated, {} unchanged, {} retained",
        outcome.created.len(),
        outcome.updated.len(),
        outcome.unchanged,
        outcome.retained.len()
    );
    for identifier in &outcome.created {
        println!("  new: {}", identifier);
    }
    for identifier in &outcome.retained {
        println!("  retained (file missing): {}", identifier);
    }
    if let Some(path) = &outcome.document_snapshot {
        println!("Snapshot: {}", path.display());
    }
    println!("Data snapshot: {}", outcome.data_snapshot.display());
}

fn print_snapshot(snapshot: &Option<PathBuf>) {
    if let Some(path) = snapshot {
        println!("Snapshot: {}", path.display());
    }
}
