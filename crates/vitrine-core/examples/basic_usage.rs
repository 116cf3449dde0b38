//! Basic usage example - reconcile a showcase and list its records

use vitrine_core::{CatalogConfig, Result, Vitrine};

fn main() -> Result<()> {
    // Get site root from args or use current directory
    let root = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());

    println!("Opening showcase under: {}", root);
    let vitrine = Vitrine::new(CatalogConfig::for_root(&root));

    let outcome = vitrine.sync(false)?;
    println!(
        "Reconciled: {} created, {} unchanged, {} retained",
        outcome.created.len(),
        outcome.unchanged,
        outcome.retained.len()
    );

    for record in vitrine.records()? {
        let marker = if record.enabled { ' ' } else { '-' };
        println!(
            "  {}{} {} [{}]",
            marker,
            record.position,
            record.title,
            record.categories.join(", ")
        );
    }

    Ok(())
}
