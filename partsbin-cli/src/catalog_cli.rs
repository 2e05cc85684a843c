//! Catalog commands
//!
//! Import and export use a JSON array of flat rows (the tabular mapping the
//! core exposes); spreadsheet formats are left to external tools.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use partsbin_core::model::fallback::{
    category_or_default, price_or_default, release_date_or_default, status_or_default,
    tier_or_default,
};
use partsbin_core::model::{Part, PartSlots, Product, ProductBuilder, ProductSource};
use partsbin_core::planner::Planner;
use partsbin_core::tabular::TabularRow;

use crate::output;

#[derive(Parser, Debug)]
pub struct CatalogCommand {
    #[clap(subcommand)]
    pub command: CatalogSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CatalogSubcommand {
    /// List purchasable products
    List {
        /// Include discontinued products
        #[clap(long)]
        all: bool,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Add a product; without --id a custom id is generated
    Add(AddArgs),

    /// Remove a product by id
    Remove {
        /// Product id
        id: String,
    },

    /// Upsert products from a JSON array of rows
    Import {
        /// Path to the rows file
        file: PathBuf,
    },

    /// Write every product as a JSON array of rows
    Export {
        /// Output file (stdout when omitted)
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Product name
    #[clap(long)]
    name: String,

    /// Official product id (e.g. BX-21); marks the product as official
    #[clap(long)]
    id: Option<String>,

    /// Primary part name
    #[clap(long)]
    primary: String,

    /// Secondary part name
    #[clap(long)]
    secondary: String,

    /// Tertiary part name
    #[clap(long)]
    tertiary: String,

    /// Category of all three parts (Attack, Defense, Stamina, Balance)
    #[clap(long, default_value = "Balance")]
    category: String,

    /// Price range, e.g. 1100-1320¥
    #[clap(long, default_value = "0-0¥")]
    price: String,

    /// Tier (S+, S, A, B)
    #[clap(long, default_value = "A")]
    tier: String,

    /// Packaging format
    #[clap(long, default_value = "")]
    format: String,

    /// Release month, YYYY-MM
    #[clap(long, default_value = "")]
    release_date: String,

    /// Status (active, upcoming, discontinued)
    #[clap(long, default_value = "active")]
    status: String,
}

impl AddArgs {
    fn into_product(self) -> Product {
        let category = category_or_default(&self.category);
        let parts = PartSlots::new(
            Part::new(self.primary, category),
            Part::new(self.secondary, category),
            Part::new(self.tertiary, category),
        );

        let builder = match self.id {
            Some(id) => ProductBuilder::new(id, self.name, parts).source(ProductSource::Official),
            None => ProductBuilder::custom(self.name, parts),
        };

        builder
            .price(price_or_default(&self.price))
            .tier(tier_or_default(&self.tier))
            .format(self.format)
            .release_date(release_date_or_default(&self.release_date))
            .status(status_or_default(&self.status))
            .build()
    }
}

impl CatalogCommand {
    pub async fn execute(self, planner: &mut Planner) -> Result<()> {
        match self.command {
            CatalogSubcommand::List { all, json } => {
                let catalog = planner.catalog().load().await?;
                let mut products = catalog.products().to_vec();
                if all {
                    products.extend(catalog.retired().iter().cloned());
                }

                if json {
                    println!("{}", serde_json::to_string_pretty(&products)?);
                } else {
                    println!(
                        "Catalog {} ({} products)\n",
                        catalog.metadata().version,
                        products.len()
                    );
                    output::print_products(&products);
                }
            }
            CatalogSubcommand::Add(args) => {
                let product = args.into_product();
                let id = product.id().to_string();
                let report = planner.catalog().add_product(product).await?;
                for warning in &report.warnings {
                    println!("  ⚠️  {warning}");
                }
                println!("✅ Added {id}");
            }
            CatalogSubcommand::Remove { id } => {
                if planner.catalog().remove_product(&id).await? {
                    println!("✅ Removed {id}");
                } else {
                    println!("{id} is not in the catalog");
                }
            }
            CatalogSubcommand::Import { file } => {
                let content = fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let rows: Vec<TabularRow> = serde_json::from_str(&content)
                    .with_context(|| format!("{} is not a JSON array of rows", file.display()))?;

                let summary = planner.catalog().import_rows(&rows).await?;
                for (row, reason) in &summary.skipped {
                    println!("  ⚠️  row {row} skipped: {reason}");
                }
                println!(
                    "✅ Imported {} new and {} replaced products",
                    summary.added, summary.replaced
                );
            }
            CatalogSubcommand::Export { output } => {
                let rows = planner.catalog().export_rows().await?;
                let content = serde_json::to_string_pretty(&rows)?;
                match output {
                    Some(path) => {
                        fs::write(&path, content)
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        eprintln!("Exported {} products to {}", rows.len(), path.display());
                    }
                    None => println!("{content}"),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partsbin_core::model::{Category, Slot, Tier};

    fn parse(args: &[&str]) -> CatalogSubcommand {
        let mut argv = vec!["catalog"];
        argv.extend_from_slice(args);
        CatalogCommand::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn test_add_without_id_mints_custom_product() {
        let CatalogSubcommand::Add(args) = parse(&[
            "add", "--name", "Homebrew", "--primary", "Dran Sword", "--secondary", "3-60",
            "--tertiary", "Flat", "--tier", "S+", "--category", "attack",
        ]) else {
            panic!("expected add");
        };

        let product = args.into_product();
        assert!(product.id().starts_with("custom-"));
        assert_eq!(product.source(), ProductSource::Custom);
        assert_eq!(product.tier(), Tier::SPlus);
        assert_eq!(product.part(Slot::Primary).category, Category::Attack);
    }

    #[test]
    fn test_add_with_id_is_official_and_lenient() {
        let CatalogSubcommand::Add(args) = parse(&[
            "add", "--id", "BX-21", "--name", "New", "--primary", "A", "--secondary", "B",
            "--tertiary", "C", "--price", "cheap", "--tier", "Z",
        ]) else {
            panic!("expected add");
        };

        let product = args.into_product();
        assert_eq!(product.id(), "BX-21");
        assert_eq!(product.source(), ProductSource::Official);
        assert_eq!(product.tier(), Tier::A);
        assert_eq!(product.price().to_string(), "0-0¥");
    }
}
