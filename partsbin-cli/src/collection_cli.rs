//! Collection commands

use anyhow::Result;
use clap::{Parser, Subcommand};

use partsbin_core::planner::Planner;

use crate::output;

#[derive(Parser, Debug)]
pub struct CollectionCommand {
    #[clap(subcommand)]
    pub command: CollectionSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CollectionSubcommand {
    /// Mark a product as owned
    Add {
        /// Product id (e.g. BX-01)
        id: String,
    },

    /// Unmark an owned product
    Remove {
        /// Product id
        id: String,
    },

    /// List owned products
    List {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
}

impl CollectionCommand {
    pub async fn execute(self, planner: &mut Planner) -> Result<()> {
        match self.command {
            CollectionSubcommand::Add { id } => {
                let catalog = planner.catalog().load().await?;
                if catalog.find(&id).is_none() {
                    tracing::warn!("{} is not in the catalog; it will be ignored until it is", id);
                }
                if planner.collection().add_product(&id).await? {
                    println!("✅ Added {id} to the collection");
                } else {
                    println!("{id} is already owned");
                }
            }
            CollectionSubcommand::Remove { id } => {
                if planner.collection().remove_product(&id).await? {
                    println!("✅ Removed {id} from the collection");
                } else {
                    println!("{id} was not owned");
                }
            }
            CollectionSubcommand::List { json } => {
                let catalog = planner.catalog().load().await?;
                let products = planner.collection().get_owned_products(&catalog).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&products)?);
                } else {
                    println!("{} owned products\n", products.len());
                    output::print_products(&products);
                }
            }
        }
        Ok(())
    }
}
