use anyhow::Context;
use clap::{Parser, Subcommand};
use inventory_store::{
    Column, Config, Database, Field, InventoryProvider, InventoryStore, ItemValues, SortOrder,
    Target,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "inventory")]
#[command(about = "Manage the local inventory database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every item as JSON
    #[command(alias = "ls")]
    List,

    /// Print a single item
    Show { id: i64 },

    /// Add a new item
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: i64,
        #[arg(long, default_value_t = 0)]
        quantity: i64,
        #[arg(long)]
        supplier_name: String,
        #[arg(long)]
        supplier_phone: Option<i64>,
    },

    /// Change some fields of an existing item
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<i64>,
        #[arg(long)]
        quantity: Option<i64>,
        #[arg(long)]
        supplier_name: Option<String>,
        #[arg(long)]
        supplier_phone: Option<i64>,
    },

    /// Sell one unit of an item
    Sell { id: i64 },

    /// Add units to an item's stock (negative to remove)
    Restock {
        id: i64,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        amount: i64,
    },

    /// Delete an item
    #[command(alias = "rm")]
    Delete { id: i64 },

    /// Delete every item
    DeleteAll,

    /// Insert a placeholder item
    Seed,
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn", config.log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(store: &InventoryStore, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::List => {
            let items = store
                .query(Target::Collection, &[], None, Some(&SortOrder::asc(Column::Id)))
                .await?;
            print_json(&items.to_json())?;
        }
        Commands::Show { id } => {
            let item = store
                .get_item(id)
                .await?
                .with_context(|| format!("item {} not found", id))?;
            print_json(&serde_json::to_value(item)?)?;
        }
        Commands::Add {
            name,
            price,
            quantity,
            supplier_name,
            supplier_phone,
        } => {
            let values = ItemValues::new()
                .name(name)
                .price(price)
                .quantity(quantity)
                .supplier_name(supplier_name)
                .with(Field::SupplierPhone, supplier_phone);
            let id = store.insert(&values).await?;
            println!("{}", Target::Item(id));
        }
        Commands::Edit {
            id,
            name,
            price,
            quantity,
            supplier_name,
            supplier_phone,
        } => {
            let mut values = ItemValues::new();
            if let Some(name) = name {
                values.put(Field::Name, name);
            }
            if let Some(price) = price {
                values.put(Field::Price, price);
            }
            if let Some(quantity) = quantity {
                values.put(Field::Quantity, quantity);
            }
            if let Some(supplier_name) = supplier_name {
                values.put(Field::SupplierName, supplier_name);
            }
            if let Some(supplier_phone) = supplier_phone {
                values.put(Field::SupplierPhone, supplier_phone);
            }

            let rows = store.update(Target::Item(id), &values, None).await?;
            if rows == 0 {
                anyhow::bail!("item {} was not updated", id);
            }
            println!("updated {}", Target::Item(id));
        }
        Commands::Sell { id } => {
            let remaining = store.sell_item(id).await?;
            println!("sold one, {} left", remaining);
        }
        Commands::Restock { id, amount } => {
            let quantity = store.restock_item(id, amount).await?;
            println!("{} in stock", quantity);
        }
        Commands::Delete { id } => {
            let rows = store.delete(Target::Item(id), None).await?;
            if rows == 0 {
                anyhow::bail!("item {} not found", id);
            }
            println!("deleted {}", Target::Item(id));
        }
        Commands::DeleteAll => {
            let rows = store.delete_all().await?;
            println!("deleted {} items", rows);
        }
        Commands::Seed => {
            let id = store.insert_sample_item().await?;
            println!("{}", Target::Item(id));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("invalid configuration")?;
    init_tracing(&config);

    let database = Arc::new(Database::new(config));
    let store = InventoryStore::new(database.clone());

    let result = run(&store, cli.command).await;
    database.close().await;

    result
}
