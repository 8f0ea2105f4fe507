//! Development seed tool.
//!
//! Fills an empty database with categories, products spread across them,
//! and a few customers, so the API has something to serve locally.
//!
//! ```bash
//! cargo run -p bodega-db --bin seed
//! cargo run -p bodega-db --bin seed -- --count 200 --db ./data/bodega.db
//! ```

use std::env;
use std::process::exit;

use bodega_core::{NewCategory, NewCustomer, NewProduct};
use bodega_db::{Database, DbConfig};

/// Category names with product stems to combine with sizes.
const CATALOG: &[(&str, &[&str])] = &[
    (
        "Beverages",
        &[
            "Sparkling Water",
            "Still Water",
            "Orange Juice",
            "Cola",
            "Lemonade",
            "Iced Tea",
            "Ground Coffee",
        ],
    ),
    (
        "Pantry",
        &[
            "Olive Oil",
            "Sunflower Oil",
            "White Rice",
            "Spaghetti",
            "Canned Tomatoes",
            "Chickpeas",
        ],
    ),
    (
        "Dairy",
        &[
            "Whole Milk",
            "Greek Yogurt",
            "Butter",
            "Manchego Cheese",
            "Eggs Dozen",
        ],
    ),
    (
        "Snacks",
        &[
            "Potato Chips",
            "Salted Almonds",
            "Dark Chocolate",
            "Breadsticks",
            "Dried Figs",
        ],
    ),
];

/// Size suffixes with a price bump in cents.
const SIZES: &[(&str, i64)] = &[
    ("250ml", 0),
    ("500ml", 50),
    ("1L", 120),
    ("Small", 0),
    ("Large", 150),
    ("Family Pack", 300),
];

const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Ana Torres", "Valencia", "referral"),
    ("Luis Gil", "Sevilla", "walk-in"),
    ("Marta Ruiz", "Madrid", "online"),
    ("Jorge Vidal", "Valencia", "walk-in"),
    ("Carmen Soler", "Bilbao", "referral"),
];

struct SeedOpts {
    count: usize,
    db_path: String,
}

fn parse_args() -> SeedOpts {
    let mut opts = SeedOpts {
        count: 100,
        db_path: "./bodega_dev.db".to_string(),
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--count" | "-c" => {
                if let Some(value) = args.next() {
                    opts.count = value.parse().unwrap_or(opts.count);
                }
            }
            "--db" | "-d" => {
                if let Some(value) = args.next() {
                    opts.db_path = value;
                }
            }
            "--help" | "-h" => {
                println!("Bodega seed tool");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("  -c, --count <N>    Products to generate (default: 100)");
                println!("  -d, --db <PATH>    Database file (default: ./bodega_dev.db)");
                exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other} (try --help)");
                exit(1);
            }
        }
    }

    opts
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = parse_args();

    println!("Seeding {} products into {}", opts.count, opts.db_path);

    let db = Database::new(DbConfig::new(&opts.db_path)).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("Database already holds {existing} products; nothing to do.");
        println!("Delete the file to reseed from scratch.");
        return Ok(());
    }

    // Categories first, products need their ids
    let mut category_ids = Vec::with_capacity(CATALOG.len());
    for (name, _) in CATALOG {
        let category = db
            .categories()
            .insert(&NewCategory {
                name: name.to_string(),
                description: None,
                active: true,
                media_url: None,
            })
            .await?;
        category_ids.push(category.id);
    }
    println!("  {} categories", category_ids.len());

    let start = std::time::Instant::now();
    let mut generated = 0usize;

    'fill: for (category_idx, (_, stems)) in CATALOG.iter().enumerate() {
        for stem in stems.iter() {
            for (size, bump) in SIZES {
                if generated >= opts.count {
                    break 'fill;
                }

                // Deterministic pseudo-variety, good enough for dev data
                let salt = generated * 13 + category_idx * 7;
                let product = NewProduct {
                    name: format!("{stem} {size}"),
                    description: None,
                    price_cents: 99 + (salt % 800) as i64 + bump,
                    stock: (salt % 51) as i64,
                    active: true,
                    category_id: category_ids[category_idx].clone(),
                    media_url: None,
                };

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("  skipping {}: {e}", product.name);
                    continue;
                }
                generated += 1;
            }
        }
    }

    println!("  {} products in {:?}", generated, start.elapsed());

    for (name, city, channel) in CUSTOMERS {
        db.customers()
            .insert(&NewCustomer {
                name: name.to_string(),
                city: city.to_string(),
                channel: channel.to_string(),
                media_url: None,
            })
            .await?;
    }
    println!("  {} customers", CUSTOMERS.len());

    println!("Done.");
    Ok(())
}
