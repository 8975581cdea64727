//! # Seed Data Generator
//!
//! Populates the database with a demo catalog (and optionally demo
//! sales) for development.
//!
//! ## Usage
//! ```bash
//! # Seed the full demo catalog
//! cargo run -p mercadinho-db --bin seed
//!
//! # Limit the catalog and add demo sales
//! cargo run -p mercadinho-db --bin seed -- --count 10 --sales 30
//!
//! # Specify database path
//! cargo run -p mercadinho-db --bin seed -- --db ./data/mercadinho.db
//! ```
//!
//! ## Generated Data
//! A realistic mini-market shelf across categories: Alimentos, Bebidas,
//! Hortifrúti (sold by weight), Limpeza and Padaria. Product codes come
//! from the real generator, so `ALI0001`, `BEB0001`, ... line up with
//! what the till produces. Demo sales are spread over the last ten days
//! with rotating payment methods and customers.

use chrono::{Duration, Local};
use std::env;

use mercadinho_core::types::Unit;
use mercadinho_core::{cart, catalog, checkout, CheckoutRequest, Money, PaymentMethod, Quantity};
use mercadinho_db::{Database, DbConfig};

/// Demo shelf: (category, unit, items as (name, price in centavos)).
const SHELF: &[(&str, Unit, &[(&str, i64)])] = &[
    (
        "Alimentos",
        Unit::Unit,
        &[
            ("Arroz Branco 5kg", 2490),
            ("Feijão Carioca 1kg", 890),
            ("Macarrão Espaguete 500g", 450),
            ("Farinha de Trigo 1kg", 620),
            ("Açúcar Cristal 2kg", 1150),
            ("Café Torrado 500g", 1690),
            ("Óleo de Soja 900ml", 780),
            ("Sal Refinado 1kg", 320),
        ],
    ),
    (
        "Bebidas",
        Unit::Unit,
        &[
            ("Refrigerante Cola 2L", 999),
            ("Suco de Laranja 1L", 850),
            ("Água Mineral 500ml", 250),
            ("Cerveja Pilsen Lata 350ml", 449),
            ("Leite Integral 1L", 579),
        ],
    ),
    (
        "Hortifrúti",
        Unit::Kg,
        &[
            ("Banana Prata", 649),
            ("Tomate Italiano", 899),
            ("Batata Inglesa", 549),
            ("Cebola Nacional", 479),
            ("Maçã Gala", 1090),
        ],
    ),
    (
        "Limpeza",
        Unit::Unit,
        &[
            ("Detergente Neutro 500ml", 299),
            ("Sabão em Pó 1kg", 1490),
            ("Água Sanitária 1L", 590),
        ],
    ),
    (
        "Padaria",
        Unit::Kg,
        &[
            ("Pão Francês", 1590),
            ("Queijo Mussarela", 3990),
            ("Presunto Cozido", 2990),
        ],
    ),
];

/// Customers used for demo sales; repeats make the top-customer card
/// interesting.
const CUSTOMERS: &[&str] = &[
    "Consumidor Final",
    "Consumidor Final",
    "Maria Silva",
    "João Santos",
    "Consumidor Final",
    "Ana Costa",
];

const METHODS: &[PaymentMethod] = &[
    PaymentMethod::Cash,
    PaymentMethod::Pix,
    PaymentMethod::Credit,
    PaymentMethod::Debit,
    PaymentMethod::Cash,
    PaymentMethod::FoodVoucher,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug surfaces sqlx/migration logs during seeding.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = usize::MAX;
    let mut sales: usize = 0;
    let mut db_path = String::from("./mercadinho_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(usize::MAX);
                    i += 1;
                }
            }
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Mercadinho POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Max products to seed (default: whole demo shelf)");
                println!("  -s, --sales <N>    Demo sales to record (default: 0)");
                println!("  -d, --db <PATH>    Database file path (default: ./mercadinho_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Mercadinho POS Seed Data Generator");
    println!("=====================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let store = db.state();

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let mut state = store.load_state().await?;
    if !state.products.is_empty() {
        println!("⚠ Database already has {} products", state.products.len());
        println!("  Skipping seed to avoid duplicate codes.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Seed the catalog through the real registration path so codes,
    // validation and prefixes match production behavior.
    println!();
    println!("Seeding catalog...");

    let mut seeded = 0usize;
    'shelf: for (category, unit, items) in SHELF {
        for (index, (name, price)) in items.iter().enumerate() {
            if seeded >= count {
                break 'shelf;
            }

            let stock = match unit {
                // 5 to 60 pieces, with a few low-stock rows for the
                // dashboard cards.
                Unit::Unit => Quantity::from_units(((index * 13 + 5) % 61) as i64),
                // 2,000 to 9,999 kg
                Unit::Kg => Quantity::from_thousandths((2000 + (index * 1777) % 8000) as i64),
            };

            let draft = catalog::NewProduct {
                name: name.to_string(),
                price: Money::from_centavos(*price),
                quantity: stock,
                unit: *unit,
                category: category.to_string(),
                image: None,
            };

            match catalog::add_product(&mut state.products, draft) {
                Ok(code) => {
                    seeded += 1;
                    println!("  {} {}", code, name);
                }
                Err(e) => eprintln!("  Failed to seed {}: {}", name, e),
            }
        }
    }

    println!("✓ Seeded {} products", seeded);

    // Optionally record demo sales through the real checkout path.
    if sales > 0 {
        println!();
        println!("Recording {} demo sales...", sales);

        let today = Local::now().naive_local();
        let mut recorded = 0usize;

        for i in 0..sales {
            let placed_at = today - Duration::days((i % 10) as i64)
                + Duration::hours(((i * 3) % 12) as i64)
                - Duration::hours(6);

            // One to three lines per sale, walking the catalog.
            for line in 0..(1 + i % 3) {
                let product = &state.products[(i * 5 + line * 7) % state.products.len()];
                let code = product.code.clone();
                let requested = match product.unit {
                    Unit::Unit => Quantity::from_units((1 + (i + line) % 3) as i64),
                    Unit::Kg => Quantity::from_thousandths((300 + ((i + line) * 217) % 1200) as i64),
                };
                // Low stock or sold out just skips the line.
                let _ = cart::add_item(&mut state.products, &mut state.cart, &code, requested);
            }

            if state.cart.is_empty() {
                continue;
            }

            let method = METHODS[i % METHODS.len()];
            let total = cart::totals(&state.cart).total;
            let request = CheckoutRequest {
                payment: Some(method),
                cash_tendered: Some(total + Money::from_centavos(((i % 4) * 500) as i64)),
                client: Some(CUSTOMERS[i % CUSTOMERS.len()].to_string()),
            };

            match checkout::commit(&mut state, request, placed_at) {
                Ok(order) => {
                    recorded += 1;
                    if recorded % 10 == 0 {
                        println!("  Recorded {} sales...", recorded);
                    }
                    let _ = order;
                }
                Err(e) => eprintln!("  Sale {} failed: {}", i + 1, e),
            }
        }

        println!("✓ Recorded {} sales", recorded);
    }

    store.persist_state(&state).await?;

    println!();
    println!("✓ Seed complete!");
    println!(
        "  {} products, {} sales, next order PED{:06}",
        state.products.len(),
        state.sales.len(),
        state.last_order_number + 1
    );

    Ok(())
}
