//! # Seed Data Generator
//!
//! Creates a demo branch for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./fuelbook_dev.db with a fresh branch
//! cargo run -p fuelbook-db --bin seed
//!
//! # Specify database path and branch id
//! cargo run -p fuelbook-db --bin seed -- --db ./data/fuelbook.db --branch <UUID>
//! ```
//!
//! ## Generated Data
//! - Two banks
//! - One customer and one supplier
//! - Petrol and diesel tanks, stock rows and two nozzles each

use std::env;

use anyhow::{bail, Context};
use chrono::Utc;
use fuelbook_core::{Bank, Counterparty, CounterpartyKind, Money, Nozzle, Stock, Tank, Volume};
use fuelbook_db::{Database, DbConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// (fuel type, tank capacity in litres, opening level in litres)
const FUELS: &[(&str, i64, i64)] = &[("petrol", 20_000, 12_000), ("diesel", 25_000, 18_000)];

const BANKS: &[(&str, i64)] = &[("State Bank", 250_000), ("HDFC Current", 90_000)];

const NOZZLES_PER_FUEL: usize = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./fuelbook_dev.db");
    let mut branch_id = Uuid::new_v4().to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--branch" | "-b" => {
                if i + 1 < args.len() {
                    branch_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Fuelbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file path (default: ./fuelbook_dev.db)");
                println!("  -b, --branch <UUID>    Branch to seed (default: a new one)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            other => bail!("unknown argument: {other}"),
        }
        i += 1;
    }

    fuelbook_core::validation::validate_uuid_field("branch", &branch_id)
        .context("--branch must be a UUID")?;

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {db_path}"))?;
    info!(path = %db_path, branch_id = %branch_id, "Seeding database");

    if !db.banks().list_for_branch(&branch_id).await?.is_empty() {
        info!(branch_id = %branch_id, "Branch already seeded, nothing to do");
        return Ok(());
    }

    let now = Utc::now();

    for (name, balance) in BANKS {
        db.banks()
            .insert(&Bank {
                id: Uuid::new_v4().to_string(),
                branch_id: branch_id.clone(),
                name: (*name).to_string(),
                balance_amount: Money::from_rupees(*balance),
                created_at: now,
                updated_at: now,
            })
            .await?;
    }

    for (kind, name) in [
        (CounterpartyKind::Customer, "City Transport Co."),
        (CounterpartyKind::Supplier, "Regional Fuel Depot"),
    ] {
        db.counterparties()
            .insert(&Counterparty {
                id: Uuid::new_v4().to_string(),
                branch_id: branch_id.clone(),
                kind,
                name: name.to_string(),
                outstanding_payments: Money::zero(),
                created_at: now,
                updated_at: now,
            })
            .await?;
    }

    let fuel = db.fuel();
    for (machine, (fuel_type, capacity, level)) in FUELS.iter().enumerate() {
        fuel.insert_tank(&Tank {
            id: Uuid::new_v4().to_string(),
            branch_id: branch_id.clone(),
            fuel_type: (*fuel_type).to_string(),
            capacity: Volume::from_litres(*capacity),
            current_level: Volume::from_litres(*level),
            updated_at: now,
        })
        .await?;

        fuel.insert_stock(&Stock {
            id: Uuid::new_v4().to_string(),
            branch_id: branch_id.clone(),
            item: (*fuel_type).to_string(),
            quantity: Volume::from_litres(*level),
            updated_at: now,
        })
        .await?;

        for n in 0..NOZZLES_PER_FUEL {
            let nozzle = Nozzle {
                id: Uuid::new_v4().to_string(),
                branch_id: branch_id.clone(),
                machine_id: format!("MPD-{}", machine + 1),
                fuel_type: (*fuel_type).to_string(),
                opening_reading: Volume::zero(),
                updated_at: now,
            };
            fuel.insert_nozzle(&nozzle).await?;
            info!(nozzle_id = %nozzle.id, fuel_type, position = n + 1, "Nozzle created");
        }
    }

    info!(
        branch_id = %branch_id,
        banks = BANKS.len(),
        tanks = FUELS.len(),
        nozzles = FUELS.len() * NOZZLES_PER_FUEL,
        "Seed complete"
    );
    db.close().await;

    Ok(())
}
