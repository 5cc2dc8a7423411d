use std::env;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use diesel::prelude::*;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use estate_agent::{
    auth::{password, Role},
    config::AppConfig,
    db,
    models::{NewAdminUser, NewProperty},
    schema::{admin_users, properties},
};

const USAGE: &str = "Usage: manage <command>\n\n\
    create-admin <email> <password>   create an admin or reset an existing account to admin\n\
    seed-properties                   insert demo listings into an empty property table";

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("create-admin") => {
            let (Some(email), Some(password)) = (args.next(), args.next()) else {
                eprintln!("{USAGE}");
                std::process::exit(1);
            };
            create_admin(&email, &password)?;
        }
        Some("seed-properties") => seed_properties()?,
        Some(cmd) => {
            eprintln!("Unknown command: {cmd}\n{USAGE}");
            std::process::exit(1);
        }
        None => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn connect() -> Result<db::PgPool> {
    let config = AppConfig::from_env()?;
    tracing::info!(
        component = "manage",
        database_url = %config.redacted_database_url(),
        "loaded configuration"
    );
    let pool = db::init_pool_with_size(&config.database_url, 1)?;
    db::run_migrations(&pool)?;
    Ok(pool)
}

fn create_admin(email: &str, raw_password: &str) -> Result<()> {
    let email = email.trim().to_lowercase();
    if !email.contains('@') {
        bail!("{email} is not an email address");
    }
    if let Some(reason) = password::validate_new_password(raw_password) {
        bail!(reason);
    }

    let pool = connect()?;
    let mut conn = pool.get().context("failed to get database connection")?;
    let password_hash = password::hash_password(raw_password)?;

    let updated = diesel::update(admin_users::table.filter(admin_users::email.eq(&email)))
        .set((
            admin_users::password_hash.eq(&password_hash),
            admin_users::role.eq(Role::Admin.as_str()),
            admin_users::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)
        .context("failed to update existing account")?;

    if updated > 0 {
        println!("Existing account {email} reset to admin.");
        return Ok(());
    }

    diesel::insert_into(admin_users::table)
        .values(&NewAdminUser {
            id: Uuid::new_v4(),
            email: email.clone(),
            password_hash,
            role: Role::Admin.as_str().to_string(),
        })
        .execute(&mut conn)
        .context("failed to insert admin")?;

    println!("Admin account {email} created.");
    Ok(())
}

fn seed_properties() -> Result<()> {
    let pool = connect()?;
    let mut conn = pool.get().context("failed to get database connection")?;

    let existing: i64 = properties::table
        .count()
        .get_result(&mut conn)
        .context("failed to count properties")?;
    if existing > 0 {
        println!("{existing} properties already present, nothing seeded.");
        return Ok(());
    }

    let listings = demo_listings();
    let inserted = diesel::insert_into(properties::table)
        .values(&listings)
        .execute(&mut conn)
        .context("failed to insert demo properties")?;

    println!("Seeded {inserted} properties.");
    Ok(())
}

fn demo_listings() -> Vec<NewProperty> {
    let listing = |title: &str,
                   location: &str,
                   price: &str,
                   beds: i32,
                   baths: i32,
                   sqft: &str,
                   description: &str,
                   featured: bool| NewProperty {
        id: Uuid::new_v4(),
        title: title.to_string(),
        location: location.to_string(),
        price: price.to_string(),
        sqft: Some(sqft.to_string()),
        beds: Some(beds),
        baths: Some(baths),
        description: Some(description.to_string()),
        primary_image_url: None,
        virtual_tour_url: None,
        featured,
    };

    vec![
        listing(
            "Sea Breeze Apartments",
            "Bandra West, Mumbai",
            "₹ 5 Cr",
            3,
            3,
            "1800",
            "Sea-facing apartment with a gym and pool.",
            true,
        ),
        listing(
            "Green Valley Villa",
            "Lonavala",
            "₹ 3.5 Cr",
            4,
            4,
            "3500",
            "Weekend villa with a private garden and terrace.",
            true,
        ),
        listing(
            "Urban Heights",
            "Andheri East, Mumbai",
            "₹ 2.2 Cr",
            2,
            2,
            "1100",
            "High-rise apartment a short walk from the metro.",
            false,
        ),
        listing(
            "Skyline Towers",
            "Worli, Mumbai",
            "₹ 12 Cr",
            4,
            5,
            "4500",
            "Penthouse with a 360-degree city view.",
            true,
        ),
    ]
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
