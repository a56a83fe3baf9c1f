//! Seed the database with sample users and products.
//!
//! Creates one admin and two customer accounts plus a small electronics
//! catalog, enough to exercise the storefront end to end. Idempotent in
//! spirit: existing emails are skipped; `--fresh` wipes the tables first.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, warn};

use tamarind_api::db::{self, ProductRepository, RepositoryError, UserRepository};
use tamarind_api::models::ProductDraft;
use tamarind_api::services::auth::hash_password;
use tamarind_core::{Email, Role};

use crate::commands::migrate::database_url;

struct SeedUser {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    role: Role,
}

const SEED_USERS: &[SeedUser] = &[
    SeedUser {
        name: "Admin User",
        email: "admin@tamarind.shop",
        password: "tamarind-admin-1",
        role: Role::Admin,
    },
    SeedUser {
        name: "John Doe",
        email: "john@tamarind.shop",
        password: "tamarind-john-1",
        role: Role::Customer,
    },
    SeedUser {
        name: "Jane Doe",
        email: "jane@tamarind.shop",
        password: "tamarind-jane-1",
        role: Role::Customer,
    },
];

fn seed_products() -> Vec<ProductDraft> {
    vec![
        ProductDraft {
            name: "Airpods Wireless Bluetooth Headphones".to_string(),
            image: "/images/airpods.jpg".to_string(),
            brand: "Apple".to_string(),
            category: "Electronics".to_string(),
            description: "Bluetooth technology lets you connect it with compatible devices \
                          wirelessly. High-quality AAC audio offers immersive listening."
                .to_string(),
            price: Decimal::new(8999, 2),
            count_in_stock: 10,
        },
        ProductDraft {
            name: "iPhone 13 Pro 256GB Memory".to_string(),
            image: "/images/phone.jpg".to_string(),
            brand: "Apple".to_string(),
            category: "Electronics".to_string(),
            description: "A transformative triple-camera system that adds tons of capability \
                          without complexity."
                .to_string(),
            price: Decimal::new(59999, 2),
            count_in_stock: 7,
        },
        ProductDraft {
            name: "Cannon EOS 80D DSLR Camera".to_string(),
            image: "/images/camera.jpg".to_string(),
            brand: "Cannon".to_string(),
            category: "Electronics".to_string(),
            description: "Characterized by versatile imaging specs, further clarified by a \
                          pair of robust focusing systems."
                .to_string(),
            price: Decimal::new(92999, 2),
            count_in_stock: 5,
        },
        ProductDraft {
            name: "Sony Playstation 5".to_string(),
            image: "/images/playstation.jpg".to_string(),
            brand: "Sony".to_string(),
            category: "Electronics".to_string(),
            description: "The ultimate home entertainment center starts with PlayStation."
                .to_string(),
            price: Decimal::new(39999, 2),
            count_in_stock: 11,
        },
        ProductDraft {
            name: "Logitech G-Series Gaming Mouse".to_string(),
            image: "/images/mouse.jpg".to_string(),
            brand: "Logitech".to_string(),
            category: "Electronics".to_string(),
            description: "Get a better handle on your games with this Logitech gaming mouse."
                .to_string(),
            price: Decimal::new(4999, 2),
            count_in_stock: 7,
        },
        ProductDraft {
            name: "Amazon Echo Dot 3rd Generation".to_string(),
            image: "/images/alexa.jpg".to_string(),
            brand: "Amazon".to_string(),
            category: "Electronics".to_string(),
            description: "Meet Echo Dot, our most popular smart speaker with a fabric design."
                .to_string(),
            price: Decimal::new(2999, 2),
            count_in_stock: 0,
        },
    ]
}

/// Seed the database.
///
/// # Errors
///
/// Returns an error if the database URL is missing or a statement fails.
pub async fn run(fresh: bool) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let pool = db::create_pool(&database_url()?).await?;
    info!("Connected to database");

    if fresh {
        wipe(&pool).await?;
        info!("Existing data removed");
    }

    seed_users(&pool).await?;
    seed_catalog(&pool).await?;

    info!("Seeding complete!");
    Ok(())
}

async fn wipe(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Order matters: order_items and reviews reference products and users.
    sqlx::query("DELETE FROM order_items").execute(pool).await?;
    sqlx::query("DELETE FROM orders").execute(pool).await?;
    sqlx::query("DELETE FROM product_reviews").execute(pool).await?;
    sqlx::query("DELETE FROM products").execute(pool).await?;
    sqlx::query("DELETE FROM users").execute(pool).await?;
    Ok(())
}

async fn seed_users(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let users = UserRepository::new(pool);

    for seed in SEED_USERS {
        let email = Email::parse(seed.email)?;
        let password_hash = hash_password(seed.password)?;

        let user = match users.create(seed.name, &email, &password_hash).await {
            Ok(user) => user,
            Err(RepositoryError::Conflict(_)) => {
                warn!(email = seed.email, "user already exists, skipping");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if seed.role.is_admin() {
            users.update(user.id, seed.name, &email, Role::Admin).await?;
        }

        info!(email = seed.email, "user created");
    }

    Ok(())
}

async fn seed_catalog(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let products = ProductRepository::new(pool);

    for draft in seed_products() {
        let product = products.create(&draft).await?;
        info!(name = %product.name, price = %product.price, "product created");
    }

    Ok(())
}
