//! Seeds the configured database with sample portfolio data.
//!
//! Usage: `cargo run --bin seed` (reads DATABASE_URL from the environment or `.env`)

use portfolio_api::{db, seed};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("portfolio_api=info")),
        )
        .init();

    let pool = match db::init_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = db::run_migrations(&pool).await {
        eprintln!("Error creating schema: {}", e);
        std::process::exit(1);
    }

    match seed::run(&pool).await {
        Ok(summary) => {
            println!("\nDatabase seeded successfully!");
            println!("Sample data created:");
            println!("- {} projects", summary.projects);
            println!("- {} blog posts", summary.blog_posts);
            println!("- {} products", summary.products);
            println!("- {} messages", summary.messages);
            println!("- {} page views", summary.page_views);
            println!("- {} interactions", summary.interactions);
        }
        Err(e) => {
            eprintln!("Error seeding database: {}", e);
            std::process::exit(1);
        }
    }

    pool.close().await;
}
