//! Loads the sample annotator, projects, assignments and reviews
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/dhriti seed-tasks --migrate
//! ```

use clap::Parser;
use dhriti_shared::db::{migrations, pool};
use dhriti_tools::seed;

#[derive(Debug, Parser)]
#[command(name = "seed-tasks", version, about = "Seed sample task data")]
struct Args {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Apply pending migrations first
    #[arg(long)]
    migrate: bool,

    /// Drop and recreate the database first (implies --migrate)
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    dhriti_tools::init_tracing("dhriti_tools=info,dhriti_shared=info");

    let args = Args::parse();

    if args.reset {
        tracing::warn!("Resetting database");
        migrations::drop_database(&args.database_url).await?;
    }
    if args.reset || args.migrate {
        migrations::ensure_database_exists(&args.database_url).await?;
    }

    let db = pool::create_pool(pool::DatabaseConfig {
        url: args.database_url.clone(),
        max_connections: 2,
        ..Default::default()
    })
    .await?;

    if args.reset || args.migrate {
        migrations::run_migrations(&db).await?;
    }

    let report = seed::seed(&db).await?;
    pool::close_pool(db).await;

    println!(
        "Seed complete ({} projects created, {} reviews added). Login with:",
        report.projects_created, report.reviews_created
    );
    println!("  email: {}", seed::SAMPLE_EMAIL);
    println!("  password: {}", seed::SAMPLE_PASSWORD);

    Ok(())
}
