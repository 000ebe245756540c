use anyhow::Context;
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tracing::info;

use pos_api::{
    config, db,
    migrator::Migrator,
    repositories::{DbUserRepository, UserRepository},
};

#[derive(Parser)]
#[command(name = "migration", about = "Schema migrations for the POS API", version)]
struct Cli {
    /// Overrides the configured database URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Up {
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations (all of them unless --steps is given)
    Down {
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Drop every table and re-apply all migrations
    Fresh,
    /// Show which migrations have been applied
    Status,
    /// Create an account with staff and superuser rights
    CreateSuperuser {
        #[arg(long)]
        email: String,
        #[arg(long, env = "POS_SUPERUSER_PASSWORD")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);
    if let Some(url) = cli.database_url {
        cfg.database_url = url;
    }

    let pool = db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to database")?;

    match cli.command {
        Commands::Up { steps } => {
            Migrator::up(&pool, steps).await?;
            info!("migrations applied");
        }
        Commands::Down { steps } => {
            Migrator::down(&pool, steps).await?;
            info!("migrations rolled back");
        }
        Commands::Fresh => {
            Migrator::fresh(&pool).await?;
            info!("schema recreated");
        }
        Commands::Status => {
            Migrator::status(&pool).await?;
        }
        Commands::CreateSuperuser { email, password } => {
            let users = DbUserRepository::new(Arc::new(pool));
            let account = users.create_superuser(&email, &password).await?;
            info!(user_id = %account.id, email = %account.email, "superuser created");
        }
    }

    Ok(())
}
