//! CSV reconciliation CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelmeta_importer::catalog::{self, ImportOptions};
use reelmeta_importer::supplemental;

#[derive(Parser)]
#[command(name = "reelmeta-importer", about = "CSV reconciliation for the trailer catalog")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import trailers from a VideoDB CSV, keyed by Video ID.
    Catalog {
        /// Path to the VideoDB CSV file.
        csv_file: PathBuf,
        /// Username owning media rows created by this run.
        #[arg(long, default_value = "admin")]
        user: String,
        /// Overwrite catalog fields on trailers that already exist.
        #[arg(long)]
        update: bool,
        /// Preview actions without making changes.
        #[arg(long)]
        dry_run: bool,
    },
    /// Link VideoDB rows to pre-existing media by title matching.
    Link {
        /// Path to the VideoDB CSV file.
        csv_file: PathBuf,
        /// Preview actions without making changes.
        #[arg(long)]
        dry_run: bool,
    },
    /// Apply release dates and descriptions from a supplemental CSV.
    Supplemental {
        /// Path to the supplemental CSV file.
        csv_file: PathBuf,
        /// Preview actions without making changes.
        #[arg(long)]
        dry_run: bool,
        /// After updating, export the table in VideoDB format here.
        #[arg(long)]
        export_videodb: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelmeta_importer=info,reelmeta_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL is not set"))?;
    let pool = reelmeta_db::create_pool(&database_url).await?;

    match cli.command {
        Command::Catalog {
            csv_file,
            user,
            update,
            dry_run,
        } => {
            let report = catalog::run_import(
                &pool,
                &csv_file,
                &ImportOptions {
                    username: user,
                    update_existing: update,
                    dry_run,
                },
            )
            .await?;
            print!("{report}");
        }
        Command::Link { csv_file, dry_run } => {
            let report = catalog::run_link(&pool, &csv_file, dry_run).await?;
            print!("{report}");
        }
        Command::Supplemental {
            csv_file,
            dry_run,
            export_videodb,
        } => {
            let report = supplemental::run_update(&pool, &csv_file, dry_run).await?;
            if let Some(path) = export_videodb {
                if dry_run {
                    tracing::warn!("skipping export in dry-run mode");
                } else {
                    supplemental::export_videodb(&pool, &path).await?;
                }
            }
            print!("{report}");
        }
    }

    Ok(())
}
