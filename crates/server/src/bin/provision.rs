//! Thin CLI wrapper over the same `drydock_api::db` queries and
//! `drydock_core::security` primitives the HTTP admin routes call, so a
//! club/admin row created from an operator's terminal obeys the exact same
//! invariants as one created through the API.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use drydock_api::db::clubs;
use drydock_api::db::users;
use drydock_core::config::CoreConfig;
use drydock_core::security::{self, UpstreamCredentials};
use drydock_scraper::ScrapeExecutor;
use serde_json::json;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "drydock-provision")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a club (tenant). Idempotent on subdomain.
    CreateClub {
        #[arg(long)]
        name: String,
        #[arg(long)]
        subdomain: String,
    },
    /// Create a club-scoped admin user. Idempotent on (club, email).
    CreateAdmin {
        #[arg(long)]
        club_subdomain: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: String,
    },
    /// Set or rotate a club's upstream booking-provider credentials.
    SetCredentials {
        #[arg(long)]
        club_subdomain: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Run a scrape for a club immediately, equivalent to `POST /admin/sync`.
    ForceSync {
        #[arg(long)]
        club_subdomain: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    drydock_shared::bootstrap::init_env();
    let _guard = drydock_shared::bootstrap::init_tracing("provision");

    let cli = Cli::parse();
    let config = CoreConfig::from_env()?;
    let pool = drydock_shared::bootstrap::init_db(&config).await?;

    match cli.command {
        Command::CreateClub { name, subdomain } => {
            let club = clubs::create_club(&pool, &name, &subdomain).await?;
            println!("club {} ({}): {}", club.name, club.subdomain, club.id);
        }
        Command::CreateAdmin { club_subdomain, email, password, full_name } => {
            if password.len() < 8 {
                bail!("password must be at least 8 characters");
            }
            let club = clubs::find_by_subdomain(&pool, &club_subdomain)
                .await?
                .with_context(|| format!("no active club with subdomain '{club_subdomain}'"))?;
            let password_hash = security::hash_password(&password)?;
            let user = users::create_admin(&pool, club.id, &email, &password_hash, &full_name).await?;
            println!("admin {} for club {}: {}", user.email, club.subdomain, user.id);
        }
        Command::SetCredentials { club_subdomain, url, username, password } => {
            let club = clubs::find_by_subdomain(&pool, &club_subdomain)
                .await?
                .with_context(|| format!("no active club with subdomain '{club_subdomain}'"))?;

            let creds = UpstreamCredentials { username, password };
            let encrypted = security::encrypt_credentials(&creds, &config.encryption_key)?;

            let mut data_source_config = club.data_source_config.clone();
            let obj = data_source_config
                .as_object_mut()
                .context("data_source_config is not a JSON object")?;
            obj.insert("url".to_string(), json!(url));
            obj.insert("credentials_encrypted".to_string(), json!(encrypted));

            clubs::update_data_source_config(&pool, club.id, &data_source_config).await?;
            println!("credentials updated for club {}", club.subdomain);
        }
        Command::ForceSync { club_subdomain } => {
            let club = clubs::find_by_subdomain(&pool, &club_subdomain)
                .await?
                .with_context(|| format!("no active club with subdomain '{club_subdomain}'"))?;

            let executor = Arc::new(ScrapeExecutor::new(pool.clone(), config.encryption_key, config.days_ahead, 1));
            let outcome = executor.try_run(club.id).await?;
            println!(
                "sync complete for {}: {} boats, {} bookings in {}ms",
                club.subdomain, outcome.boats_count, outcome.bookings_count, outcome.duration_ms
            );
        }
    }

    Ok(())
}
