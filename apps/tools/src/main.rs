use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use server_api::session::{mint_session_token, SessionConfig};
use shared::{domain::MANAGER_GROUP, seed::SiteSeed};
use storage::{SeedReport, Storage};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/site.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert content records from a TOML document.
    Seed { file: PathBuf },
    /// Insert a small complete site for local development.
    SeedDemo,
    CreateUser { username: String },
    GrantManager { username: String },
    RevokeManager { username: String },
    /// Print a session token to send as the `session` cookie or a bearer token.
    IssueSession {
        username: String,
        #[arg(long, default_value = "devsecret")]
        secret: String,
        #[arg(long, default_value_t = 86_400)]
        ttl_seconds: i64,
    },
    /// Print unprocessed leads.
    ListLeads,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::Seed { file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let seed: SiteSeed = toml::from_str(&raw)
                .with_context(|| format!("failed to parse {}", file.display()))?;
            print_report(&storage.apply_seed(&seed).await?);
        }
        Command::SeedDemo => {
            print_report(&storage.apply_seed(&SiteSeed::demo()).await?);
        }
        Command::CreateUser { username } => {
            let user_id = storage.create_user(&username).await?;
            println!("created user_id={}", user_id.0);
        }
        Command::GrantManager { username } => {
            let user_id = existing_user(&storage, &username).await?;
            storage.add_user_to_group(user_id, MANAGER_GROUP).await?;
            println!("granted {MANAGER_GROUP} to user_id={}", user_id.0);
        }
        Command::RevokeManager { username } => {
            let user_id = existing_user(&storage, &username).await?;
            storage.remove_user_from_group(user_id, MANAGER_GROUP).await?;
            println!("revoked {MANAGER_GROUP} from user_id={}", user_id.0);
        }
        Command::IssueSession {
            username,
            secret,
            ttl_seconds,
        } => {
            let user_id = existing_user(&storage, &username).await?;
            let token = mint_session_token(
                &SessionConfig {
                    secret,
                    ttl_seconds,
                },
                user_id,
            )?;
            println!("{token}");
        }
        Command::ListLeads => {
            for lead in storage.list_unprocessed_appointments().await? {
                let a = &lead.details;
                println!(
                    "appointment id={} date={} name={} email={} child={} age={}",
                    lead.id.0, lead.date, a.name, a.email, a.child_name, a.child_age
                );
            }
            for lead in storage.list_unprocessed_contact_requests().await? {
                let c = &lead.details;
                println!(
                    "contact_us id={} date={} name={} email={} subject={}",
                    lead.id.0, lead.date, c.name, c.email, c.subject
                );
            }
            for lead in storage.list_unprocessed_subscriptions().await? {
                println!(
                    "subscription id={} date={} email={}",
                    lead.id.0, lead.date, lead.details.email
                );
            }
        }
    }

    Ok(())
}

async fn existing_user(storage: &Storage, username: &str) -> Result<shared::domain::UserId> {
    storage
        .user_id_for_username(username)
        .await?
        .with_context(|| format!("no user named '{username}'; run create-user first"))
}

fn print_report(report: &SeedReport) {
    println!(
        "seeded team={} slides={} testimonials={} classes={} gallery={} singletons={}",
        report.team,
        report.slides,
        report.testimonials,
        report.classes,
        report.gallery,
        report.singletons
    );
}
