//! pawlog: command-line front end for the cat-care client.
//!
//! Composes the facade once from the environment, routes reads through the
//! query cache and keeps the signed-in session in a local JSON file.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pawlog_core::{
    connect, ApiError, CatPatch, ClientConfig, FileSessionStore, NewEnrichmentActivity,
    NewHealthLog, QueryClient, Session, SignupRequest, UserPatch,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pawlog", version, about = "Track cat health logs and enrichment")]
struct Cli {
    /// Session file (defaults to <data dir>/pawlog/session.json)
    #[arg(long, global = true, value_name = "PATH")]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session
    Login { email: String, password: String },
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long = "confirm")]
        password_confirmation: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user from the stored session
    Whoami,
    User { id: u64 },
    UpdateUser {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    Cat { id: u64 },
    UpdateCat {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        birth_date: Option<NaiveDate>,
        #[arg(long)]
        breed: Option<String>,
        /// Replaces the whole list; repeat for several traits
        #[arg(long)]
        temperament: Vec<String>,
        #[arg(long)]
        profile_picture: Option<String>,
    },
    HealthLogs { cat_id: u64 },
    AddHealthLog {
        cat_id: u64,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        litter_box: String,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        energy: u8,
        #[arg(long)]
        skin: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    Activities { cat_id: u64 },
    AddActivity {
        cat_id: u64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        last_tried: Option<NaiveDate>,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: Option<u8>,
    },
    Suggestions { cat_id: u64 },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<ApiError>() {
        Some(api) => match serde_json::to_string(&api.to_body()) {
            Ok(body) => eprintln!("{body}"),
            Err(_) => eprintln!("error: {api}"),
        },
        None => eprintln!("error: {err:#}"),
    }
}

fn default_session_path() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("pawlog").join("session.json"))
        .ok_or_else(|| anyhow!("no data directory on this platform; pass --session"))
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = ClientConfig::from_env()?;
    let session_path = match cli.session {
        Some(path) => path,
        None => default_session_path()?,
    };
    let store = FileSessionStore::new(session_path);
    let session = Session::load(&store)?;
    tracing::debug!(signed_in = session.is_some(), "session loaded");

    let facade = connect(&config, session.as_ref().map(|s| s.token.as_str()))?;
    let query = QueryClient::new(facade);

    match cli.command {
        Command::Login { email, password } => {
            let auth = query.facade().login(&email, &password).await?;
            let session = Session::from(auth);
            session.save(&store)?;
            print(&session.user)
        }
        Command::Signup {
            name,
            email,
            password,
            password_confirmation,
        } => {
            let input = SignupRequest {
                name,
                email,
                password,
                password_confirmation,
            };
            let session = Session::from(query.facade().signup(&input).await?);
            session.save(&store)?;
            print(&session.user)
        }
        Command::Logout => {
            Session::clear(&store)?;
            query.clear();
            Ok(())
        }
        Command::Whoami => {
            let session = session.context("not logged in")?;
            print(&session.user)
        }
        Command::User { id } => print(&query.user(id).await?),
        Command::UpdateUser { id, name, email } => {
            let patch = UserPatch {
                name,
                email,
                password: None,
            };
            print(&query.update_user(id, &patch).await?)
        }
        Command::Cat { id } => print(&query.cat(id).await?),
        Command::UpdateCat {
            id,
            name,
            birth_date,
            breed,
            temperament,
            profile_picture,
        } => {
            let patch = CatPatch {
                name,
                birth_date,
                breed,
                temperament: (!temperament.is_empty()).then_some(temperament),
                profile_picture,
            };
            print(&query.update_cat(id, &patch).await?)
        }
        Command::HealthLogs { cat_id } => print(&query.health_logs(cat_id).await?),
        Command::AddHealthLog {
            cat_id,
            date,
            litter_box,
            energy,
            skin,
            notes,
        } => {
            let log = NewHealthLog {
                date: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
                litter_box_habits: litter_box,
                energy_level: energy,
                skin_condition: skin,
                notes,
            };
            print(&query.add_health_log(cat_id, &log).await?)
        }
        Command::Activities { cat_id } => print(&query.enrichment_activities(cat_id).await?),
        Command::AddActivity {
            cat_id,
            name,
            description,
            last_tried,
            rating,
        } => {
            let activity = NewEnrichmentActivity {
                name,
                description,
                last_tried,
                enjoyment_rating: rating,
            };
            print(&query.add_enrichment_activity(cat_id, &activity).await?)
        }
        Command::Suggestions { cat_id } => print(&query.enrichment_suggestions(cat_id).await?),
    }
}
