//! Command line tool that prints pickup schedules from the `ReCollect` API.

use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use recollect_client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, PickupClient};
use recollect_core::PickupEvent;
use reqwest::Client;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List upcoming pickup events.
    Events {
        #[command(flatten)]
        target: Target,
        /// First day to include (needs --before).
        #[arg(long, requires = "before")]
        after: Option<NaiveDate>,
        /// Last day to include (needs --after).
        #[arg(long, requires = "after")]
        before: Option<NaiveDate>,
    },
    /// Show the next pickup event.
    Next {
        #[command(flatten)]
        target: Target,
        /// Reference date instead of today.
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[derive(Args)]
struct Target {
    /// `ReCollect` place ID.
    place_id: String,
    /// `ReCollect` service ID.
    service_id: String,
    /// API host.
    #[arg(long, default_value = DEFAULT_BASE_URL, hide = true)]
    base_url: String,
}

impl Target {
    fn client(&self, session: Client) -> PickupClient {
        PickupClient::new(self.place_id.as_str(), self.service_id.as_str(), Some(session))
            .with_base_url(&self.base_url)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let session = Client::builder()
        .user_agent(concat!("recollect/", env!("CARGO_PKG_VERSION")))
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .context("failed to build HTTP client")?;

    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Events {
            target,
            after,
            before,
        } => {
            let client = target.client(session);
            let events = client
                .get_pickup_events(after, before)
                .await
                .context("failed to fetch pickup events")?;
            tracing::info!(count = events.len(), "Pickup events loaded");

            for event in &events {
                writeln!(stdout, "{}", format_event(event))?;
            }
        }
        Command::Next { target, today } => {
            let client = target.client(session);
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let event = client
                .get_next_pickup_event_from(today)
                .await
                .context("failed to fetch next pickup event")?;

            writeln!(stdout, "{}", format_event(&event))?;
        }
    }

    Ok(())
}

fn format_event(event: &PickupEvent) -> String {
    let types = event
        .pickup_types
        .iter()
        .map(|pickup_type| pickup_type.label())
        .collect::<Vec<_>>()
        .join(", ");

    match &event.area_name {
        Some(area) => format!("{}  {types}  ({area})", event.date),
        None => format!("{}  {types}", event.date),
    }
}
