use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use duewatch_core::{Amount, BillSummary, DashboardSnapshot, DateWindow, billing_window};
use duewatch_ingest::{MailClient, MailError, Pipeline, SpendReport};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod credential;
mod export;
mod gmail;
mod oauth;
mod render;
mod state;

use config::Config;
use gmail::GmailClient;

#[derive(Parser, Debug)]
#[command(
    name = "duewatch",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("DUEWATCH_BUILD_SHA"), ")"),
    about = "Credit card dues and UPI spend, read from Gmail"
)]
struct Cli {
    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage ~/.duewatch/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Gmail authorization
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Latest statement per card: amount and due date
    Bills,

    /// UPI spend per day for the current billing window
    Spend {
        /// Also write the per-day totals as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Dues versus what is left of a bank balance after UPI spend
    Dashboard {
        /// Current bank balance in rupees, e.g. 50000 or 50,000.00
        #[arg(long, value_parser = parse_balance)]
        balance: Amount,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Store the Google OAuth client (Desktop app) used for Gmail
    Connect,
    /// Authorize read-only Gmail access and store the token
    Login,
    /// Show which Gmail account the stored token belongs to
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(mail) = err.downcast_ref::<MailError>()
                && mail.is_auth()
            {
                eprintln!("{mail}");
                eprintln!("Run: duewatch auth login");
                return ExitCode::from(2);
            }
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },

        Command::Auth { command } => match command {
            AuthCommand::Connect => oauth::connect_interactive()?,
            AuthCommand::Login => oauth::login_interactive(&reqwest::Client::new()).await?,
            AuthCommand::Status => auth_status().await?,
        },

        Command::Bills => {
            let cfg = config::load_config()?;
            let gmail = connect_gmail(&cfg).await?;
            let bills = fetch_bills(&cfg, &gmail).await?;
            print!("{}", render::bills_table(&bills));
        }

        Command::Spend { csv } => {
            let cfg = config::load_config()?;
            let gmail = connect_gmail(&cfg).await?;

            let bills = fetch_bills(&cfg, &gmail).await?;
            let window = billing_window(cfg.today()?, bills.due_dates());
            let report = fetch_spend(&cfg, &gmail, window.window).await?;
            print!("{}", render::spend_table(&window, &report.summary));

            if let Some(p) = csv {
                export::export_spend_csv(&p, &report.summary)?;
                println!("Wrote {}", p.display());
            }
        }

        Command::Dashboard { balance } => {
            let cfg = config::load_config()?;
            let gmail = connect_gmail(&cfg).await?;

            let profile = gmail.get_profile().await?;
            let bills = fetch_bills(&cfg, &gmail).await?;
            if bills.is_empty() {
                println!("Gmail account in use: {}", profile.email_address);
                println!("{}", render::NO_BILLS);
                return Ok(());
            }

            let window = billing_window(cfg.today()?, bills.due_dates());
            let report = fetch_spend(&cfg, &gmail, window.window).await?;

            let snapshot = DashboardSnapshot::build(balance, &bills, &report.summary);
            print!("{}", render::dashboard(&profile.email_address, &snapshot));
            println!();
            print!("{}", render::bills_table(&bills));
            println!();
            print!("{}", render::spend_table(&window, &report.summary));
        }
    }
    Ok(())
}

async fn auth_status() -> Result<()> {
    let cfg = config::load_config()?;
    let gmail = connect_gmail(&cfg).await?;
    let profile = gmail.get_profile().await?;
    println!("Gmail account in use: {}", profile.email_address);
    if let Some(total) = profile.messages_total {
        println!("Messages in mailbox: {total}");
    }
    match gmail.credential().expires_at {
        Some(exp) => println!("Access token valid until: {exp}"),
        None => println!("Access token has no recorded expiry"),
    }
    Ok(())
}

/// Gmail client holding a usable credential; refreshed tokens are saved back.
async fn connect_gmail(cfg: &Config) -> Result<GmailClient> {
    let http = reqwest::Client::new();
    let credential = credential::authorized_credential(&http).await?;
    Ok(GmailClient::new(http, &cfg.gmail, credential).persist_refreshes_to(state::credential_path()?))
}

async fn fetch_bills<C: MailClient>(cfg: &Config, client: &C) -> Result<BillSummary> {
    let pipeline = Pipeline::new(client, cfg.decoder());
    let report = pipeline.bills(&cfg.bill_plan()).await?;
    info!(
        listed = report.listed,
        kept = report.summary.len(),
        unclassified = report.unclassified,
        incomplete = report.incomplete,
        failed = report.failed,
        "statements scanned"
    );
    Ok(report.summary)
}

async fn fetch_spend<C: MailClient>(
    cfg: &Config,
    client: &C,
    window: DateWindow,
) -> Result<SpendReport> {
    let pipeline = Pipeline::new(client, cfg.decoder());
    let report = pipeline.spend(&cfg.spend_plan(window)).await?;
    info!(
        listed = report.listed,
        counted = report.stats.counted,
        excluded = report.stats.excluded,
        incomplete = report.stats.incomplete,
        outside_window = report.stats.outside_window,
        failed = report.failed,
        "upi alerts scanned"
    );
    Ok(report)
}

/// Accepts whole rupees or rupees with two decimals, commas allowed.
fn parse_balance(raw: &str) -> std::result::Result<Amount, String> {
    let raw = raw.trim();
    let normalized = if raw.contains('.') {
        raw.to_string()
    } else {
        format!("{raw}.00")
    };
    Amount::parse(&normalized).ok_or_else(|| format!("'{raw}' is not an amount like 50000 or 50,000.00"))
}
