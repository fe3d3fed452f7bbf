//! LuxTime CLI - Marketplace client on the command line.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the token is kept in LUXTIME_STORAGE_PATH)
//! luxtime login -e ana@luxtime.com.br -p secret
//!
//! # Who am I?
//! luxtime whoami
//!
//! # Browse the marketplace
//! luxtime watches list --brand Rolex --price-min 20000 --price-max 80000
//!
//! # Admin dashboard counters
//! luxtime admin stats
//! ```
//!
//! # Commands
//!
//! - `login` / `register` / `logout` / `whoami` / `balance` - Session
//! - `watches` - Browse, list, and buy watches
//! - `favorites` - Local favorites, optionally pushed to the server
//! - `notifications` - Inbox
//! - `admin` - Admin dashboard actions

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use luxtime_client::ClientConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "luxtime")]
#[command(author, version, about = "LuxTime marketplace CLI")]
struct Cli {
    /// API base URL (overrides `LUXTIME_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<Url>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session token
    Login(commands::auth::LoginArgs),
    /// Create an account and sign in to it
    Register(commands::auth::RegisterArgs),
    /// Forget the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Show wallet balances
    Balance,
    /// Browse and trade watches
    Watches {
        #[command(subcommand)]
        action: commands::watches::WatchAction,
    },
    /// Manage favorite listings
    Favorites {
        #[command(subcommand)]
        action: commands::favorites::FavoriteAction,
    },
    /// Read and manage notifications
    Notifications {
        #[command(subcommand)]
        action: commands::notifications::NotificationAction,
    },
    /// Admin dashboard actions
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
}

/// Initialize Sentry error tracking if `SENTRY_DSN` is set.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|dsn| !dsn.is_empty())?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the tracing subscriber. Logs go to stderr so stdout stays JSON.
fn init_tracing(with_sentry: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "luxtime_cli=info,luxtime_client=info".into());

    let json = std::env::var("LUXTIME_LOG_FORMAT").is_ok_and(|format| format == "json");
    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(with_sentry.then(|| sentry_tracing::layer().event_filter(sentry_event_filter)))
        .init();
}

#[tokio::main]
async fn main() {
    // Sentry must be initialized before the subscriber
    let sentry_guard = init_sentry();
    init_tracing(sentry_guard.is_some());

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    let ctx = Context::new(config)?;

    match cli.command {
        Commands::Login(args) => commands::auth::login(&ctx, args).await?,
        Commands::Register(args) => commands::auth::register(&ctx, args).await?,
        Commands::Logout => commands::auth::logout(&ctx)?,
        Commands::Whoami => commands::auth::whoami(&ctx).await?,
        Commands::Balance => commands::auth::balance(&ctx).await?,
        Commands::Watches { action } => commands::watches::run(&ctx, action).await?,
        Commands::Favorites { action } => commands::favorites::run(&ctx, action).await?,
        Commands::Notifications { action } => commands::notifications::run(&ctx, action).await?,
        Commands::Admin { action } => commands::admin::run(&ctx, action).await?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;
    use luxtime_core::{PurchaseRequest, WatchFilter};

    use super::*;
    use commands::watches::WatchAction;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_watch_list_args_become_filter() {
        let cli = Cli::try_parse_from([
            "luxtime", "watches", "list", "--brand", "Rolex", "--price-min", "100", "--price-max",
            "200",
        ])
        .unwrap();

        let Commands::Watches {
            action: WatchAction::List(args),
        } = cli.command
        else {
            panic!("expected watches list");
        };
        let filter = WatchFilter::from(args);
        assert_eq!(filter.brand.as_deref(), Some("Rolex"));
        assert_eq!(filter.price_min.unwrap().to_string(), "100");
        assert_eq!(filter.price_max.unwrap().to_string(), "200");
    }

    #[test]
    fn test_card_purchase_requires_card_fields() {
        let cli = Cli::try_parse_from([
            "luxtime", "watches", "buy", "7", "--method", "credit-card", "--card-name", "ANA",
        ])
        .unwrap();

        let Commands::Watches {
            action: WatchAction::Buy(args),
        } = cli.command
        else {
            panic!("expected watches buy");
        };
        assert!(PurchaseRequest::try_from(args).is_err());
    }

    #[test]
    fn test_status_flags_are_exclusive() {
        assert!(Cli::try_parse_from(["luxtime", "admin", "user-status", "3"]).is_err());
        assert!(
            Cli::try_parse_from(["luxtime", "admin", "user-status", "3", "--active", "--inactive"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["luxtime", "admin", "user-status", "3", "--inactive"]).is_ok());
    }

    #[test]
    fn test_store_rejection_takes_reason() {
        let cli = Cli::try_parse_from([
            "luxtime",
            "admin",
            "store-status",
            "4",
            "rejected",
            "--reason",
            "Missing paperwork",
        ])
        .unwrap();

        let Commands::Admin {
            action: commands::admin::AdminAction::StoreStatus { status, reason, .. },
        } = cli.command
        else {
            panic!("expected admin store-status");
        };
        assert_eq!(status, luxtime_core::StoreStatus::Rejected);
        assert_eq!(reason.as_deref(), Some("Missing paperwork"));
    }

    #[test]
    fn test_rejects_invalid_email() {
        assert!(Cli::try_parse_from(["luxtime", "login", "-e", "nope", "-p", "x"]).is_err());
    }
}
