//! Session commands.
//!
//! # Usage
//!
//! ```bash
//! luxtime login -e ana@luxtime.com.br -p secret
//! luxtime register -n "Ana Lima" -e ana@luxtime.com.br -p secret -r store
//! luxtime whoami
//! luxtime balance
//! luxtime logout
//! ```
//!
//! # Environment Variables
//!
//! - `LUXTIME_PASSWORD` - Password for `login`/`register` when `-p` is omitted

use clap::Args;
use luxtime_core::{Email, LoginCredentials, NewUser, UserRole};
use secrecy::SecretString;

use super::{CommandError, Context, print_json};

#[derive(Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(short, long)]
    email: Email,

    /// Account password
    #[arg(short, long, env = "LUXTIME_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args)]
pub struct RegisterArgs {
    /// Full name
    #[arg(short = 'n', long)]
    full_name: String,

    /// Account email
    #[arg(short, long)]
    email: Email,

    /// Account password
    #[arg(short, long, env = "LUXTIME_PASSWORD", hide_env_values = true)]
    password: String,

    /// Account role (`user`, `store`, `evaluator`, `admin`)
    #[arg(short, long, default_value = "user")]
    role: UserRole,
}

pub async fn login(ctx: &Context, args: LoginArgs) -> Result<(), CommandError> {
    let credentials = LoginCredentials::new(args.email, SecretString::from(args.password));
    let user = ctx.session.login(&credentials).await?;
    tracing::info!("Signed in as {} ({})", user.email, user.role);
    print_json(&user)
}

pub async fn register(ctx: &Context, args: RegisterArgs) -> Result<(), CommandError> {
    let full_name = args.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(CommandError::InvalidArgument("full name is empty".to_string()));
    }

    let new_user = NewUser {
        full_name,
        email: args.email,
        password: SecretString::from(args.password),
        role: args.role,
    };
    let user = ctx.session.register(&new_user).await?;
    tracing::info!("Account created, signed in as {}", user.email);
    print_json(&user)
}

pub fn logout(ctx: &Context) -> Result<(), CommandError> {
    ctx.session.logout();
    print_json(&serde_json::json!({ "logged_out": true }))
}

pub async fn whoami(ctx: &Context) -> Result<(), CommandError> {
    let user = ctx.require_user().await?;
    print_json(&user)
}

pub async fn balance(ctx: &Context) -> Result<(), CommandError> {
    ctx.require_user().await?;
    let balance = ctx.api.balance().await?;
    print_json(&balance)
}
