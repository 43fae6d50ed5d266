pub mod auth;
pub mod books;
pub mod dashboard;
mod macros;

use std::net::SocketAddr;

use auth::LoginCommand;
use books::BookCommands;
use clap::{Args, Parser, Subcommand};
use dashboard::DashboardCommand;

#[derive(Debug, Parser)]
#[command(author, version, about = "Log the books you read and see how your year is going", long_about = None)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "READLOG_URL",
        default_value = "http://localhost:3000"
    )]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Log in and print a session token for the other commands
    Login(LoginCommand),

    /// Manage logged books
    Book {
        #[command(subcommand)]
        command: BookCommands,
    },

    /// Show the reading dashboard for a year
    Dashboard(DashboardCommand),
}

#[derive(Debug, Args)]
pub struct ServeCommand {
    #[arg(
        long,
        env = "READLOG_DATABASE_URL",
        default_value = "sqlite://readlog.db"
    )]
    pub database_url: String,

    #[arg(long, env = "READLOG_BIND_ADDRESS", default_value = "127.0.0.1:3000")]
    pub bind_address: SocketAddr,

    /// Drop the `Secure` cookie flag for plain-HTTP development setups
    #[arg(long, env = "READLOG_INSECURE_COOKIES")]
    pub insecure_cookies: bool,

    #[arg(
        long,
        env = "READLOG_COVER_LOOKUP_URL",
        default_value = "https://openlibrary.org"
    )]
    pub cover_lookup_url: String,

    /// Where verification emails are POSTed; unset logs the code instead
    #[arg(long, env = "READLOG_MAIL_WEBHOOK_URL")]
    pub mail_webhook_url: Option<String>,

    #[arg(long, env = "READLOG_VERIFICATION_TTL_SECS", default_value_t = 900)]
    pub verification_ttl_secs: u64,

    #[arg(long, env = "READLOG_SESSION_TTL_HOURS", default_value_t = 720)]
    pub session_ttl_hours: i64,
}

pub(crate) fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
