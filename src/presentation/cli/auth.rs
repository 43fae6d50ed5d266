use anyhow::Result;
use clap::Args;

use super::print_json;
use crate::domain::sessions::Credentials;
use crate::infrastructure::client::{ReadlogClient, TOKEN_ENV};

#[derive(Debug, Args)]
pub struct LoginCommand {
    #[arg(long)]
    pub username: String,
    #[arg(long, env = "READLOG_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Log in and print the session token. Export it as `READLOG_TOKEN` for
/// later commands.
pub async fn login(client: &ReadlogClient, command: LoginCommand) -> Result<()> {
    let credentials = Credentials {
        username: command.username,
        password: command.password,
    };
    let response = client.auth().login(&credentials).await?;
    eprintln!("Logged in as {}. Set {TOKEN_ENV} to the token below.", response.user.username);
    print_json(&response)
}
