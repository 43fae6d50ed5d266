use anyhow::Result;
use clap::Args;

use super::print_json;
use crate::infrastructure::client::ReadlogClient;

#[derive(Debug, Args)]
pub struct DashboardCommand {
    /// Year to summarise; defaults to the most recent year with reading activity
    #[arg(long)]
    pub year: Option<i32>,
}

pub async fn run(client: &ReadlogClient, command: DashboardCommand) -> Result<()> {
    let snapshot = client.dashboard().get(command.year).await?;
    print_json(&snapshot)
}
