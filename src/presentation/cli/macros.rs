/// Generates an `Args` struct taking `--id` and a handler that fetches the
/// entity through the named client accessor and prints it as JSON.
macro_rules! define_get_command {
    ($command:ident, $handler:ident, $id:ty, $accessor:ident) => {
        #[derive(Debug, clap::Args)]
        pub struct $command {
            #[arg(long)]
            pub id: i64,
        }

        pub async fn $handler(
            client: &crate::infrastructure::client::ReadlogClient,
            command: $command,
        ) -> anyhow::Result<()> {
            let entity = client.$accessor().get(<$id>::new(command.id)).await?;
            super::print_json(&entity)
        }
    };
}

/// Generates an `Args` struct taking `--id` and a handler that deletes the
/// entity and reports it on stderr.
macro_rules! define_delete_command {
    ($command:ident, $handler:ident, $id:ty, $accessor:ident, $label:literal) => {
        #[derive(Debug, clap::Args)]
        pub struct $command {
            #[arg(long)]
            pub id: i64,
        }

        pub async fn $handler(
            client: &crate::infrastructure::client::ReadlogClient,
            command: $command,
        ) -> anyhow::Result<()> {
            client.$accessor().delete(<$id>::new(command.id)).await?;
            eprintln!(concat!("Deleted ", $label, " {}"), command.id);
            Ok(())
        }
    };
}

pub(crate) use {define_delete_command, define_get_command};
