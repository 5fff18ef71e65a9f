//! Devshelf CLI - a personal shelf of developer odds and ends.

use clap::Parser;
use devshelf::cli::{Cli, Commands};
use devshelf::client::ApiClient;
use devshelf::commands::{self, CommandResult, ListOptions};
use devshelf::config;
use devshelf::logging;
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    if let Err(e) = run(cli).await {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), devshelf::Error> {
    let settings = config::resolve(&cli.config_overrides())?;
    logging::init(settings.log_format.value);
    if let Some(path) = &settings.config_file {
        tracing::debug!(path = %path.display(), "loaded config file");
    }

    let client = ApiClient::new(settings.server_url.value.as_str());
    let human = cli.human_readable;

    match cli.command {
        Commands::Serve { .. } => commands::serve(&settings).await,
        Commands::List {
            entity,
            search,
            sort,
            desc,
            category,
        } => {
            let options = ListOptions {
                search,
                sort,
                descending: desc,
                category,
            };
            let result = commands::list(&client, entity, options).await?;
            output(result.as_ref(), human);
            Ok(())
        }
        Commands::Show { entity, id } => {
            let result = commands::show(&client, entity, &id).await?;
            output(result.as_ref(), human);
            Ok(())
        }
        Commands::Add { entity } => {
            let result = commands::save_entity(&client, None, entity).await?;
            output(result.as_ref(), human);
            Ok(())
        }
        Commands::Edit { id, entity } => {
            let result = commands::save_entity(&client, Some(&id), entity).await?;
            output(result.as_ref(), human);
            Ok(())
        }
        Commands::Rm { entity, id } => {
            let result = commands::remove(&client, entity, &id).await?;
            output(&result, human);
            Ok(())
        }
        Commands::Stats => {
            let result = commands::stats(&client).await?;
            output(&result, human);
            Ok(())
        }
    }
}

fn output(result: &dyn CommandResult, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
