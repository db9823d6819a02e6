mod request;

use pogodata::{Config, PogoData};

use clap::{Parser, Subcommand};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

use std::path::PathBuf;

/// Queries reconciled Pokémon GO game data.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Path of the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Runs a single query
    Get {
        /// One of `pokemon`, `types`, `moves` or `weather`
        endpoint: String,
        /// Criteria as `key=value` pairs
        criteria: Vec<String>,
        /// Additional criteria as a JSON object
        #[arg(long)]
        body: Option<String>,
    },
    /// Reads queries from standard input, one per line
    Shell,
}

#[tokio::main]
async fn main() -> Result<(), anywho::Error> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).await?;
    let data = PogoData::load(config).await?;

    match cli.command {
        Command::Get {
            endpoint,
            criteria,
            body,
        } => {
            let database = data.database().await;
            let response = request::respond(
                &database,
                &endpoint,
                criteria.iter().map(String::as_str),
                body.as_deref(),
            );

            print(&response).await
        }
        Command::Shell => shell(&data).await,
    }
}

async fn shell(data: &PogoData) -> Result<(), anywho::Error> {
    let mut lines = BufReader::new(io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let mut words = line.split_whitespace();

        let Some(command) = words.next() else {
            continue;
        };

        let response = match command {
            "quit" | "exit" => break,
            "reload" => match data.reload().await {
                Ok(()) => serde_json::json!({ "reloaded": true }),
                Err(error) => request::failure(error),
            },
            endpoint => request::respond(&data.database().await, endpoint, words, None),
        };

        print(&response).await?;
    }

    Ok(())
}

async fn print(response: &serde_json::Value) -> Result<(), anywho::Error> {
    let mut stdout = io::stdout();
    let mut output = serde_json::to_string_pretty(response)?;
    output.push('\n');

    stdout.write_all(output.as_bytes()).await?;
    stdout.flush().await?;

    Ok(())
}
