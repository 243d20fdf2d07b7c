use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "hook-cli")]
#[command(about = "Send test webhooks to a webhook gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status and registered providers
    Status,
    /// Post a payload file to a provider route
    Send {
        /// Provider input type
        input_type: String,
        /// File holding the JSON payload
        file: PathBuf,
        /// Send as a `payload=` form instead of raw JSON
        #[arg(long)]
        form: bool,
        /// Comma-separated output adapter names
        #[arg(short, long)]
        adapters: Option<String>,
        /// Ad-hoc destination URL
        #[arg(long)]
        output_url: Option<String>,
        /// Token passed through to the destinations
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/status", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Send {
            input_type,
            file,
            form,
            adapters,
            output_url,
            token,
        } => {
            let payload = std::fs::read_to_string(&file)?;

            let mut query = Vec::new();
            if let Some(adapters) = adapters {
                query.push(("adapters", adapters));
            }
            if let Some(output_url) = output_url {
                query.push(("url", output_url));
            }
            if let Some(token) = token {
                query.push(("token", token));
            }

            let request = client
                .post(format!("{}/webhook/{}", cli.url, input_type))
                .query(&query);
            let request = if form {
                let body = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("payload", &payload)
                    .finish();
                request
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .body(body)
            } else {
                request.header("Content-Type", "application/json").body(payload)
            };

            print_response(request.send().await?).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
    }

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
