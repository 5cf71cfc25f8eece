use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Smoke-test CLI for the image relay gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check relay health
    Health,
    /// Generate an image from a text prompt
    Generate {
        prompt: String,
        #[arg(short, long, default_value_t = 1)]
        count: u32,
    },
    /// Forward a GET to an arbitrary upstream endpoint
    Proxy { endpoint: String },
    /// Download a remote image through the relay
    FetchImage {
        image_url: String,
        #[arg(short, long, default_value = "generated-image.png")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Generate { prompt, count } => {
            let res = client
                .post(format!("{}/api/im-gen", cli.url))
                .json(&json!({ "prompt": prompt, "number_of_images": count }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Proxy { endpoint } => {
            let res = client
                .get(format!("{}/api/proxy", cli.url))
                .query(&[("endpoint", endpoint)])
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::FetchImage { image_url, output } => {
            let res = client
                .get(format!("{}/api/proxy-image", cli.url))
                .query(&[("url", image_url)])
                .send()
                .await?;

            let status = res.status();
            if status.is_success() {
                let bytes = res.bytes().await?;
                std::fs::write(&output, &bytes)?;
                println!("Saved {} bytes to {}", bytes.len(), output.display());
            } else {
                println!("Status: {}", status);
                print_response(res).await?;
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    println!("Status: {}", status);
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{}", text),
    }

    Ok(())
}
