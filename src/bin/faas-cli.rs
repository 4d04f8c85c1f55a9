use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "faas-cli")]
#[command(about = "Admin CLI for the FaaS controller", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:2381")]
    url: String,

    #[arg(short, long, env = "FAAS_ADMIN_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check controller process status
    Status,
    /// Show status of every live object, or of one
    Objects { name: Option<String> },
    /// List registered object kinds
    Kinds,
    /// Print the default spec of a kind (kind, name or alias)
    DefaultSpec { kind: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let path = match &cli.command {
        Commands::Status => "/admin/status".to_string(),
        Commands::Objects { name: None } => "/admin/objects".to_string(),
        Commands::Objects { name: Some(name) } => format!("/admin/objects/{}", name),
        Commands::Kinds => "/admin/kinds".to_string(),
        Commands::DefaultSpec { kind } => format!("/admin/kinds/{}/default-spec", kind),
    };

    let res = client
        .get(format!("{}{}", cli.url.trim_end_matches('/'), path))
        .headers(headers)
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            if !text.is_empty() {
                eprintln!("Response: {}", text);
            }
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
