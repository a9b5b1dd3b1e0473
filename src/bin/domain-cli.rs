use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "domain-cli")]
#[command(about = "Management CLI for the domain router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, default_value = "admin-secret-key")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check registry status
    Status,
    /// List every domain record
    List,
    /// Show one domain record
    Show { id: String },
    /// Register a new domain
    Create {
        id: String,
        hostname: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        scheme: Option<String>,
        #[arg(long)]
        weight: Option<i32>,
        #[arg(long)]
        default: bool,
        #[arg(long)]
        disabled: bool,
        #[arg(long)]
        redirect: Option<u16>,
        #[arg(long)]
        canonical: Option<String>,
    },
    /// Write a single property (hostname, name, scheme, weight, status, is_default, redirect, canonical)
    Set { id: String, field: String, value: String },
    /// Delete a domain record
    Delete { id: String },
    /// Make a domain the default
    Default { id: String },
    /// Enable a domain
    Enable { id: String },
    /// Disable a domain
    Disable { id: String },
    /// Probe a domain's base path and print the status code
    Response { id: String },
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

    let base = format!("{}/admin", cli.url.trim_end_matches('/'));
    let (method, path, body) = match cli.command {
        Commands::Status => (Method::GET, "/status".to_string(), None),
        Commands::List => (Method::GET, "/domains".to_string(), None),
        Commands::Show { id } => (Method::GET, format!("/domains/{}", id), None),
        Commands::Create {
            id,
            hostname,
            name,
            scheme,
            weight,
            default,
            disabled,
            redirect,
            canonical,
        } => {
            let mut body = json!({ "id": id, "hostname": hostname });
            if let Some(name) = name {
                body["name"] = json!(name);
            }
            if let Some(scheme) = scheme {
                body["scheme"] = json!(scheme);
            }
            if let Some(weight) = weight {
                body["weight"] = json!(weight);
            }
            if default {
                body["is_default"] = json!(true);
            }
            if disabled {
                body["status"] = json!(false);
            }
            if let Some(redirect) = redirect {
                body["redirect"] = json!(redirect);
            }
            if let Some(canonical) = canonical {
                body["canonical"] = json!(canonical);
            }
            (Method::POST, "/domains".to_string(), Some(body))
        }
        Commands::Set { id, field, value } => (
            Method::PUT,
            format!("/domains/{}/property", id),
            Some(json!({ "field": field, "value": value })),
        ),
        Commands::Delete { id } => (Method::DELETE, format!("/domains/{}", id), None),
        Commands::Default { id } => (Method::POST, format!("/domains/{}/default", id), None),
        Commands::Enable { id } => (Method::POST, format!("/domains/{}/enable", id), None),
        Commands::Disable { id } => (Method::POST, format!("/domains/{}/disable", id), None),
        Commands::Response { id } => (Method::GET, format!("/domains/{}/response", id), None),
    };

    let mut request = client.request(method, format!("{}{}", base, path)).headers(headers);
    if let Some(body) = body {
        request = request.json(&body);
    }
    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if status == reqwest::StatusCode::NO_CONTENT {
        return Ok(());
    }
    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
