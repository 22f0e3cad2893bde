use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "liftlog-cli")]
#[command(about = "Command-line client for the LiftLog API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server liveness
    Health,
    /// Exchange an identity assertion for a token pair
    Login {
        #[arg(long)]
        assertion: String,
        #[arg(long)]
        device_id: Option<String>,
    },
    /// Rotate a refresh token
    Refresh {
        #[arg(long)]
        token: String,
    },
    /// Revoke a refresh token
    Logout {
        #[arg(long)]
        access_token: String,
        #[arg(long)]
        refresh_token: String,
    },
    /// Send an authenticated request to any API path
    Request {
        method: String,
        path: String,
        #[arg(long)]
        access_token: String,
        /// JSON request body
        #[arg(long)]
        body: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Login {
            assertion,
            device_id,
        } => {
            let res = client
                .post(format!("{}/auth/login", base))
                .json(&json!({ "assertion": assertion, "device_id": device_id }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Refresh { token } => {
            let res = client
                .post(format!("{}/auth/refresh", base))
                .json(&json!({ "refresh_token": token }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Logout {
            access_token,
            refresh_token,
        } => {
            let res = client
                .post(format!("{}/logout", base))
                .headers(bearer(&access_token)?)
                .json(&json!({ "refresh_token": refresh_token }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Request {
            method,
            path,
            access_token,
            body,
        } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let path = path.trim_start_matches('/');
            let mut req = client
                .request(method, format!("{}/{}", base, path))
                .headers(bearer(&access_token)?);
            if let Some(body) = body {
                let body: Value = serde_json::from_str(&body)?;
                req = req.json(&body);
            }
            print_response(req.send().await?).await?;
        }
    }

    Ok(())
}

fn bearer(token: &str) -> Result<HeaderMap, Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
    Ok(headers)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
    }
    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
