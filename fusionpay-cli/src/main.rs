//! Command-line client for the MoneyFusion payment gateway.
//!
//! # Usage
//!
//! ```bash
//! # Initiate a payment
//! fusionpay pay --api-url "$URL" --amount 200 --article sac=100 --article chaussure=100 \
//!     --client-name "M. Konan" --client-number 0574801791 \
//!     --return-url https://shop.example/callback
//!
//! # Check it
//! fusionpay status 5d58823b084564
//!
//! # Pull the token out of the URL the payer came back on
//! fusionpay callback "https://shop.example/callback?token=5d58823b084564"
//! ```
//!
//! # Environment Variables
//!
//! A `.env` file in the current directory is loaded first.
//!
//! - `FUSIONPAY_API_URL` — Payment initiation URL (required by `pay` only)
//! - `FUSIONPAY_STATUS_URL` — Override the status endpoint base URL
//! - `FUSIONPAY_TIMEOUT_SECS` — Request timeout
//! - `RUST_LOG` — Log level filter (default: `info`), logs go to stderr

mod cli;

use std::io::{self, Write};
use std::time::Duration;

use clap::Parser;
use fusionpay::constants::DEFAULT_STATUS_BASE_URL;
use fusionpay::{FusionPay, token_from_return_url};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, PayArgs};

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();

    // Initialize tracing with RUST_LOG env filter
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded environment file"),
        Err(e) if is_worth_reporting(&e) => {
            tracing::warn!(error = %e, "Ignoring unreadable environment file");
        }
        Err(_) => {}
    }

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!("fusionpay failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let timeout = cli.timeout();
    let Cli {
        api_url,
        status_url,
        command,
        ..
    } = cli;

    match command {
        Command::Pay(args) => {
            let client = payment_client(api_url.as_deref(), status_url.as_deref(), timeout)?;
            let response = apply_pay_args(client, args).make_payment().await?;
            tracing::info!(token = %response.token, statut = response.statut, "Payment initiated");
            write_json(&response)?;
        }
        Command::Status { token } => {
            let client = status_client(api_url.as_deref(), status_url.as_deref(), timeout)?;
            let response = client.check_payment_status(&token).await?;
            tracing::info!(
                token = %token,
                status = %response.data.statut,
                "Payment status retrieved"
            );
            write_json(&response)?;
        }
        Command::Callback { url } => {
            let token = token_from_return_url(&url)?;
            writeln!(io::stdout().lock(), "{token}")?;
        }
    }
    Ok(())
}

/// A missing `.env` is normal; anything else means the file exists but is broken.
fn is_worth_reporting(err: &dotenvy::Error) -> bool {
    !err.not_found()
}

/// Builds the client for `pay`, which needs the payment initiation URL.
fn payment_client(
    api_url: Option<&str>,
    status_url: Option<&str>,
    timeout: Option<Duration>,
) -> Result<FusionPay, Box<dyn std::error::Error>> {
    let api_url = api_url.ok_or("missing --api-url (or FUSIONPAY_API_URL)")?;
    configure(FusionPay::try_from(api_url)?, status_url, timeout)
}

/// Builds the client for `status`. Status checks never touch the API URL,
/// so the status endpoint stands in when none is configured.
fn status_client(
    api_url: Option<&str>,
    status_url: Option<&str>,
    timeout: Option<Duration>,
) -> Result<FusionPay, Box<dyn std::error::Error>> {
    let api_url = api_url.unwrap_or(DEFAULT_STATUS_BASE_URL);
    configure(FusionPay::try_from(api_url)?, status_url, timeout)
}

fn configure(
    mut client: FusionPay,
    status_url: Option<&str>,
    timeout: Option<Duration>,
) -> Result<FusionPay, Box<dyn std::error::Error>> {
    if let Some(url) = status_url {
        client = client.with_status_base_url(url.parse()?);
    }
    if let Some(timeout) = timeout {
        client = client.with_timeout(timeout);
    }
    Ok(client)
}

fn apply_pay_args(mut client: FusionPay, args: PayArgs) -> FusionPay {
    if let Some(amount) = args.amount {
        client = client.total_price(amount);
    }
    for article in args.articles {
        client = client.add_article(article.name, article.price);
    }
    for info in args.infos {
        client = client.add_info(info);
    }
    if let Some(name) = args.client_name {
        client = client.client_name(name);
    }
    if let Some(number) = args.client_number {
        client = client.client_number(number);
    }
    if let Some(url) = args.return_url {
        client = client.return_url(url);
    }
    if let Some(url) = args.webhook_url {
        client = client.webhook_url(url);
    }
    client
}

fn write_json<T: Serialize>(value: &T) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pay_arguments_reach_the_payload() {
        let cli = Cli::try_parse_from([
            "fusionpay",
            "pay",
            "--api-url",
            "https://pay.example/api",
            "--amount",
            "200",
            "--article",
            "sac=100",
            "--article",
            "chaussure=100",
            "--info",
            r#"{"orderId":"A-1"}"#,
            "--client-name",
            "M. Konan",
            "--client-number",
            "0574801791",
            "--return-url",
            "https://shop.example/callback",
            "--webhook-url",
            "https://shop.example/webhook",
        ])
        .unwrap();
        let Command::Pay(args) = cli.command else {
            panic!("expected pay command");
        };

        let client = payment_client(cli.api_url.as_deref(), None, None).unwrap();
        let client = apply_pay_args(client, args);

        assert_eq!(client.api_url().as_str(), "https://pay.example/api");
        assert_eq!(
            serde_json::to_value(client.payment()).unwrap(),
            json!({
                "totalPrice": 200,
                "article": [{ "sac": 100 }, { "chaussure": 100 }],
                "personal_Info": [{ "orderId": "A-1" }],
                "numeroSend": "0574801791",
                "nomclient": "M. Konan",
                "return_url": "https://shop.example/callback",
                "webhook_url": "https://shop.example/webhook"
            })
        );
    }

    #[test]
    fn only_broken_env_files_are_reported() {
        let missing = dotenvy::Error::Io(io::Error::from(io::ErrorKind::NotFound));
        assert!(!is_worth_reporting(&missing));

        let malformed = dotenvy::Error::LineParse("FUSIONPAY_API_URL".to_owned(), 17);
        assert!(is_worth_reporting(&malformed));

        let denied = dotenvy::Error::Io(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(is_worth_reporting(&denied));
    }

    #[test]
    fn pay_requires_api_url() {
        let err = payment_client(None, None, None).unwrap_err();
        assert!(err.to_string().contains("--api-url"));
    }

    #[test]
    fn status_works_without_api_url() {
        let client = status_client(
            None,
            Some("https://status.example/notif/"),
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        assert_eq!(
            client.status_url("tok").unwrap().as_str(),
            "https://status.example/notif/tok"
        );
        assert_eq!(client.timeout(), &Some(Duration::from_secs(5)));

        let client = status_client(None, None, None).unwrap();
        assert_eq!(client.status_base_url().as_str(), DEFAULT_STATUS_BASE_URL);
    }
}
