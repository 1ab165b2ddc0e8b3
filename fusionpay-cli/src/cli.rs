//! Command-line arguments.
//!
//! Every gateway setting can come from the environment (or a `.env` file)
//! instead of a flag:
//!
//! - `FUSIONPAY_API_URL` — payment initiation URL
//! - `FUSIONPAY_STATUS_URL` — status endpoint base URL
//! - `FUSIONPAY_TIMEOUT_SECS` — request timeout in seconds

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use fusionpay::{Article, CustomPaymentData, Decimal};

/// Initiate and check MoneyFusion payments.
#[derive(Debug, Parser)]
#[command(name = "fusionpay", version, about, long_about = None)]
pub struct Cli {
    /// Payment initiation URL.
    #[arg(long, env = "FUSIONPAY_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Base URL of the payment status endpoint.
    #[arg(long, env = "FUSIONPAY_STATUS_URL", global = true)]
    pub status_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "FUSIONPAY_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Returns the configured request timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Initiate a payment and print the gateway response.
    Pay(PayArgs),
    /// Print the state of a payment.
    Status {
        /// Payment token.
        token: String,
    },
    /// Print the payment token carried by a return URL.
    Callback {
        /// Full URL the payer was redirected to.
        url: String,
    },
}

#[derive(Debug, Args)]
pub struct PayArgs {
    /// Total amount to charge.
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Line item as `name=price`. Repeatable.
    #[arg(long = "article", value_parser = parse_article)]
    pub articles: Vec<Article>,

    /// Custom data as a JSON object, returned by the status endpoint. Repeatable.
    #[arg(long = "info", value_parser = parse_info)]
    pub infos: Vec<CustomPaymentData>,

    /// Payer name.
    #[arg(long)]
    pub client_name: Option<String>,

    /// Payer phone number.
    #[arg(long)]
    pub client_number: Option<String>,

    /// Where the payer returns after checkout.
    #[arg(long)]
    pub return_url: Option<String>,

    /// Where the gateway sends payment notifications.
    #[arg(long)]
    pub webhook_url: Option<String>,
}

fn parse_article(raw: &str) -> Result<Article, String> {
    let (name, price) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected `name=price`, got `{raw}`"))?;
    let price = price
        .trim()
        .parse::<Decimal>()
        .map_err(|e| format!("invalid price `{price}`: {e}"))?;
    Ok(Article::new(name.trim(), price))
}

fn parse_info(raw: &str) -> Result<CustomPaymentData, String> {
    serde_json::from_str(raw).map_err(|e| format!("expected a JSON object: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pay_command() {
        let cli = Cli::try_parse_from([
            "fusionpay",
            "--timeout-secs",
            "10",
            "pay",
            "--api-url",
            "https://pay.example/api",
            "--amount",
            "200",
            "--article",
            "sac=100",
            "--article",
            "t-shirt=12.5",
            "--info",
            r#"{"userId":"u1"}"#,
            "--client-number",
            "0574801791",
        ])
        .unwrap();

        assert_eq!(cli.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(cli.api_url.as_deref(), Some("https://pay.example/api"));
        let Command::Pay(args) = cli.command else {
            panic!("expected pay command");
        };
        assert_eq!(args.amount, Some(Decimal::from(200)));
        assert_eq!(
            args.articles,
            vec![
                Article::new("sac", 100),
                Article::new("t-shirt", Decimal::new(125, 1))
            ]
        );
        assert_eq!(args.infos[0]["userId"], "u1");
        assert_eq!(args.client_number.as_deref(), Some("0574801791"));
    }

    #[test]
    fn article_requires_price() {
        assert!(parse_article("sac").is_err());
        assert!(parse_article("sac=cher").is_err());
    }

    #[test]
    fn article_name_may_contain_equals() {
        assert_eq!(parse_article("a=b=3").unwrap(), Article::new("a=b", 3));
    }

    #[test]
    fn info_must_be_object() {
        assert!(parse_info("[1, 2]").is_err());
        assert!(parse_info(r#"{"k": [1, 2]}"#).is_ok());
    }

    #[test]
    fn status_takes_token() {
        let cli = Cli::try_parse_from(["fusionpay", "status", "tok", "--api-url", "https://pay.example/api"])
            .unwrap();
        assert!(matches!(cli.command, Command::Status { token } if token == "tok"));
    }
}
