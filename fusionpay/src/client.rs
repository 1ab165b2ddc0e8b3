//! The [`FusionPay`] payment builder and gateway client.
//!
//! A [`FusionPay`] value accumulates a [`PaymentRequest`] through chainable
//! builder methods, then talks to the gateway with two calls:
//!
//! - [`FusionPay::make_payment`] — `POST` the payload to the configured API URL
//! - [`FusionPay::check_payment_status`] — `GET` the status endpoint for a token
//!
//! ## Error Handling
//!
//! Failures are surfaced as [`FusionPayError`] without retrying:
//! - URL construction
//! - HTTP transport failures
//! - JSON deserialization errors
//! - Non-2xx responses, with the raw response body

use std::fmt::Display;
use std::time::Duration;

use http::HeaderMap;
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{Span, instrument};

use crate::constants::DEFAULT_STATUS_BASE_URL;
use crate::error::FusionPayError;
use crate::types::{
    Article, CustomPaymentData, PaymentRequest, PaymentResponse, PaymentVerificationResponse,
};

/// Payment builder and client for the MoneyFusion gateway.
///
/// `T` is the type of the custom records attached with [`FusionPay::add_info`]
/// and returned in [`PaymentVerificationData::personal_info`](crate::PaymentVerificationData::personal_info).
/// It defaults to a free-form JSON object.
///
/// # Example
///
/// ```rust,no_run
/// use fusionpay::FusionPay;
/// use serde_json::json;
///
/// # async fn run() -> Result<(), fusionpay::FusionPayError> {
/// let response = FusionPay::try_from("https://www.pay.moneyfusion.net/api/v1/abc/pay")?
///     .total_price(200)
///     .add_article("sac", 100)
///     .add_article("chaussure", 100)
///     .add_info(json!({ "userId": "1245d858sf8f95f9ff" }).as_object().cloned().unwrap_or_default())
///     .client_name("M. Konan")
///     .client_number("0574801791")
///     .return_url("https://shop.example/callback")
///     .make_payment()
///     .await?;
/// println!("redirect the payer to {}", response.url);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct FusionPay<T = CustomPaymentData> {
    /// Full URL of the payment initiation endpoint
    api_url: Url,
    /// Base URL the payment token is appended to for status checks
    status_base_url: Url,
    /// Shared Reqwest HTTP client
    client: Client,
    /// Optional custom headers sent with each request
    headers: HeaderMap,
    /// Optional request timeout
    timeout: Option<Duration>,
    /// Payload accumulated by the builder methods
    payment: PaymentRequest<T>,
}

impl<T> FusionPay<T> {
    /// Constructs a new [`FusionPay`] targeting the given payment initiation URL.
    ///
    /// The status endpoint defaults to [`DEFAULT_STATUS_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`FusionPayError::UrlParse`] if the default status URL cannot be parsed.
    pub fn try_new(api_url: Url) -> Result<Self, FusionPayError> {
        let status_base_url =
            Url::parse(DEFAULT_STATUS_BASE_URL).map_err(|e| FusionPayError::UrlParse {
                context: "Failed to parse default status URL",
                source: e,
            })?;
        Ok(Self {
            api_url,
            status_base_url,
            client: Client::new(),
            headers: HeaderMap::new(),
            timeout: None,
            payment: PaymentRequest::default(),
        })
    }

    /// Returns the payment initiation URL.
    pub const fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Returns the base URL used for status checks.
    pub const fn status_base_url(&self) -> &Url {
        &self.status_base_url
    }

    /// Returns any custom headers configured on the client.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the configured timeout, if any.
    pub const fn timeout(&self) -> &Option<Duration> {
        &self.timeout
    }

    /// Returns the payload built so far.
    pub const fn payment(&self) -> &PaymentRequest<T> {
        &self.payment
    }

    /// Attaches custom headers to all future requests.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets a timeout for all future requests.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Uses the given Reqwest client instead of a default one.
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Overrides the base URL of the status endpoint.
    #[must_use]
    pub fn with_status_base_url(mut self, url: Url) -> Self {
        self.status_base_url = url;
        self
    }

    /// Sets the total price. A later call replaces the earlier value.
    #[must_use]
    pub fn total_price(mut self, amount: impl Into<Decimal>) -> Self {
        self.payment.total_price = Some(amount.into());
        self
    }

    /// Appends a line item `{ name: value }`. Repeated names are kept as separate entries.
    #[must_use]
    pub fn add_article(mut self, name: impl Into<String>, value: impl Into<Decimal>) -> Self {
        self.payment.article.push(Article::new(name, value));
        self
    }

    /// Appends a custom record that the status endpoint returns with the payment.
    #[must_use]
    pub fn add_info(mut self, data: T) -> Self {
        self.payment.personal_info.push(data);
        self
    }

    /// Sets the payer name.
    #[must_use]
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.payment.nom_client = Some(name.into());
        self
    }

    /// Sets the payer phone number.
    #[must_use]
    pub fn client_number(mut self, number: impl Into<String>) -> Self {
        self.payment.numero_send = Some(number.into());
        self
    }

    /// Sets the URL the payer returns to; the gateway appends the payment token as `?token=`.
    #[must_use]
    pub fn return_url(mut self, url: impl Into<String>) -> Self {
        self.payment.return_url = Some(url.into());
        self
    }

    /// Sets the URL the gateway notifies on payment events.
    #[must_use]
    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.payment.webhook_url = Some(url.into());
        self
    }

    /// Builds the status URL for `token`, appending it as one percent-encoded path segment.
    ///
    /// # Errors
    ///
    /// Returns [`FusionPayError::EmptyToken`] for an empty token,
    /// [`FusionPayError::InvalidToken`] for `.` and `..` (dot segments are
    /// dropped by URL normalization), and [`FusionPayError::UrlParse`] if the
    /// status base URL cannot carry a path.
    pub fn status_url(&self, token: &str) -> Result<Url, FusionPayError> {
        match token {
            "" => return Err(FusionPayError::EmptyToken),
            "." | ".." => {
                return Err(FusionPayError::InvalidToken {
                    token: token.to_owned(),
                });
            }
            _ => {}
        }
        let mut url = self.status_base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FusionPayError::UrlParse {
                context: "Status base URL cannot be a base",
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .pop_if_empty()
            .push(token);
        Ok(url)
    }

    /// Applies custom headers and timeout to a request.
    ///
    /// Custom headers replace any header of the same name already on the
    /// request, including the `Content-Type` set for JSON bodies.
    fn prepare(&self, mut req: RequestBuilder) -> RequestBuilder {
        if !self.headers.is_empty() {
            req = req.headers(self.headers.clone());
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        req
    }
}

impl<T: Serialize> FusionPay<T> {
    /// Prepares the `POST` carrying the built payload.
    fn payment_request(&self) -> RequestBuilder {
        self.prepare(self.client.post(self.api_url.clone()).json(&self.payment))
    }

    /// Sends the built payload to the payment initiation endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`FusionPayError`] if the request fails, the gateway answers
    /// with a non-2xx status, or the response is not a [`PaymentResponse`].
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "fusionpay.make_payment",
            skip_all,
            fields(
                api_url = %self.api_url,
                timeout = ?self.timeout,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    pub async fn make_payment(&self) -> Result<PaymentResponse, FusionPayError> {
        let result = send_json(self.payment_request(), "POST payment").await;
        record_result_on_span(&result);
        result
    }
}

impl<T: DeserializeOwned> FusionPay<T> {
    /// Fetches the state of the payment identified by `token`.
    ///
    /// # Errors
    ///
    /// Returns [`FusionPayError::EmptyToken`] without sending anything if the
    /// token is empty; otherwise the same failures as [`FusionPay::make_payment`].
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "fusionpay.check_payment_status",
            skip_all,
            fields(
                token = %token,
                timeout = ?self.timeout,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    pub async fn check_payment_status(
        &self,
        token: &str,
    ) -> Result<PaymentVerificationResponse<T>, FusionPayError> {
        let result = match self.status_url(token) {
            Ok(url) => send_json(self.prepare(self.client.get(url)), "GET payment status").await,
            Err(e) => Err(e),
        };
        record_result_on_span(&result);
        result
    }
}

/// Sends a prepared request and decodes a 2xx JSON body, mapping every failure to [`FusionPayError`].
///
/// `context` is a human-readable identifier used in tracing and error messages (e.g. `"POST payment"`).
async fn send_json<R>(req: RequestBuilder, context: &'static str) -> Result<R, FusionPayError>
where
    R: DeserializeOwned,
{
    let http_response = req
        .send()
        .await
        .map_err(|e| FusionPayError::Http { context, source: e })?;

    let status = http_response.status();
    #[cfg(feature = "telemetry")]
    tracing::debug!(%status, context, "Gateway responded");

    if status.is_success() {
        http_response
            .json::<R>()
            .await
            .map_err(|e| FusionPayError::JsonDeserialization { context, source: e })
    } else {
        let body = http_response
            .text()
            .await
            .map_err(|e| FusionPayError::ResponseBodyRead { context, source: e })?;
        Err(FusionPayError::HttpStatus {
            context,
            status,
            body,
        })
    }
}

/// Parses a string URL and calls [`FusionPay::try_new`].
impl<T> TryFrom<&str> for FusionPay<T> {
    type Error = FusionPayError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let url = Url::parse(value).map_err(|e| FusionPayError::UrlParse {
            context: "Failed to parse API url",
            source: e,
        })?;
        Self::try_new(url)
    }
}

impl<T> TryFrom<String> for FusionPay<T> {
    type Error = FusionPayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

/// Records the outcome of a request on the current span, including status and errors.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to payment gateway failed");
        }
    }
}

/// Records the outcome of a request on the current span.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}
