//! Helpers for the payer's return trip from the checkout page.
//!
//! After checkout the gateway redirects the payer to the merchant's
//! `return_url`, appending `?token=<payment token>`. The token is what
//! [`FusionPay::check_payment_status`](crate::FusionPay::check_payment_status) expects.

use url::Url;

use crate::constants::RETURN_URL_TOKEN_PARAM;
use crate::error::FusionPayError;

/// Extracts the payment token from a full return URL.
///
/// # Errors
///
/// Returns [`FusionPayError::UrlParse`] if `url` is not an absolute URL and
/// [`FusionPayError::MissingToken`] if it has no non-empty `token` parameter.
///
/// # Example
///
/// ```rust
/// use fusionpay::token_from_return_url;
///
/// let token = token_from_return_url("https://shop.example/callback?token=5d58823b084564").unwrap();
/// assert_eq!(token, "5d58823b084564");
/// ```
pub fn token_from_return_url(url: &str) -> Result<String, FusionPayError> {
    let url = Url::parse(url).map_err(|e| FusionPayError::UrlParse {
        context: "Failed to parse return url",
        source: e,
    })?;
    url.query_pairs()
        .find(|(key, value)| key == RETURN_URL_TOKEN_PARAM && !value.is_empty())
        .map(|(_, value)| value.into_owned())
        .ok_or(FusionPayError::MissingToken)
}
