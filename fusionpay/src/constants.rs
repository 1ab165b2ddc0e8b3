//! Fixed values of the MoneyFusion gateway contract.

/// Base URL of the payment status endpoint. The payment token is appended
/// as the final path segment.
pub const DEFAULT_STATUS_BASE_URL: &str = "https://www.pay.moneyfusion.net/paiementNotif/";

/// Query parameter the gateway appends to the `return_url` when it
/// redirects the payer back to the merchant.
pub const RETURN_URL_TOKEN_PARAM: &str = "token";
