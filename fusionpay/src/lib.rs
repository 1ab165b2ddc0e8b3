#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Client for the [MoneyFusion](https://www.moneyfusion.net) payment gateway.
//!
//! A payment is described with the chainable builder methods of [`FusionPay`],
//! submitted with [`FusionPay::make_payment`], and later checked with
//! [`FusionPay::check_payment_status`] using the token the gateway returned
//! (or the one it appended to the `return_url`, see [`token_from_return_url`]).
//!
//! The client is a thin layer over the gateway's JSON contract: it neither
//! validates the payload nor retries failed calls. HTTP failures surface as
//! [`FusionPayError`] with the gateway's response body attached.
//!
//! # Modules
//!
//! - [`client`] - The [`FusionPay`] builder and its two gateway calls
//! - [`types`] - Request and response wire types
//! - [`callback`] - Return-URL token extraction
//! - [`constants`] - Gateway URLs and parameter names
//! - [`error`] - Error type
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation of the gateway calls

pub mod callback;
pub mod client;
pub mod constants;
pub mod error;
pub mod types;

pub use callback::token_from_return_url;
pub use client::FusionPay;
pub use error::FusionPayError;
pub use rust_decimal::Decimal;
pub use types::{
    Article, CustomPaymentData, PaymentRequest, PaymentResponse, PaymentStatus,
    PaymentVerificationData, PaymentVerificationResponse,
};
