//! Wire format types for the MoneyFusion gateway.
//!
//! Field names follow the gateway's JSON contract verbatim (`nomclient`,
//! `personal_Info`, `Montant`, ...), so every field carries an explicit
//! `#[serde(rename)]`.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::{self, SerializeMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Free-form data attached to a payment and returned on verification.
pub type CustomPaymentData = Map<String, Value>;

/// A single line item, serialized as a one-entry object `{ "<name>": <price> }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Item label, used as the JSON key.
    pub name: String,
    /// Item price.
    pub price: Decimal,
}

impl Article {
    /// Creates a new line item.
    #[must_use]
    pub fn new(name: impl Into<String>, price: impl Into<Decimal>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
        }
    }
}

impl Serialize for Article {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &Amount(&self.price))?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Article {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ArticleVisitor;

        impl<'de> Visitor<'de> for ArticleVisitor {
            type Value = Article;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object with exactly one `name: price` entry")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Article, A::Error> {
                let (name, price) = map
                    .next_entry::<String, Decimal>()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                if map.next_key::<de::IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(2, &self));
                }
                Ok(Article { name, price })
            }
        }

        deserializer.deserialize_map(ArticleVisitor)
    }
}

/// Serializes an amount as a plain JSON number: integral amounts as
/// integers (`200`), fractional ones as floats (`12.5`).
struct Amount<'a>(&'a Decimal);

impl Serialize for Amount<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract().is_zero() {
            if let Some(int) = self.0.to_i64() {
                return serializer.serialize_i64(int);
            }
        }
        let float = self
            .0
            .to_f64()
            .ok_or_else(|| ser::Error::custom(format!("amount {} is out of range", self.0)))?;
        serializer.serialize_f64(float)
    }
}

fn serialize_amount<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    Amount(amount).serialize(serializer)
}

#[allow(clippy::ref_option)] // signature imposed by `serialize_with`
fn serialize_opt_amount<S: Serializer>(
    amount: &Option<Decimal>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match amount {
        Some(amount) => Amount(amount).serialize(serializer),
        None => serializer.serialize_none(),
    }
}

/// Body of the payment initiation request.
///
/// Built incrementally through the [`FusionPay`](crate::FusionPay) builder
/// methods. Unset optional fields are omitted from the JSON body; the two
/// lists are always sent, possibly empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest<T = CustomPaymentData> {
    /// Total amount to charge.
    #[serde(
        rename = "totalPrice",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_amount"
    )]
    pub total_price: Option<Decimal>,

    /// Line items, in insertion order.
    #[serde(rename = "article", default)]
    pub article: Vec<Article>,

    /// Custom data echoed back by the status endpoint.
    #[serde(rename = "personal_Info", default = "Vec::new")]
    pub personal_info: Vec<T>,

    /// Payer phone number.
    #[serde(rename = "numeroSend", default, skip_serializing_if = "Option::is_none")]
    pub numero_send: Option<String>,

    /// Payer name.
    #[serde(rename = "nomclient", default, skip_serializing_if = "Option::is_none")]
    pub nom_client: Option<String>,

    /// Where the payer is redirected after checkout; the gateway appends `?token=...`.
    #[serde(rename = "return_url", default, skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,

    /// Where the gateway posts payment notifications.
    #[serde(rename = "webhook_url", default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl<T> Default for PaymentRequest<T> {
    fn default() -> Self {
        Self {
            total_price: None,
            article: Vec::new(),
            personal_info: Vec::new(),
            numero_send: None,
            nom_client: None,
            return_url: None,
            webhook_url: None,
        }
    }
}

/// Response of the payment initiation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResponse {
    /// Whether the gateway accepted the payment.
    pub statut: bool,
    /// Payment token, used later with the status endpoint.
    pub token: String,
    /// Gateway message.
    pub message: String,
    /// Checkout URL to send the payer to.
    pub url: String,
}

/// Settlement state of a payment as reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting payer action.
    Pending,
    /// Funds received.
    Paid,
    /// Payment failed or was cancelled.
    Failed,
    /// A state this client does not know about.
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// Returns `true` if the payment completed.
    #[must_use]
    pub const fn is_paid(self) -> bool {
        matches!(self, Self::Paid)
    }

    /// Returns `true` if the payment is still awaiting the payer.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns `true` if the payment failed.
    #[must_use]
    pub const fn is_failed(self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        })
    }
}

/// Payment record returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentVerificationData<T = CustomPaymentData> {
    /// Gateway-side record identifier.
    #[serde(rename = "_id")]
    pub id: String,

    /// Payment token.
    #[serde(rename = "tokenPay")]
    pub token_pay: String,

    /// Payer phone number.
    #[serde(rename = "numeroSend")]
    pub numero_send: String,

    /// Payer name.
    #[serde(rename = "nomclient")]
    pub nom_client: String,

    /// Custom data submitted with the payment.
    #[serde(rename = "personal_Info", default = "Vec::new")]
    pub personal_info: Vec<T>,

    /// Operator transaction reference.
    #[serde(rename = "numeroTransaction", default)]
    pub numero_transaction: String,

    /// Amount paid.
    #[serde(rename = "Montant", serialize_with = "serialize_amount")]
    pub montant: Decimal,

    /// Fees charged by the gateway.
    #[serde(rename = "frais", serialize_with = "serialize_amount")]
    pub frais: Decimal,

    /// Settlement state.
    #[serde(rename = "statut")]
    pub statut: PaymentStatus,

    /// Payment method (operator) used.
    #[serde(rename = "moyen", default)]
    pub moyen: String,

    /// Return URL submitted with the payment.
    #[serde(rename = "return_url", default)]
    pub return_url: String,

    /// Creation timestamp, as sent by the gateway.
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Response of the payment status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentVerificationResponse<T = CustomPaymentData> {
    /// Whether the lookup succeeded. Says nothing about settlement; see [`PaymentVerificationData::statut`].
    pub statut: bool,
    /// The payment record.
    pub data: PaymentVerificationData<T>,
    /// Gateway message.
    pub message: String,
}

impl<T> PaymentVerificationResponse<T> {
    /// Returns `true` if the lookup succeeded and the payment is paid.
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        self.statut && self.data.statut.is_paid()
    }
}
