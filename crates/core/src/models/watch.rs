//! Catalog listings, filters and purchases.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::types::timestamp;
use crate::{PaymentMethod, PurchaseId, PurchaseStatus, StoreId, UserId, WatchCondition, WatchId};

/// A watch listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watch {
    pub id: WatchId,
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub condition: Option<WatchCondition>,
    /// Asking price in BRL. Older rows only carry `price_brl`.
    #[serde(default, alias = "price_brl")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub crypto_price: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub store_id: Option<StoreId>,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub current_owner_user_id: Option<UserId>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_sold: bool,
    #[serde(default)]
    pub is_favorite: Option<bool>,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,

    // Tokenization
    #[serde(default)]
    pub nft_token_id: Option<String>,
    #[serde(default)]
    pub stellar_asset_code: Option<String>,
    #[serde(default)]
    pub escrow_account: Option<String>,
}

/// Body of `POST /watches` (store dashboard "add product").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewWatch {
    pub brand: String,
    pub model: String,
    pub reference: String,
    pub serial_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub condition: WatchCondition,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

/// Marketplace search filters.
///
/// Field names follow the storefront's filter panel. The API spells some of
/// them differently; the client translates names when it builds the query
/// string, so this type stays in the caller's vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchFilter {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub category: Option<String>,
    pub condition: Option<WatchCondition>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl WatchFilter {
    /// Set filters as `(name, value)` pairs in declaration order.
    ///
    /// Unset fields are left out entirely.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        fn push<T: ToString>(
            out: &mut Vec<(&'static str, String)>,
            name: &'static str,
            value: Option<&T>,
        ) {
            if let Some(value) = value {
                out.push((name, value.to_string()));
            }
        }

        let mut out = Vec::new();
        push(&mut out, "brand", self.brand.as_ref());
        push(&mut out, "model", self.model.as_ref());
        push(&mut out, "category", self.category.as_ref());
        push(&mut out, "condition", self.condition.as_ref());
        push(&mut out, "price_min", self.price_min.as_ref());
        push(&mut out, "price_max", self.price_max.as_ref());
        push(&mut out, "year_from", self.year_from.as_ref());
        push(&mut out, "year_to", self.year_to.as_ref());
        push(&mut out, "search", self.search.as_ref());
        push(&mut out, "sort_by", self.sort_by.as_ref());
        push(&mut out, "skip", self.skip.as_ref());
        push(&mut out, "limit", self.limit.as_ref());
        out
    }

    /// True when no filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// How the buyer pays at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMethod {
    Pix,
    CreditCard,
}

/// Body of `POST /watches/{id}/purchase`.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseRequest {
    pub payment_method: CheckoutMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installments: Option<u8>,
    #[serde(flatten)]
    pub card: Option<CardDetails>,
    /// Buyer's CPF (`000.000.000-00`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
}

impl PurchaseRequest {
    /// A single-installment PIX purchase.
    #[must_use]
    pub const fn pix() -> Self {
        Self {
            payment_method: CheckoutMethod::Pix,
            installments: None,
            card: None,
            cpf: None,
        }
    }
}

/// Credit card fields, flattened into [`PurchaseRequest`].
#[derive(Debug, Clone, Serialize)]
pub struct CardDetails {
    #[serde(rename = "card_number", serialize_with = "super::expose_secret")]
    pub number: SecretString,
    #[serde(rename = "card_name")]
    pub holder_name: String,
    /// `MM/YY`.
    #[serde(rename = "card_expiry")]
    pub expiry: String,
    #[serde(rename = "card_cvv", serialize_with = "super::expose_optional_secret")]
    pub cvv: Option<SecretString>,
}

/// A completed or pending purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    #[serde(default)]
    pub buyer_user_id: Option<UserId>,
    pub watch_id: WatchId,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub stellar_transaction_id: Option<String>,
    #[serde(default)]
    pub escrow_account: Option<String>,
    #[serde(default)]
    pub status: PurchaseStatus,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Result of `POST /watches/{id}/favorite`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteToggle {
    pub is_favorite: bool,
    #[serde(default)]
    pub message: Option<String>,
}
