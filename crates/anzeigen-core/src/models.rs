//! Caller-facing types of the simplified listing schema
//!
//! Fields the upstream may omit are optional and skipped when serializing,
//! matching the shape callers of the original service receive.

use serde::{Deserialize, Serialize};

/// One search result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<String>,
    pub images: Vec<String>,
}

/// Full ad details
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<String>,
    pub images: Vec<String>,
    pub features: Vec<serde_json::Value>,
    pub seller: Seller,
    pub url: String,
}

/// Seller information attached to an ad
#[derive(Debug, Clone, Serialize)]
pub struct Seller {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A category from the upstream tree.
///
/// Only the name is inspected (for filtering); everything else the
/// upstream sends is passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
