//! Search query parameters and their upstream defaults

use serde::{Deserialize, Serialize};

pub const DEFAULT_QUERY: &str = "technik";
pub const DEFAULT_LOCATION: &str = "Berlin";
pub const DEFAULT_DISTANCE: &str = "50";
/// Elektronik
pub const DEFAULT_CATEGORY_ID: &str = "161";
pub const DEFAULT_SORT: &str = "CREATION_DATE_DESC";
pub const DEFAULT_LIMIT: &str = "20";

/// Caller-provided search parameters.
///
/// All fields are optional; defaults are applied only when building the
/// upstream query, so the echo in the response reflects what the caller
/// actually sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_min: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_max: Option<String>,
}

impl SearchParams {
    /// Build the upstream query pairs, filling in defaults for absent
    /// parameters. `priceMin`/`priceMax` are omitted entirely when the
    /// caller did not provide them.
    pub fn upstream_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = [
            ("q", self.q.as_deref().unwrap_or(DEFAULT_QUERY)),
            (
                "locationName",
                self.location_name.as_deref().unwrap_or(DEFAULT_LOCATION),
            ),
            ("distance", self.distance.as_deref().unwrap_or(DEFAULT_DISTANCE)),
            (
                "categoryId",
                self.category_id.as_deref().unwrap_or(DEFAULT_CATEGORY_ID),
            ),
            ("sortBy", self.sort_by.as_deref().unwrap_or(DEFAULT_SORT)),
            ("limit", self.limit.as_deref().unwrap_or(DEFAULT_LIMIT)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        if let Some(min) = &self.price_min {
            pairs.push(("priceMin".to_string(), min.clone()));
        }
        if let Some(max) = &self.price_max {
            pairs.push(("priceMax".to_string(), max.clone()));
        }

        pairs
    }
}
