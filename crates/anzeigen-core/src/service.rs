//! Listing service orchestrating the upstream client

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use anzeigen_upstream::UpstreamClient;

use crate::error::CoreError;
use crate::mapping::{self, CategoriesDocument, RawAd, SearchDocument};
use crate::models::{AdDetail, AdSummary, Category};
use crate::query::SearchParams;

/// Service handling search, ad-detail, and category operations
pub struct ListingService {
    upstream: Arc<UpstreamClient>,
}

impl ListingService {
    /// Create a new listing service
    pub fn new(upstream: Arc<UpstreamClient>) -> Self {
        Self { upstream }
    }

    /// Search ads, applying the default parameters for anything the caller
    /// left out
    pub async fn search(&self, params: &SearchParams) -> Result<Vec<AdSummary>, CoreError> {
        let pairs = params.upstream_pairs();
        debug!("Searching ads with {} query pairs", pairs.len());

        let body = self.upstream.search_ads(&pairs).await?;
        let document: SearchDocument = decode_or_default(body, "search");

        Ok(document
            .embedded
            .ads
            .into_iter()
            .map(AdSummary::from)
            .collect())
    }

    /// Load a single ad
    pub async fn ad_detail(&self, id: &str) -> Result<AdDetail, CoreError> {
        debug!("Loading ad details for id: {}", id);

        let body = self.upstream.ad_detail(id).await?;
        let raw: RawAd = decode_or_default(body, "ad detail");

        Ok(AdDetail::from(raw))
    }

    /// Load the category tree, filtered to the tech categories
    pub async fn categories(&self) -> Result<Vec<Category>, CoreError> {
        let body = self.upstream.categories().await?;
        let document: CategoriesDocument = decode_or_default(body, "categories");

        Ok(mapping::filter_tech_categories(document.embedded.categories))
    }
}

/// Decode an upstream body into a wire document. A payload of the wrong
/// overall shape decodes to the defaulted document instead of failing,
/// matching how missing fields are treated everywhere else.
fn decode_or_default<T: DeserializeOwned + Default>(body: Value, what: &str) -> T {
    match serde_json::from_value(body) {
        Ok(document) => document,
        Err(e) => {
            warn!("Unexpected {} payload shape from upstream: {}", what, e);
            T::default()
        }
    }
}
