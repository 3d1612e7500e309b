//! Mapping boundary between upstream payloads and the simplified schema
//!
//! Every wire field is optional or defaulted, so a payload missing fields
//! maps to the fallback values instead of failing. The upstream embeds its
//! resources HAL-style under `_embedded` and `_links`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::{AdDetail, AdSummary, Category, Seller};

/// Price shown when the upstream has none
pub const PRICE_ON_REQUEST: &str = "Preis auf Anfrage";
/// Seller name shown when the upstream has none
pub const UNKNOWN_SELLER: &str = "Unbekannt";
/// Public-site URL fallback
const URL_FALLBACK: &str = "#";

/// Keywords a category name must contain (case-insensitive) to be kept
pub const CATEGORY_KEYWORDS: [&str; 4] = ["elektronik", "computer", "handy", "technik"];

// ==================== Wire types ====================

/// Top-level search response
#[derive(Debug, Default, Deserialize)]
pub struct SearchDocument {
    #[serde(default, rename = "_embedded")]
    pub embedded: SearchEmbedded,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchEmbedded {
    #[serde(default)]
    pub ads: Vec<RawAd>,
}

/// Top-level categories response
#[derive(Debug, Default, Deserialize)]
pub struct CategoriesDocument {
    #[serde(default, rename = "_embedded")]
    pub embedded: CategoriesEmbedded,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoriesEmbedded {
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// One ad as the upstream sends it; also the shape of the ad-detail
/// response body.
#[derive(Debug, Default, Deserialize)]
pub struct RawAd {
    #[serde(default, deserialize_with = "id_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<RawPrice>,
    #[serde(default)]
    pub location: Option<RawLocation>,
    #[serde(default, rename = "postedDate")]
    pub posted_date: Option<String>,
    #[serde(default)]
    pub pictures: Vec<RawPicture>,
    #[serde(default)]
    pub features: Vec<Value>,
    #[serde(default)]
    pub seller: Option<RawSeller>,
    #[serde(default, rename = "_links")]
    pub links: Option<RawLinks>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPrice {
    #[serde(default)]
    pub display: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawLocation {
    #[serde(default)]
    pub display: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawSeller {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawLinks {
    #[serde(default, rename = "self")]
    pub self_link: Option<RawHref>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawHref {
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPicture {
    #[serde(default, rename = "_links")]
    pub links: Option<RawPictureLinks>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPictureLinks {
    #[serde(default)]
    pub large: Option<RawHref>,
}

/// Upstream ad ids arrive as either a JSON string or a number
fn id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

// ==================== Mapping ====================

/// Rewrite the upstream API self-link into the public listing URL
fn public_url(links: &Option<RawLinks>) -> String {
    links
        .as_ref()
        .and_then(|l| l.self_link.as_ref())
        .and_then(|s| s.href.as_deref())
        .map(|href| href.replace("/api/", "/s-anzeige/"))
        .unwrap_or_else(|| URL_FALLBACK.to_string())
}

fn image_urls(pictures: &[RawPicture]) -> Vec<String> {
    pictures
        .iter()
        .filter_map(|p| p.links.as_ref()?.large.as_ref()?.href.clone())
        .collect()
}

fn price_display(price: Option<RawPrice>) -> String {
    price
        .and_then(|p| p.display)
        .unwrap_or_else(|| PRICE_ON_REQUEST.to_string())
}

impl From<RawAd> for AdSummary {
    fn from(ad: RawAd) -> Self {
        let url = public_url(&ad.links);
        let images = image_urls(&ad.pictures);
        AdSummary {
            id: ad.id,
            title: ad.title,
            price: price_display(ad.price),
            location: ad.location.and_then(|l| l.display),
            url,
            posted_date: ad.posted_date,
            images,
        }
    }
}

impl From<RawAd> for AdDetail {
    fn from(ad: RawAd) -> Self {
        let url = public_url(&ad.links);
        let images = image_urls(&ad.pictures);
        let seller = ad.seller.unwrap_or_default();
        AdDetail {
            id: ad.id,
            title: ad.title,
            description: ad.description,
            price: price_display(ad.price),
            location: ad.location.and_then(|l| l.display),
            posted_date: ad.posted_date,
            images,
            features: ad.features,
            seller: Seller {
                name: seller.name.unwrap_or_else(|| UNKNOWN_SELLER.to_string()),
                kind: seller.kind,
            },
            url,
        }
    }
}

/// Keep only categories whose name contains one of the tech keywords
pub fn filter_tech_categories(categories: Vec<Category>) -> Vec<Category> {
    categories
        .into_iter()
        .filter(|category| {
            let name = category.name.to_lowercase();
            CATEGORY_KEYWORDS.iter().any(|keyword| name.contains(keyword))
        })
        .collect()
}
