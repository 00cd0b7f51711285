//! # Filter layer
//!
//! Translates raw `<field>__<lookup>` query parameters into typed predicates.
//! Each filter only knows the lookups it declares; `gt`/`lt` are strict.
//! Adapters either evaluate [`ProductFilter::matches`] in memory or compile the
//! same fields into SQL.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, Result};
use crate::models::{News, Product};

/// Raw query string pairs as received by the HTTP layer.
pub type QueryParams = HashMap<String, String>;

/// Predicates over [`Product`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub name_icontains: Option<String>,
    pub quantity_gt: Option<i32>,
    pub price_lt: Option<f64>,
    pub price_gt: Option<f64>,
}

impl ProductFilter {
    pub fn from_params(params: &QueryParams) -> Result<Self> {
        Ok(Self {
            name_icontains: text(params, "name__icontains"),
            quantity_gt: number(params, "quantity__gt")?,
            price_lt: finite(params, "price__lt")?,
            price_gt: finite(params, "price__gt")?,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(needle) = &self.name_icontains {
            if !icontains(&product.name, needle) {
                return false;
            }
        }
        if let Some(min) = self.quantity_gt {
            if product.quantity <= min {
                return false;
            }
        }
        if let Some(max) = self.price_lt {
            if product.price >= max {
                return false;
            }
        }
        if let Some(min) = self.price_gt {
            if product.price <= min {
                return false;
            }
        }
        true
    }
}

/// Predicates over [`News`]. `author_icontains` is matched against the
/// author's username, so callers supply it alongside the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsFilter {
    pub name_icontains: Option<String>,
    pub author_icontains: Option<String>,
    pub date_published_gt: Option<DateTime<Utc>>,
}

impl NewsFilter {
    pub fn from_params(params: &QueryParams) -> Result<Self> {
        let date_published_gt = match text(params, "date_published__gt") {
            Some(raw) => Some(parse_instant(&raw).ok_or_else(|| {
                DomainError::validation(format!(
                    "`date_published__gt` must be an RFC 3339 timestamp or YYYY-MM-DD, got `{raw}`"
                ))
            })?),
            None => None,
        };

        Ok(Self {
            name_icontains: text(params, "name__icontains"),
            author_icontains: text(params, "author__icontains"),
            date_published_gt,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, news: &News, author_username: &str) -> bool {
        if let Some(needle) = &self.name_icontains {
            if !icontains(&news.name, needle) {
                return false;
            }
        }
        if let Some(needle) = &self.author_icontains {
            if !icontains(author_username, needle) {
                return false;
            }
        }
        if let Some(after) = self.date_published_gt {
            if news.date_published <= after {
                return false;
            }
        }
        true
    }
}

/// Case-insensitive substring containment.
pub fn icontains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn text(params: &QueryParams, key: &str) -> Option<String> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn number<T: FromStr>(params: &QueryParams, key: &str) -> Result<Option<T>> {
    match text(params, key) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| DomainError::validation(format!("`{key}` must be a number, got `{raw}`"))),
        None => Ok(None),
    }
}

/// Like [`number`], but also rejects `NaN` and infinities, which `f64` parsing accepts.
fn finite(params: &QueryParams, key: &str) -> Result<Option<f64>> {
    match number::<f64>(params, key)? {
        Some(v) if !v.is_finite() => Err(DomainError::validation(format!(
            "`{key}` must be a finite number, got `{v}`"
        ))),
        other => Ok(other),
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
