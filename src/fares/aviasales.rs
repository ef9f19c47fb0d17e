// src/fares/aviasales.rs
//! Aviasales (Travelpayouts) Data API v3 client.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{FareQuery, FareSource, SpecialQuery};
use crate::calendar::weekday_name;
use crate::error::FetchError;
use crate::offer::{FareOffer, OfferKind};

pub const DEFAULT_BASE_URL: &str = "https://api.travelpayouts.com";

const PRICES_FOR_DATES: &str = "prices_for_dates";
const SPECIAL_OFFERS: &str = "get_special_offers";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct ApiOffer {
    origin_airport: Option<String>,
    destination_airport: Option<String>,
    departure_at: Option<String>,
    // numbers, sometimes numeric strings
    price: Option<Value>,
    duration: Option<Value>,
    // string in most answers, occasionally a bare number
    flight_number: Option<Value>,
    airline: Option<String>,
    link: Option<String>,
    signature: Option<String>,
}

fn number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (n.is_finite() && n >= 0.0).then_some(n)
}

impl ApiOffer {
    /// Fixed-shape offer, or `None` when the record lacks what the core needs.
    /// Regular records without a departure travel on the queried date; special
    /// records need a departure starting with a calendar date.
    fn into_offer(
        self,
        origin: &str,
        destination: &str,
        queried_date: Option<&str>,
        kind: OfferKind,
    ) -> Option<FareOffer> {
        let price = self.price.as_ref().and_then(number)?;
        let departure_at = match (self.departure_at.filter(|d| !d.is_empty()), kind) {
            (Some(d), OfferKind::Regular) => d,
            (None, OfferKind::Regular) => queried_date?.to_string(),
            (Some(d), OfferKind::Special) => {
                let day: String = d.chars().take(10).collect();
                weekday_name(&day).ok()?;
                d
            }
            (None, OfferKind::Special) => return None,
        };
        Some(FareOffer {
            origin_airport: self
                .origin_airport
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| origin.to_string()),
            destination_airport: self
                .destination_airport
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| destination.to_string()),
            departure_at,
            price: price.round() as u64,
            duration_minutes: match kind {
                OfferKind::Regular => self.duration.as_ref().and_then(number).map(|d| d.round() as u32),
                OfferKind::Special => None,
            },
            flight_number: self.flight_number.and_then(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }),
            airline: self.airline,
            raw_link: self.link,
            signature: self.signature,
            kind,
        })
    }
}

/// Records from the `data` array, or an empty list when upstream says
/// "nothing found" (`success: false` or an empty/absent `data`). A record of
/// the wrong shape is dropped on its own.
fn records(body: &str) -> Result<Vec<ApiOffer>, serde_json::Error> {
    let env: Envelope = serde_json::from_str(body)?;
    let items = match env.data {
        Value::Array(items) if env.success => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<ApiOffer>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(error = %e, "aviasales: malformed record dropped");
                None
            }
        })
        .collect())
}

fn cheapest_first(mut offers: Vec<FareOffer>, limit: usize) -> Vec<FareOffer> {
    offers.sort_by_key(|o| o.price);
    offers.truncate(limit.max(1));
    offers
}

/// Parse a `prices_for_dates` body and keep offers within both ceilings.
/// A record without a duration passes the duration ceiling.
pub fn parse_regular(
    body: &str,
    query: &FareQuery,
    limit: usize,
) -> Result<Vec<FareOffer>, serde_json::Error> {
    let offers = records(body)?
        .into_iter()
        .filter_map(|r| r.into_offer(&query.origin, &query.destination, Some(&query.date), OfferKind::Regular))
        .filter(|o| o.price <= query.max_price)
        .filter(|o| o.duration_minutes.unwrap_or(0) <= query.max_duration_minutes)
        .collect();
    Ok(cheapest_first(offers, limit))
}

/// Parse a `get_special_offers` body; records without a dated departure are
/// dropped.
pub fn parse_special(
    body: &str,
    query: &SpecialQuery,
    limit: usize,
) -> Result<Vec<FareOffer>, serde_json::Error> {
    let offers = records(body)?
        .into_iter()
        .filter_map(|r| r.into_offer(&query.origin, &query.destination, None, OfferKind::Special))
        .filter(|o| query.max_price.map_or(true, |max| o.price <= max))
        .collect();
    Ok(cheapest_first(offers, limit))
}

#[derive(Clone)]
pub struct AviasalesClient {
    client: Client,
    token: String,
    base_url: String,
    offers_per_route: usize,
}

impl AviasalesClient {
    pub fn new(token: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build aviasales http client")?;
        Ok(Self {
            client,
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            offers_per_route: 1,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// How many qualifying offers to hand back per request, cheapest first.
    pub fn with_offers_per_route(mut self, n: usize) -> Self {
        self.offers_per_route = n.max(1);
        self
    }

    async fn get_body(
        &self,
        endpoint: &'static str,
        params: &[(&str, &str)],
    ) -> Result<String, FetchError> {
        let url = format!("{}/aviasales/v3/{endpoint}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(params)
            .query(&[("token", self.token.as_str())])
            .send()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { endpoint, status });
        }
        resp.text()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })
    }
}

#[async_trait]
impl FareSource for AviasalesClient {
    async fn fetch_regular(&self, query: &FareQuery) -> Result<Vec<FareOffer>, FetchError> {
        let body = self
            .get_body(
                PRICES_FOR_DATES,
                &[
                    ("origin", query.origin.as_str()),
                    ("destination", query.destination.as_str()),
                    ("departure_at", query.date.as_str()),
                    ("one_way", "true"),
                    ("direct", "false"),
                    ("currency", query.currency.as_str()),
                    ("market", "ru"),
                    ("limit", "1000"),
                    ("page", "1"),
                ],
            )
            .await?;

        let offers = parse_regular(&body, query, self.offers_per_route).map_err(|source| {
            FetchError::Decode {
                endpoint: PRICES_FOR_DATES,
                source,
            }
        })?;

        match offers.first() {
            Some(best) => tracing::info!(
                origin = %query.origin,
                destination = %query.destination,
                date = %query.date,
                price = best.price,
                "aviasales: fare found"
            ),
            None => tracing::info!(
                origin = %query.origin,
                destination = %query.destination,
                date = %query.date,
                max_price = query.max_price,
                "aviasales: no fares within limits"
            ),
        }
        Ok(offers)
    }

    async fn fetch_special(&self, query: &SpecialQuery) -> Result<Vec<FareOffer>, FetchError> {
        let body = self
            .get_body(
                SPECIAL_OFFERS,
                &[
                    ("origin", query.origin.as_str()),
                    ("destination", query.destination.as_str()),
                    ("locale", "ru"),
                    ("currency", query.currency.as_str()),
                    ("market", "ru"),
                ],
            )
            .await?;

        let offers = parse_special(&body, query, self.offers_per_route).map_err(|source| {
            FetchError::Decode {
                endpoint: SPECIAL_OFFERS,
                source,
            }
        })?;

        match offers.first() {
            Some(best) => tracing::info!(
                origin = %query.origin,
                destination = %query.destination,
                price = best.price,
                departure_at = %best.departure_at,
                "aviasales: special offer found"
            ),
            None => tracing::info!(
                origin = %query.origin,
                destination = %query.destination,
                max_price = ?query.max_price,
                "aviasales: no special offers within limits"
            ),
        }
        Ok(offers)
    }

    fn name(&self) -> &'static str {
        "aviasales"
    }
}
