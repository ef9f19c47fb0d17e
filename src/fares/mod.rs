// src/fares/mod.rs
pub mod aviasales;

use crate::error::FetchError;
use crate::offer::FareOffer;

/// Query for regular fares on one route and date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareQuery {
    pub origin: String,
    pub destination: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub max_price: u64,
    pub max_duration_minutes: u32,
    pub currency: String,
}

/// Query for special (anomaly-priced) offers on one route, any date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialQuery {
    pub origin: String,
    pub destination: String,
    /// `None` disables the price ceiling.
    pub max_price: Option<u64>,
    pub currency: String,
}

/// Fare-search collaborator. Returns only offers that pass the price and
/// duration ceilings. "No results" is `Ok(vec![])`; transport and payload
/// problems are `Err`.
#[async_trait::async_trait]
pub trait FareSource: Send + Sync {
    async fn fetch_regular(&self, query: &FareQuery) -> Result<Vec<FareOffer>, FetchError>;
    async fn fetch_special(&self, query: &SpecialQuery) -> Result<Vec<FareOffer>, FetchError>;
    fn name(&self) -> &'static str;
}
