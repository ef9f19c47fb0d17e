// src/offer.rs
use serde::{Deserialize, Serialize};

/// Which identity scheme applies to an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferKind {
    /// Regular fare from `prices_for_dates`; identified by route + departure + flight.
    Regular,
    /// Anomaly-priced fare from `get_special_offers`; identified by its signature.
    Special,
}

/// One normalized fare quote, as produced by a [`crate::fares::FareSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareOffer {
    pub origin_airport: String,
    pub destination_airport: String,
    /// Date (`2025-06-01`) or date-time (`2025-06-01T07:15:00+03:00`), as sent upstream.
    pub departure_at: String,
    /// Minor-unit amount in the requested currency.
    pub price: u64,
    pub duration_minutes: Option<u32>,
    pub flight_number: Option<String>,
    pub airline: Option<String>,
    /// Relative deep link, e.g. `/search/MOW0106LED1?t=...`.
    pub raw_link: Option<String>,
    /// Provider-issued id, only present on special offers.
    pub signature: Option<String>,
    pub kind: OfferKind,
}

impl FareOffer {
    pub fn is_special(&self) -> bool {
        self.kind == OfferKind::Special
    }

    /// Consume the fetched offer and pin it to the queried route.
    ///
    /// Airport codes are replaced by the codes that were queried (the API may
    /// answer a city code with a concrete airport). Regular offers travel on the
    /// queried date; special offers on the date part of `departure_at`.
    pub fn routed(mut self, origin: &str, destination: &str, queried_date: &str) -> RoutedOffer {
        self.origin_airport = origin.to_string();
        self.destination_airport = destination.to_string();
        let travel_date = match self.kind {
            OfferKind::Regular => queried_date.to_string(),
            OfferKind::Special => self.departure_at.chars().take(10).collect(),
        };
        RoutedOffer {
            offer: self,
            travel_date,
        }
    }
}

/// A fetched offer enriched with the loop's view of route and travel date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedOffer {
    pub offer: FareOffer,
    pub travel_date: String,
}
