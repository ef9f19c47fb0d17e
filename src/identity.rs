// src/identity.rs
//! Stable dedup keys for fare offers.
//!
//! Regular offers: `origin_destination_departure_flight`, absent parts as empty
//! strings, no escaping. Special offers: the provider signature verbatim.
//! Both schemes share one key space, so a signature that happens to spell a
//! regular key would collide with it.

use std::fmt;

use crate::offer::{FareOffer, OfferKind};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Derive the dedup key. Price never takes part, so a cheaper quote for the
/// same flight lands on the same ledger entry.
pub fn resolve(offer: &FareOffer) -> IdentityKey {
    match offer.kind {
        OfferKind::Special => IdentityKey(offer.signature.clone().unwrap_or_default()),
        OfferKind::Regular => IdentityKey(format!(
            "{}_{}_{}_{}",
            offer.origin_airport,
            offer.destination_airport,
            offer.departure_at,
            offer.flight_number.as_deref().unwrap_or_default()
        )),
    }
}
