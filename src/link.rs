// src/link.rs
use crate::offer::FareOffer;

pub const SITE_ORIGIN: &str = "https://www.aviasales.ru";

/// Absolute purchase URL for an offer, tagged with the affiliate marker.
///
/// Returns `None` when the offer carries no deep link; such offers must not be
/// notified at all. The marker is appended as-is (no URL escaping).
pub fn build_link(offer: &FareOffer, affiliate_marker: &str) -> Option<String> {
    let raw = offer.raw_link.as_deref().filter(|l| !l.is_empty())?;

    let mut link = format!("{SITE_ORIGIN}{raw}");
    if !affiliate_marker.is_empty() {
        let sep = if link.contains('?') { '&' } else { '?' };
        link.push(sep);
        link.push_str("marker=");
        link.push_str(affiliate_marker);
    }
    Some(link)
}
