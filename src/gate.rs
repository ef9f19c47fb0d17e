// src/gate.rs
use crate::identity::IdentityKey;
use crate::ledger::PriceLedger;

/// Outcome of checking a fresh quote against the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Unseen identity (`previous == None`) or a strictly lower price.
    Notify { previous: Option<u64> },
    /// Price is equal to or above what was last sent.
    Suppress { last_notified: u64 },
}

impl GateDecision {
    pub fn should_notify(&self) -> bool {
        matches!(self, Self::Notify { .. })
    }
}

/// Decide whether `price` is news for `key`. Does NOT mutate the ledger:
/// the caller commits via [`PriceLedger::commit`] only after the alert was
/// actually delivered, so a failed send is retried at the same price.
pub fn decide(ledger: &PriceLedger, key: &IdentityKey, price: u64) -> GateDecision {
    match ledger.last_notified(key) {
        None => GateDecision::Notify { previous: None },
        Some(last) if price < last => GateDecision::Notify {
            previous: Some(last),
        },
        Some(last) => GateDecision::Suppress {
            last_notified: last,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> IdentityKey {
        IdentityKey::from("MOW_LED_2025-06-01_SU100")
    }

    #[test]
    fn first_sighting_notifies() {
        let l = PriceLedger::new();
        assert_eq!(decide(&l, &key(), 3000), GateDecision::Notify { previous: None });
    }

    #[test]
    fn decide_does_not_touch_ledger() {
        let l = PriceLedger::new();
        let _ = decide(&l, &key(), 3000);
        assert!(l.is_empty());
    }

    #[test]
    fn strictly_decreasing_prices_always_notify() {
        let mut l = PriceLedger::new();
        for price in [5000u64, 4999, 4200, 3000, 1, 0] {
            let d = decide(&l, &key(), price);
            assert!(d.should_notify(), "price {price} should notify");
            l.commit(key(), price);
        }
    }

    #[test]
    fn equal_or_higher_prices_are_suppressed() {
        let mut l = PriceLedger::new();
        assert!(decide(&l, &key(), 3000).should_notify());
        l.commit(key(), 3000);

        for price in [3000u64, 3001, 9000, 3000] {
            assert_eq!(
                decide(&l, &key(), price),
                GateDecision::Suppress { last_notified: 3000 }
            );
        }
    }

    #[test]
    fn drop_reports_previous_price() {
        let mut l = PriceLedger::new();
        l.commit(key(), 3000);
        assert_eq!(
            decide(&l, &key(), 2500),
            GateDecision::Notify { previous: Some(3000) }
        );
    }

    #[test]
    fn uncommitted_notify_repeats() {
        // A send that failed leaves no trace, so the same price qualifies again.
        let l = PriceLedger::new();
        assert!(decide(&l, &key(), 3000).should_notify());
        assert!(decide(&l, &key(), 3000).should_notify());
    }
}
