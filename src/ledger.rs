// src/ledger.rs
use std::collections::HashMap;

use crate::identity::IdentityKey;

/// Last notified price per flight identity.
///
/// In-memory only; starts empty on every process start. Entries are only ever
/// inserted or overwritten (after a successful send), never removed.
#[derive(Debug, Clone, Default)]
pub struct PriceLedger {
    prices: HashMap<IdentityKey, u64>,
}

impl PriceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_notified(&self, key: &IdentityKey) -> Option<u64> {
        self.prices.get(key).copied()
    }

    /// Record that `price` was delivered for `key`.
    pub fn commit(&mut self, key: IdentityKey, price: u64) {
        self.prices.insert(key, price);
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_overwrites_same_identity() {
        let mut l = PriceLedger::new();
        let k = IdentityKey::from("MOW_LED_2025-06-01_SU100");
        l.commit(k.clone(), 3000);
        l.commit(k.clone(), 2500);
        assert_eq!(l.len(), 1);
        assert_eq!(l.last_notified(&k), Some(2500));
    }
}
