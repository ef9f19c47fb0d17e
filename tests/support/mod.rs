// tests/support/mod.rs
// In-memory collaborators for driving the watcher without network access.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use fare_watcher::error::FetchError;
use fare_watcher::fares::{FareQuery, FareSource, SpecialQuery};
use fare_watcher::matrix::PollingMatrix;
use fare_watcher::{FareAlert, FareOffer, Notifier, OfferKind, WatchPlan};

pub type Scripted = Result<Vec<FareOffer>, &'static str>;

/// Answers are queued per (origin, destination[, date]); an empty queue
/// answers "no offers".
#[derive(Default, Clone)]
pub struct ScriptedSource {
    pub regular: Arc<Mutex<HashMap<(String, String, String), VecDeque<Scripted>>>>,
    pub special: Arc<Mutex<HashMap<(String, String), VecDeque<Scripted>>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub special_queries: Arc<Mutex<Vec<SpecialQuery>>>,
}

impl ScriptedSource {
    pub fn push_regular(&self, origin: &str, destination: &str, date: &str, answer: Scripted) {
        self.regular
            .lock()
            .unwrap()
            .entry((origin.into(), destination.into(), date.into()))
            .or_default()
            .push_back(answer);
    }

    pub fn push_special(&self, origin: &str, destination: &str, answer: Scripted) {
        self.special
            .lock()
            .unwrap()
            .entry((origin.into(), destination.into()))
            .or_default()
            .push_back(answer);
    }
}

fn to_fetch_error(msg: &'static str) -> FetchError {
    FetchError::Decode {
        endpoint: "scripted",
        source: serde_json::from_str::<serde_json::Value>(msg).unwrap_err(),
    }
}

#[async_trait::async_trait]
impl FareSource for ScriptedSource {
    async fn fetch_regular(&self, q: &FareQuery) -> Result<Vec<FareOffer>, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("regular {} {}-{}", q.date, q.origin, q.destination));
        let next = self
            .regular
            .lock()
            .unwrap()
            .get_mut(&(q.origin.clone(), q.destination.clone(), q.date.clone()))
            .and_then(|queue| queue.pop_front());
        next.unwrap_or(Ok(vec![])).map_err(to_fetch_error)
    }

    async fn fetch_special(&self, q: &SpecialQuery) -> Result<Vec<FareOffer>, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("special {}-{}", q.origin, q.destination));
        self.special_queries.lock().unwrap().push(q.clone());
        let next = self
            .special
            .lock()
            .unwrap()
            .get_mut(&(q.origin.clone(), q.destination.clone()))
            .and_then(|queue| queue.pop_front());
        next.unwrap_or(Ok(vec![])).map_err(to_fetch_error)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Records every alert; fails while `fail` is set.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<FareAlert>>>,
    pub fail: Arc<Mutex<bool>>,
}

impl RecordingNotifier {
    pub fn set_failing(&self, on: bool) {
        *self.fail.lock().unwrap() = on;
    }

    pub fn sent(&self) -> Vec<FareAlert> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, alert: &FareAlert) -> anyhow::Result<()> {
        if *self.fail.lock().unwrap() {
            anyhow::bail!("telegram is down");
        }
        self.sent.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

pub fn regular(origin: &str, destination: &str, date: &str, price: u64, flight: &str, link: &str) -> FareOffer {
    FareOffer {
        origin_airport: origin.into(),
        destination_airport: destination.into(),
        departure_at: date.into(),
        price,
        duration_minutes: Some(90),
        flight_number: Some(flight.into()),
        airline: Some("SU".into()),
        raw_link: Some(link.into()),
        signature: None,
        kind: OfferKind::Regular,
    }
}

pub fn special(departure_at: &str, price: u64, signature: &str, link: &str) -> FareOffer {
    FareOffer {
        origin_airport: "VKO".into(),
        destination_airport: "LED".into(),
        departure_at: departure_at.into(),
        price,
        duration_minutes: None,
        flight_number: None,
        airline: Some("DP".into()),
        raw_link: Some(link.into()),
        signature: Some(signature.into()),
        kind: OfferKind::Special,
    }
}

pub fn plan(dates: &[&str], origins: &[&str], destinations: &[&str]) -> WatchPlan {
    WatchPlan {
        matrix: PollingMatrix {
            dates: dates
                .iter()
                .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap())
                .collect(),
            origins: origins.iter().map(|s| s.to_string()).collect(),
            destinations: destinations.iter().map(|s| s.to_string()).collect(),
        },
        max_price: 5000,
        max_duration_minutes: 600,
        special_max_price: Some(4000),
        currency: "rub".into(),
        affiliate_marker: "m1".into(),
        chat_id: 42,
        interval: Duration::from_millis(10),
    }
}
