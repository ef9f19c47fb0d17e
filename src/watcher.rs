// src/watcher.rs
//! The polling loop: walks the route/date matrix, decides which fares are
//! news, delivers alerts and remembers what was sent.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use metrics::{counter, gauge};
use tracing::{debug, error, info, warn};

use crate::calendar::weekday_name;
use crate::config::Settings;
use crate::error::WatchError;
use crate::fares::{FareQuery, FareSource, SpecialQuery};
use crate::gate::{self, GateDecision};
use crate::identity;
use crate::ledger::PriceLedger;
use crate::link::build_link;
use crate::matrix::{PollingMatrix, RouteDate};
use crate::notify::{FareAlert, Notifier};
use crate::offer::{FareOffer, RoutedOffer};

/// Everything the loop needs from configuration.
#[derive(Debug, Clone)]
pub struct WatchPlan {
    pub matrix: PollingMatrix,
    pub max_price: u64,
    pub max_duration_minutes: u32,
    pub special_max_price: Option<u64>,
    pub currency: String,
    pub affiliate_marker: String,
    pub chat_id: i64,
    pub interval: Duration,
}

impl WatchPlan {
    pub fn from_settings(s: &Settings) -> Self {
        Self {
            matrix: s.matrix(),
            max_price: s.max_price,
            max_duration_minutes: s.max_duration_minutes,
            special_max_price: s.special_max_price(),
            currency: s.currency.clone(),
            affiliate_marker: s.affiliate_marker.clone(),
            chat_id: s.telegram_user_id,
            interval: Duration::from_secs(s.check_interval_secs),
        }
    }
}

/// Tally of one pass over the matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub triples: usize,
    pub failed_triples: usize,
    pub offers_seen: usize,
    pub notified: usize,
    pub suppressed: usize,
    pub skipped_no_link: usize,
    pub skipped_bad_date: usize,
    pub delivery_failures: usize,
}

enum Outcome {
    Notified,
    Suppressed,
    NoLink,
    BadDate,
    DeliveryFailed,
}

/// Owns the price ledger; nothing else reads or writes it.
pub struct Watcher<S, N> {
    source: S,
    notifier: N,
    plan: WatchPlan,
    ledger: PriceLedger,
}

impl<S: FareSource, N: Notifier> Watcher<S, N> {
    pub fn new(source: S, notifier: N, plan: WatchPlan) -> Self {
        Self {
            source,
            notifier,
            plan,
            ledger: PriceLedger::new(),
        }
    }

    pub fn ledger(&self) -> &PriceLedger {
        &self.ledger
    }

    /// Run cycles forever. Each cycle is a supervision boundary: a panic
    /// inside it is logged and followed by the regular sleep.
    pub async fn run(mut self) {
        info!(
            source = self.source.name(),
            triples = self.plan.matrix.len(),
            interval_secs = self.plan.interval.as_secs(),
            "fare watcher started"
        );

        loop {
            match AssertUnwindSafe(self.run_cycle()).catch_unwind().await {
                Ok(report) => info!(
                    triples = report.triples,
                    failed = report.failed_triples,
                    offers = report.offers_seen,
                    notified = report.notified,
                    suppressed = report.suppressed,
                    no_link = report.skipped_no_link,
                    bad_date = report.skipped_bad_date,
                    delivery_failures = report.delivery_failures,
                    "cycle finished"
                ),
                Err(panic) => {
                    counter!("fare_cycle_panics_total").increment(1);
                    error!(reason = %panic_message(&*panic), "cycle aborted");
                }
            }

            info!(secs = self.plan.interval.as_secs(), "sleeping until next cycle");
            tokio::time::sleep(self.plan.interval).await;
        }
    }

    /// One pass over the matrix. A failing triple is logged and skipped.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();
        let triples: Vec<RouteDate> = self.plan.matrix.triples().collect();

        for triple in triples {
            report.triples += 1;
            if let Err(e) = self.process_triple(&triple, &mut report).await {
                report.failed_triples += 1;
                if let WatchError::Fetch(fe) = &e {
                    counter!("fare_fetch_errors_total", "endpoint" => fe.endpoint()).increment(1);
                }
                warn!(
                    date = %triple.date,
                    origin = %triple.origin,
                    destination = %triple.destination,
                    error = %e,
                    "triple skipped"
                );
            }
        }

        counter!("fare_cycles_total").increment(1);
        gauge!("fare_ledger_entries").set(self.ledger.len() as f64);
        gauge!("fare_last_cycle_ts").set(Utc::now().timestamp() as f64);
        report
    }

    async fn process_triple(
        &mut self,
        triple: &RouteDate,
        report: &mut CycleReport,
    ) -> Result<(), WatchError> {
        let regular = self
            .source
            .fetch_regular(&FareQuery {
                origin: triple.origin.clone(),
                destination: triple.destination.clone(),
                date: triple.date.clone(),
                max_price: self.plan.max_price,
                max_duration_minutes: self.plan.max_duration_minutes,
                currency: self.plan.currency.clone(),
            })
            .await?;
        self.consider_all(regular, triple, report).await;

        let special = self
            .source
            .fetch_special(&SpecialQuery {
                origin: triple.origin.clone(),
                destination: triple.destination.clone(),
                max_price: self.plan.special_max_price,
                currency: self.plan.currency.clone(),
            })
            .await?;
        self.consider_all(special, triple, report).await;
        Ok(())
    }

    async fn consider_all(
        &mut self,
        offers: Vec<FareOffer>,
        triple: &RouteDate,
        report: &mut CycleReport,
    ) {
        counter!("fare_offers_total").increment(offers.len() as u64);
        for offer in offers {
            report.offers_seen += 1;
            let routed = offer.routed(&triple.origin, &triple.destination, &triple.date);
            match self.consider(routed).await {
                Outcome::Notified => report.notified += 1,
                Outcome::Suppressed => report.suppressed += 1,
                Outcome::NoLink => report.skipped_no_link += 1,
                Outcome::BadDate => report.skipped_bad_date += 1,
                Outcome::DeliveryFailed => report.delivery_failures += 1,
            }
        }
    }

    /// resolve → gate → link → deliver → commit
    async fn consider(&mut self, routed: RoutedOffer) -> Outcome {
        let RoutedOffer { offer, travel_date } = routed;
        let kind = if offer.is_special() { "special" } else { "regular" };
        let key = identity::resolve(&offer);

        if let GateDecision::Suppress { last_notified } =
            gate::decide(&self.ledger, &key, offer.price)
        {
            debug!(
                kind,
                %key,
                price = offer.price,
                last_notified,
                "price not lower than last alert"
            );
            return Outcome::Suppressed;
        }

        let Some(link) = build_link(&offer, &self.plan.affiliate_marker) else {
            debug!(kind, %key, price = offer.price, "offer without purchase link skipped");
            return Outcome::NoLink;
        };

        let weekday = match weekday_name(&travel_date) {
            Ok(w) => w,
            Err(e) => {
                warn!(kind, %key, error = %e, "offer with undated departure skipped");
                return Outcome::BadDate;
            }
        };
        let alert = FareAlert {
            chat_id: self.plan.chat_id,
            origin: offer.origin_airport.clone(),
            destination: offer.destination_airport.clone(),
            date: travel_date,
            weekday: weekday.to_string(),
            price: offer.price,
            currency: self.plan.currency.clone(),
            link,
        };

        match self.notifier.send(&alert).await {
            Ok(()) => {
                self.ledger.commit(key, offer.price);
                counter!("fare_notifications_total", "kind" => kind).increment(1);
                info!(
                    kind,
                    origin = %alert.origin,
                    destination = %alert.destination,
                    price = alert.price,
                    weekday,
                    "alert delivered"
                );
                Outcome::Notified
            }
            Err(e) => {
                counter!("fare_delivery_failures_total").increment(1);
                error!(
                    kind,
                    %key,
                    price = offer.price,
                    error = %format!("{e:#}"),
                    "alert delivery failed, price not recorded"
                );
                Outcome::DeliveryFailed
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
