// src/lib.rs
// Public library surface for the binary, the demo bin and integration tests.

pub mod error;
pub mod offer;

// Dedup / notification decision core
pub mod gate;
pub mod identity;
pub mod ledger;
pub mod link;

pub mod calendar;
pub mod matrix;
pub mod watcher;

// Collaborators around the core
pub mod bot;
pub mod fares;
pub mod notify;

pub mod config;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::config::Settings;
pub use crate::notify::{FareAlert, Notifier};
pub use crate::offer::{FareOffer, OfferKind};
pub use crate::watcher::{CycleReport, WatchPlan, Watcher};
