//! Realtime departure boards for SL stations.
//!
//! Polls the SL realtime departures API for a set of configured stations
//! on an adaptive schedule, filters each station's departures by line and
//! direction, and publishes one batch result per poll cycle.

pub mod clock;
pub mod config;
pub mod domain;
pub mod events;
pub mod fetcher;
pub mod filter;
pub mod orchestrator;
pub mod scheduler;
pub mod sl;
pub mod web;

#[cfg(test)]
mod testing;
