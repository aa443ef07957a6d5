//! SL (Storstockholms Lokaltrafik) realtime departures client.
//!
//! One request per site returns every departure in a fixed time window,
//! grouped into five transport-type arrays. A response carries its own
//! `StatusCode`; zero means success even though the HTTP status is 200
//! either way.

mod client;
mod convert;
mod error;
mod mock;
mod source;
mod types;

pub use client::{SlClient, SlConfig};
pub use convert::normalize;
pub use error::SlError;
pub use mock::MockSlClient;
pub use source::{DepartureSource, SiteQuery, TIME_WINDOW_MINS};
pub use types::{RawDeparture, RealtimeResponse, ResponseData};
