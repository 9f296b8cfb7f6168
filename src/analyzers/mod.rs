//! Merging per-station boards and summarising delays.
//!
//! [`aggregate`] concatenates the station tables, [`delays`] groups the
//! forecast-confirmed rows by line and direction and averages their delay.

pub mod aggregate;
pub mod delays;
pub mod utility;
