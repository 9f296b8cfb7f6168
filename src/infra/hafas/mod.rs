//! Client for HAFAS `mgate` journey-planner deployments.
//!
//! [`HafasProfile`] identifies a deployment, [`request`] builds payloads and
//! [`HafasClient`] implements the board and search service traits.

mod client;
mod profile;
pub mod request;

pub use client::{DEFAULT_TIMEOUT, HafasClient};
pub use profile::{ClientInfo, HafasProfile};
