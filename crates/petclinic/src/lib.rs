//! Veterinary clinic records: pets, vets, and visit booking.
//!
//! The [`clinic`] module holds the domain and the booking workflow; [`config`],
//! [`error`], and [`telemetry`] carry the service plumbing shared with the API binary.

pub mod clinic;
pub mod config;
pub mod error;
pub mod telemetry;
