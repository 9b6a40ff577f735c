//! horobot library
//!
//! Serves translated daily horoscopes for the twelve zodiac signs through a
//! cache-backed fetch-and-translate pipeline. The binary wires these modules
//! together; integration tests use them directly.

pub mod bot;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod pipeline;

pub use pipeline::{HoroscopeError, HoroscopePipeline};
