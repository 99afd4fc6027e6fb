//! Core data types flowing through the collector.
//!
//! A [`Tick`] is decoded from the quote API, encoded into a [`Point`], and
//! written inside a [`Batch`].

pub mod currency;
pub mod point;
pub mod tick;

pub use currency::*;
pub use point::*;
pub use tick::*;
