//! The weather-matching pipeline.
//!
//! Raw weather rows are cleaned and normalized ([`clean`]), averaged per
//! week ([`aggregate`]), joined onto weekly chart entries ([`merge`]) and
//! ranked against the live weather ([`rank`]). [`session`] caches each
//! stage for the length of one analysis session.

pub mod aggregate;
pub mod clean;
pub mod config;
pub mod correlation;
pub mod features;
pub mod merge;
pub mod normalize;
pub mod rank;
pub mod session;
