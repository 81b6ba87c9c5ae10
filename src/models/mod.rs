//! Reference cost models for the search engines.
//!
//! The engines consume any [`CostModel`](crate::traits::CostModel); these
//! modules show how to implement one for concrete scoring schemes.
//!
//! They are both usable and serve as templates:
//! - [`table`] : explicit per-state and per-edge cost tables.
//! - [`hmm`]   : discrete log-space HMM decoding via the max polarity.

pub mod hmm;
pub mod table;
