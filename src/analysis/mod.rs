//! Statistical analysis over canonical points entries.
//!
//! Submodules:
//! - `consistency`: teams with at least T table rows.
//! - `trend`: season-over-season deltas, distribution stats, notable changes.
//! - `top_tier`: crossings of the top-tier boundary between seasons.

pub mod consistency;
pub mod top_tier;
pub mod trend;
