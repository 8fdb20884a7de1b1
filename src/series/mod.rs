//! Historical-series preparation for blending.
//!
//! - alignment of history against a forecast period (`align`)
//! - cumulative transform for flow variables

pub mod align;

pub use align::*;
