//! Input/output helpers.
//!
//! - CSV ingest for history and forecasts (`ingest`)
//! - family CSV exports (`export`)
//! - file naming strategy (`layout`)
//! - JSON batch report read/write (`manifest`)

pub mod export;
pub mod ingest;
pub mod layout;
pub mod manifest;

pub use export::*;
pub use ingest::*;
pub use layout::*;
pub use manifest::*;
