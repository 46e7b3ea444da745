//! Shared data structures for water value estimation
//!
//! - `series`: raw caller input and prepared (sorted, deduplicated) series
//! - `result`: breakpoint flags, interval bounds and the result bundle
//! - `error`: the estimation error taxonomy

mod error;
mod result;
mod series;

pub use error::*;
pub use result::*;
pub use series::*;
