//! Pure computation core: filtering, aggregate statistics, equity curve and
//! capital tracking over an in-memory trade snapshot. Nothing in here touches
//! I/O or retains state between calls.

pub mod capital;
pub mod equity;
pub mod filter;
pub mod profile;
pub mod stats;

pub use capital::*;
pub use equity::*;
pub use filter::*;
pub use profile::*;
pub use stats::*;
