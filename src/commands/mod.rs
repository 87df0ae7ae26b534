pub mod import;
pub mod settings;
pub mod stats;
pub mod trades;

pub use import::*;
pub use settings::*;
pub use stats::*;
pub use trades::*;
