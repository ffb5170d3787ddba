pub mod config;
pub mod error;
pub mod eval;

pub use config::Config;
pub use error::{MetricsError, Result};
pub use eval::{weighted_apk, weighted_mapk};
