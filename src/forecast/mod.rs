pub mod additive;
pub mod config;
pub mod forecaster;
pub mod linalg;
pub mod traits;
