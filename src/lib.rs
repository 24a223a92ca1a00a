pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repair;
pub mod report;
pub mod resolver;
pub mod scanner;
pub mod scoring;
pub mod storage;
pub mod verifier;

pub use error::{AppError, AppResult};
pub use logging::init_logging;
