//! Expose refnorm's internal API for use in integration tests and the xtask
//! crate. The normalization engine itself lives in `refnorm-markdown`.
pub mod cli;
pub mod config;
pub mod error;
pub mod utils;
