pub mod analyzers;
pub mod coerce;
pub mod config;
pub mod document;
pub mod error;
pub mod geo;
pub mod merge;
pub mod output;
pub mod parser;
pub mod sources;
pub mod stats;

pub use error::{RaterError, Result};
