//! Market data providers

pub mod circuit_breaker;
pub mod csv_import;
pub mod provider;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvProvider;
pub use provider::{DataError, DataProvider, DataSource};
pub use yahoo::YahooProvider;
