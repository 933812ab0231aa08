//! Domain types for bandwatch

pub mod bar;
pub mod granularity;

pub use bar::{Bar, BarError, BarSeries};
pub use granularity::{Granularity, Period};

/// Symbol type alias
pub type Symbol = String;
