//! Quote provider adapters.

mod finnhub;

pub use finnhub::FinnhubAdapter;
