//! Polymarket API clients
//!
//! Thin readers over the three public endpoints the debate needs: Gamma for
//! market metadata, the CLOB for price history, the Data API for trades,
//! holders and per-wallet positions.

pub mod clob;
pub mod data_api;
pub mod gamma;

pub use clob::ClobClient;
pub use data_api::DataApiClient;
pub use gamma::{GammaClient, MarketData};
