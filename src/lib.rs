//! Polymarket Debate Floor
//!
//! A multi-agent deliberation engine for Polymarket prediction markets.
//!
//! ## Architecture
//!
//! ```text
//! Clients (Gamma/CLOB/Data API) → DebateState ← TraderFlowAggregator
//!                                     ↓
//!            Quant → TimeDecay → TraderFlow → News → Macro → Contrarian
//!                                     ↓
//!                              Moderator (verdict)
//! ```
//!
//! Agents run strictly in sequence against one shared state; each reads the
//! whole transcript and appends one contribution. The quantitative toolkit
//! in [`quant`] and the wallet aggregation in [`flow`] carry the numeric
//! work; everything else is prompt assembly around an injected LLM.

pub mod client;
pub mod config;
pub mod debate;
pub mod error;
pub mod flow;
pub mod llm;
pub mod quant;
pub mod search;
pub mod types;

#[cfg(test)]
mod config_tests;
