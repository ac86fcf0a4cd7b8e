//! A single-purpose on-chain filter.
//!
//! Each invocation scans the instruction data for the fixed
//! [`SIGNATURE`](consts::SIGNATURE) and rejects the transaction when it is
//! present. The pipeline is three stages that run once, left to right:
//! [`input`] adapts the host payload, [`scanner`] finds the signature and
//! [`reporter`] commits the log line and exit status.
//!
//! The off-chain modules (`runner`, `source`, `monitor`, `config`) replay the
//! same pipeline locally and interpret captured transaction logs. They sit
//! behind the `cli` feature and are never part of the on-chain build.

pub mod consts;
pub mod error;
pub mod filter;
pub mod input;
pub mod outcome;
pub mod program;
pub mod reporter;
pub mod scanner;

#[cfg(feature = "cli")]
pub mod config;
#[cfg(feature = "cli")]
pub mod monitor;
#[cfg(feature = "cli")]
pub mod runner;
#[cfg(feature = "cli")]
pub mod source;

pub use error::FilterError;
pub use outcome::{ExitStatus, Outcome};
pub use scanner::{MatchResult, scan, scan_signature};
