//! Port traits implemented by [`crate::adapters`].

pub mod config_port;
pub mod filing_port;
pub mod price_port;
pub mod report_port;
