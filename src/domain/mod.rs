//! Core domain types and logic.

pub mod cik;
pub mod filing;
pub mod income_statement;
pub mod statement_parser;
pub mod filings;
pub mod position;
pub mod portfolio;
pub mod price_history;
pub mod simulation;
pub mod universe;
pub mod config_validation;
pub mod error;
