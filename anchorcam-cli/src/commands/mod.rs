//! Command implementations for the anchorcam CLI

pub mod config;
pub mod run;
