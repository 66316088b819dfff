//! User interfaces

#[cfg(feature = "cli")]
pub mod cli;
