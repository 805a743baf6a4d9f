//! # sqint Library
//!
//! Embedded-SQL detection and validation for source code.

pub mod cache;
pub mod classify;
pub mod cli;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod files;
pub mod normalize;
pub mod output;
pub mod risk;
pub mod scanner;
pub mod source;
pub mod validate;
