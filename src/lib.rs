pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod exec;
pub mod git;
pub mod guard;
pub mod registry;
pub mod resolver;
pub mod ui;
pub mod workspace;

pub use error::{ReleaseError, Result};
