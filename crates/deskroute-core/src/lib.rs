//! deskroute-core
//!
//! Data model, collaborator traits, errors, configuration and the corpus
//! loader shared by every other crate in the workspace.
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod data_processor;
pub mod error;
pub mod section;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
