//! # Parliamentarian viewer common library
//!
//! Shared code for the viewer binary and its tests:
//! - Error taxonomy and result alias
//! - Configuration loading and data root resolution
//! - Data model for the list index and detail documents
//! - Label classification (AI axis and human axis)
//! - Cross-tabulation of labels
//! - Text and date helpers

pub mod config;
pub mod crosstab;
pub mod dates;
pub mod error;
pub mod labels;
pub mod model;
pub mod text;

pub use crosstab::CrossTab;
pub use error::{Error, Result};
pub use labels::{AiLabel, HumanLabel};
pub use model::{DetailDocument, Entity};
