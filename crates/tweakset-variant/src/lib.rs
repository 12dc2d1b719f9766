//! Typed settings values
//!
//! Defines the value model shared by the tweakset applier and the
//! GVariant text codec used to talk to the `gsettings` tool.

pub mod error;
pub mod text;
pub mod value;

pub use error::VariantError;
pub use text::{format, parse};
pub use value::{Value, ValueType};
