#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Modules

mod error;
mod handlers;

pub mod describe;
pub mod factories;
pub mod handler;
pub mod key;
pub mod registry;
pub mod value;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use error::{CodecError, ResolveError};
pub use handlers::Handlers;
pub use key::{Tag, Tags, Type, TypeKey};
pub use value::Value;
