//! The resolution engine.
//!
//! ## Menu
//!
//! - [`Category`]: One resolution space, implemented by the markers
//!   [`Encoders`], [`Decoders`], [`Codecs`], [`Validators`],
//!   [`Constructors`] and [`Populators`].
//! - [`Factory`]: A pluggable strategy, see also [`FnFactory`].
//! - [`Registry`]: The factory chain, cache and in-flight map of one category.
//! - [`Context`]: What a factory sees: the facade, bound to a key.
//!
//! Every category has its own registry inside [`Handlers`](crate::Handlers),
//! and the registries never share cache entries: resolving an encoder for a
//! key says nothing about its decoder.

// -----------------------------------------------------------------------------
// Modules

mod category;
mod context;
mod factory;
mod registry;
mod stack;

// -----------------------------------------------------------------------------
// Exports

pub use category::{Category, Codecs, Constructors, Decoders, Encoders, Populators, Validators};
pub use context::Context;
pub use factory::{Factory, FnFactory};
pub use registry::Registry;
