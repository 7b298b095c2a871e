//! The dynamic wire value produced by encoders and consumed by decoders.
//!
//! ## Menu
//!
//! - [`Value`]: A self-describing tree of primitives, lists and key/value maps.
//! - [`Number`]: Integer or floating point number with a total order.
//! - [`ValueKind`]: The kind of a [`Value`], used in error messages.
//!
//! [`Value::Empty`] is the "absent" sentinel: record decoders pass it to member
//! decoders when the input map has no entry for a member, and encoders return it
//! for values that should be omitted (e.g. `None`).
//!
//! `Value` implements `serde`'s `Serialize` and `Deserialize`, so any serde data
//! format can carry it.

// -----------------------------------------------------------------------------
// Modules

mod number;
mod serde;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use number::Number;
pub use value::{Value, ValueKind};
