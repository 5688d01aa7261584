//! Schema-driven construction of configuration objects
//!
//! A [`Schema`] declares ordered parameters (default, type tag, parser,
//! adapter) and may extend parent schemas. Binding an [`Arguments`] call
//! flattens the lineage, maps positionals in order, fills defaults, coerces
//! and validates each value, and yields a [`BoundObject`] whose attributes are
//! exactly the flattened parameter names.

mod arguments;
mod bind;
mod error;
mod object;
mod schema;
mod value;

pub use arguments::Arguments;
pub use error::{BindError, Result};
pub use object::{Bindable, BoundObject};
pub use schema::{Adapter, ArgumentsParser, ParameterSpec, Parser, Schema, TypeTag};
pub use value::Value;
