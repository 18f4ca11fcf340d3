//! inspector-runtime: values, live objects and built-in libraries
//!
//! Everything a compiled unit touches while it runs lives here:
//! - `Value`: the dynamic result of every expression
//! - `LiveObject`: the host-provided object passed as the live parameter
//! - `LibraryCatalog`: loadable libraries, each a set of namespaces with
//!   functions, constants and type names

mod error;
mod library;
mod object;
mod stdlib;
mod value;

pub use error::RuntimeError;
pub use library::{Arity, Export, Library, LibraryCatalog, Namespace, NativeFn, NativeFunction};
pub use object::{invoke, Callable, LiveObject, ObjectRef};
pub use stdlib::trading::DEFAULT_BENCHMARK;
pub use value::Value;
