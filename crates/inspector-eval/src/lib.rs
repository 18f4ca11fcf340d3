//! inspector-eval: Dynamic Evaluator
//!
//! Takes a synthesized unit from source text to a value:
//!
//! 1. parse the unit source
//! 2. bind it against the capability set and the library catalog
//! 3. instantiate the generated type by qualified name
//! 4. locate the entry method and invoke it
//!
//! Diagnostics from steps 1 and 2 are [`CompileError`]s; failures while the
//! body runs are runtime errors carrying the span of the failing expression.

mod bind;
mod compiled;
mod error;
mod evaluator;
mod interp;
mod ir;

pub use bind::Binder;
pub use compiled::{CompiledMethod, CompiledUnit, Instance, UnitType};
pub use error::{CompileError, ErrorKind, EvalError};
pub use evaluator::Evaluator;
