//! Variable substitution for `${name}` and `${name:default}` placeholders.
//!
//! Strings, sequences and key-ordered maps are walked recursively. A placeholder that
//! makes up an entire string takes on the declared type of its variable: LIST values
//! splice into the enclosing sequence and MAP values become objects. Placeholders
//! embedded in surrounding text are substituted as plain text.

mod placeholder;
mod resolver;

pub use placeholder::{has_unresolved, is_templated};
pub use resolver::{TemplateResolver, resolve};
