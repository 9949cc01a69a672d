//! Shared provider framework types.
//!
//! Everything the host orchestrator exchanges with a provider that is not
//! specific to Passbolt lives here: [`Diagnostics`] collected by each
//! operation, the three-state [`Value`] used by plan and state models, and the
//! [`Schema`] declarations a provider publishes for its resources.

pub mod diagnostics;
pub mod schema;
pub mod value;

pub use diagnostics::{AttributePath, Diagnostic, Diagnostics, Severity};
pub use schema::{Attribute, AttributeType, DefaultValue, Schema};
pub use value::Value;
