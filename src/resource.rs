//! Host-facing adapter traits.
//!
//! The host drives every managed resource through create/read/update/delete
//! and every data source through read. Each call returns the new state (or
//! none, when the object is gone) together with the diagnostics it raised.

use async_trait::async_trait;
use std::fmt::Display;
use tfpb_core::{Diagnostics, Schema};

/// A single error diagnostic.
pub fn error_diagnostics(summary: &str, detail: impl Into<String>) -> Diagnostics {
    let mut diags = Diagnostics::new();
    diags.add_error(summary, detail);
    diags
}

/// A remote failure: `detail_prefix` names what was attempted.
pub fn remote_error(summary: &str, detail_prefix: &str, err: impl Display) -> Diagnostics {
    error_diagnostics(summary, format!("{}{}", detail_prefix, err))
}

/// Outcome of a state-producing operation.
#[derive(Debug, Clone, PartialEq)]
pub struct StateResponse<M> {
    /// State to record. `None` removes the resource from state.
    pub state: Option<M>,
    pub diagnostics: Diagnostics,
}

impl<M> StateResponse<M> {
    pub fn ok(state: M) -> Self {
        Self {
            state: Some(state),
            diagnostics: Diagnostics::new(),
        }
    }

    /// The remote object is gone; drop it from state without an error.
    pub fn removed() -> Self {
        Self {
            state: None,
            diagnostics: Diagnostics::new(),
        }
    }

    /// An error with the state the host should keep (`None` for nothing).
    pub fn failed(state: Option<M>, diagnostics: Diagnostics) -> Self {
        Self { state, diagnostics }
    }

    pub fn has_error(&self) -> bool {
        self.diagnostics.has_error()
    }
}

/// A resource type whose lifecycle the host manages.
#[async_trait]
pub trait ManagedResource: Send + Sync {
    type Model: Clone + Send + Sync;

    /// The type name used in configuration, e.g. `passbolt_folder`.
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn create(&self, plan: Self::Model) -> StateResponse<Self::Model>;

    async fn read(&self, state: Self::Model) -> StateResponse<Self::Model>;

    async fn update(&self, plan: Self::Model, state: Self::Model) -> StateResponse<Self::Model>;

    async fn delete(&self, state: Self::Model) -> Diagnostics;
}

/// A read-only listing the host can query.
#[async_trait]
pub trait DataSource: Send + Sync {
    type Model: Clone + Send + Sync;

    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn read(&self) -> StateResponse<Self::Model>;
}
