//! Orchestration of one patent-analysis session.
//!
//! State changes flow through a pure reducer; the [`Store`] owns the state
//! and runs the provider calls each transition requests.

pub mod action;
pub mod messages;
pub mod reducer;
pub mod state;
pub mod store;

pub use action::{Action, Effect, InitialAnalysis};
pub use reducer::reduce;
pub use state::{
    ClaimMappingState, OperationKind, OperationStatus, Outcome, Phase, SearchMode, SearchState,
    SearchView, SessionState,
};
pub use store::{Notifier, Store};
