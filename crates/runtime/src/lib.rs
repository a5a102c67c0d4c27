//! AutoBot runtime - session orchestration around the pure core
//!
//! The core decides what to say; this crate makes it happen in order:
//! appending to the durable transcript, routing slash commands ahead of
//! classification, dispatching completed collections to the lead
//! submission pipeline, and pacing assistant replies through a single-slot
//! cancellable typing delay.

pub mod bootstrap;
pub mod context;
pub mod runtime;
pub mod scheduler;
pub mod submit;

pub use bootstrap::{bootstrap, bootstrap_with_config, Application, BootstrapError};
pub use context::SubmissionContext;
pub use runtime::{ChatRuntime, TurnReport};
pub use scheduler::ReplyScheduler;
pub use submit::{
    HttpLeadTransport, LeadSubmission, LeadTransport, NoopLeadTransport, SubmissionOutcome,
    SubmissionPipeline, TransportError,
};
