pub mod engine;
pub mod states;

pub use engine::DialogueEngine;
pub use states::{DialogueMode, DialogueSession, LeadKind, TurnEffect, TurnOutcome};
