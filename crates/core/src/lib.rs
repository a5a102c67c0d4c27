//! AutoBot core - deterministic conversation logic
//!
//! This crate holds everything about the assistant that can be decided
//! without IO: the message model, the intent rule table, slash-command
//! parsing, the guided-collection field tables, and the dialogue state
//! machine that ties them together.
//!
//! # Key Types
//!
//! - `DialogueEngine` / `DialogueSession` - the per-conversation state
//!   machine (see `dialogue`)
//! - `RuleSet` - ordered intent rules with a structurally mandatory
//!   fallback, so classification is total
//! - `FieldSpec` - the typed, validated fields collected before a lead
//!   is submitted
//!
//! # Determinism Principle
//!
//! Classification and dialogue transitions are pure functions of their
//! inputs. There is no scoring and no model call; identical input always
//! produces the identical reply, which is what makes the conversation
//! replayable in tests.

pub mod commands;
pub mod config;
pub mod dialogue;
pub mod fields;
pub mod intents;
pub mod message;

pub use commands::SlashCommand;
pub use config::{AppConfig, ConfigError, LoadOptions, LogFormat};
pub use dialogue::{
    DialogueEngine, DialogueMode, DialogueSession, LeadKind, TurnEffect, TurnOutcome,
};
pub use fields::{FieldRejection, FieldSpec, FieldValidator};
pub use intents::{Classification, IntentKey, RuleSet};
pub use message::{Message, MessageId, Sender};
