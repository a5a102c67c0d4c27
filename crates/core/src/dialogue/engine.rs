use crate::dialogue::states::{DialogueMode, DialogueSession, LeadKind, TurnEffect, TurnOutcome};
use crate::fields::fields_for;
use crate::intents::{normalize_text, RuleSet};

/// Drives one conversational turn against the current session mode. All
/// transitions are pure with respect to the rule and field tables; the
/// returned [`TurnOutcome`] carries any requested side effect instead of
/// performing it.
#[derive(Clone, Debug, Default)]
pub struct DialogueEngine {
    rules: RuleSet,
}

enum GateAnswer {
    Affirmative,
    Negative,
    Unclear,
}

impl DialogueEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn handle_turn(&self, session: &mut DialogueSession, text: &str) -> TurnOutcome {
        match session.mode.clone() {
            DialogueMode::Chat => self.chat_turn(session, text),
            DialogueMode::ConfirmationGate { kind } => gate_turn(session, kind, text),
            DialogueMode::Collecting { kind, field_index } => {
                collect_turn(session, kind, field_index, text)
            }
        }
    }

    fn chat_turn(&self, session: &mut DialogueSession, text: &str) -> TurnOutcome {
        let classification = self.rules.classify(text);
        let mut outcome = TurnOutcome {
            replies: vec![classification.reply],
            suggestions: classification.suggestions,
            effect: None,
        };

        if let Some(kind) = classification.transition {
            session.mode = DialogueMode::ConfirmationGate { kind };
            outcome.replies.push(gate_prompt(kind).to_owned());
        }

        outcome
    }
}

fn gate_turn(session: &mut DialogueSession, kind: LeadKind, text: &str) -> TurnOutcome {
    match read_gate_answer(text) {
        GateAnswer::Affirmative => {
            // A fresh acceptance always restarts collection from the top;
            // leftovers from an abandoned run are discarded, not merged.
            session.clear_collected();
            session.mode = DialogueMode::Collecting { kind, field_index: 0 };
            let first = &fields_for(kind)[0];
            TurnOutcome {
                replies: vec![collection_intro(kind).to_owned(), first.prompt.to_owned()],
                ..TurnOutcome::default()
            }
        }
        GateAnswer::Negative => {
            session.mode = DialogueMode::Chat;
            TurnOutcome::reply("No problem - I'm here if you change your mind.")
        }
        GateAnswer::Unclear => {
            // Stay in the gate; this is a loop, not a failure.
            TurnOutcome::reply(format!("Just a quick yes or no: {}", gate_prompt(kind)))
        }
    }
}

fn collect_turn(
    session: &mut DialogueSession,
    kind: LeadKind,
    field_index: usize,
    text: &str,
) -> TurnOutcome {
    let specs = fields_for(kind);
    let spec = &specs[field_index];

    match spec.validator.validate(text) {
        Err(rejection) => TurnOutcome {
            replies: vec![rejection.to_string(), spec.prompt.to_owned()],
            ..TurnOutcome::default()
        },
        Ok(value) => {
            session.collected.push((spec.key.to_owned(), value));
            let next_index = field_index + 1;

            if let Some(next) = specs.get(next_index) {
                session.mode = DialogueMode::Collecting { kind, field_index: next_index };
                TurnOutcome::reply(next.prompt)
            } else {
                // Collection complete: back to chat, hand the validated
                // fields to the submission pipeline. The session keeps its
                // copy until the runtime sees a successful submit.
                session.mode = DialogueMode::Chat;
                TurnOutcome {
                    replies: vec![
                        "Perfect, that's everything I need - sending it over now.".to_owned(),
                    ],
                    suggestions: Vec::new(),
                    effect: Some(TurnEffect::SubmitLead {
                        kind,
                        fields: session.collected.clone(),
                    }),
                }
            }
        }
    }
}

fn gate_prompt(kind: LeadKind) -> &'static str {
    match kind {
        LeadKind::Quote => "Shall I put a quick quote together for you? (yes/no)",
        LeadKind::Support => "Want me to open a support request now? (yes/no)",
    }
}

fn collection_intro(kind: LeadKind) -> &'static str {
    match kind {
        LeadKind::Quote => "Great - four quick questions and we're done.",
        LeadKind::Support => "On it - three quick questions and I'll raise the request.",
    }
}

const AFFIRMATIVE: &[&str] = &["yes", "y", "yeah", "yep", "ok", "okay", "sure", "yes please"];
const NEGATIVE: &[&str] = &["no", "n", "nope", "nah", "later", "not now", "no thanks"];

fn read_gate_answer(text: &str) -> GateAnswer {
    let normalized = normalize_text(text);
    let normalized = normalized.trim_matches(|ch: char| ch.is_ascii_punctuation() && ch != '/');

    if AFFIRMATIVE.contains(&normalized) {
        GateAnswer::Affirmative
    } else if NEGATIVE.contains(&normalized) {
        GateAnswer::Negative
    } else {
        GateAnswer::Unclear
    }
}
