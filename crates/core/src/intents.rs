use serde::{Deserialize, Serialize};

use crate::dialogue::LeadKind;

/// Category an input was classified into. `Fallback` is structurally
/// separate in [`RuleSet`], so every input resolves to exactly one key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKey {
    Pricing,
    Support,
    Services,
    Hours,
    Contact,
    Human,
    Thanks,
    Goodbye,
    Greeting,
    Fallback,
}

/// Matching is containment over normalized text: multi-word patterns match
/// as substrings, single words match whole tokens only (so "hi" does not
/// fire inside "this").
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Matcher {
    AnyOf(&'static [&'static str]),
    Always,
}

impl Matcher {
    fn matches(&self, normalized: &str, tokens: &[&str]) -> bool {
        match self {
            Self::AnyOf(patterns) => patterns.iter().any(|pattern| {
                if pattern.contains(' ') {
                    normalized.contains(pattern)
                } else {
                    tokens.contains(pattern)
                }
            }),
            Self::Always => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntentRule {
    pub key: IntentKey,
    matcher: Matcher,
    reply: &'static str,
    suggestions: &'static [&'static str],
    transition: Option<LeadKind>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub key: IntentKey,
    pub reply: String,
    pub suggestions: Vec<String>,
    pub transition: Option<LeadKind>,
}

/// Ordered intent rules, first-match-wins. The fallback rule is a separate
/// field rather than a list entry, so `classify` is total by construction.
#[derive(Clone, Debug)]
pub struct RuleSet {
    rules: Vec<IntentRule>,
    fallback: IntentRule,
}

impl RuleSet {
    pub fn classify(&self, text: &str) -> Classification {
        let normalized = normalize_text(text);
        let tokens = tokenize(&normalized);
        let rule = self
            .rules
            .iter()
            .find(|rule| rule.matcher.matches(&normalized, &tokens))
            .unwrap_or(&self.fallback);

        Classification {
            key: rule.key,
            reply: rule.reply.to_string(),
            suggestions: rule.suggestions.iter().map(|s| (*s).to_string()).collect(),
            transition: rule.transition,
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        builtin_rules()
    }
}

pub fn normalize_text(text: &str) -> String {
    text.trim().to_ascii_lowercase()
}

fn tokenize(normalized: &str) -> Vec<&str> {
    normalized
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect()
}

/// The rule table for the managed-IT marketing assistant. Order matters:
/// pricing and support outrank the softer intents so "how much does your
/// support plan cost" lands on the quote path.
fn builtin_rules() -> RuleSet {
    let rules = vec![
        IntentRule {
            key: IntentKey::Pricing,
            matcher: Matcher::AnyOf(&[
                "pricing", "price", "prices", "cost", "costs", "quote", "how much", "rates",
                "estimate",
            ]),
            reply: "Our plans are tailored to your team size and systems, so pricing starts \
                    with a quick quote. I can collect a few details and have one prepared \
                    for you.",
            suggestions: &["Yes, get me a quote", "Not right now"],
            transition: Some(LeadKind::Quote),
        },
        IntentRule {
            key: IntentKey::Support,
            matcher: Matcher::AnyOf(&[
                "support",
                "helpdesk",
                "help desk",
                "issue",
                "problem",
                "broken",
                "ticket",
                "outage",
                "not working",
                "down",
            ]),
            reply: "Sorry to hear something's up. I can open a support request for our \
                    engineers right from here.",
            suggestions: &["Yes, open a request", "No thanks"],
            transition: Some(LeadKind::Support),
        },
        IntentRule {
            key: IntentKey::Services,
            matcher: Matcher::AnyOf(&[
                "services", "service", "offer", "offering", "msp", "managed", "backup",
                "security", "cloud", "what do you do",
            ]),
            reply: "We handle end-to-end IT for small and mid-size teams: 24/7 monitoring, \
                    helpdesk, cloud and email management, backups, and security hardening.",
            suggestions: &["Pricing", "Talk to a human"],
            transition: None,
        },
        IntentRule {
            key: IntentKey::Hours,
            matcher: Matcher::AnyOf(&["hours", "open", "availability", "available", "weekend"]),
            reply: "Our helpdesk is staffed 24/7 for clients on a managed plan. The office \
                    team is around Monday to Friday, 8am to 6pm.",
            suggestions: &["Services", "Contact"],
            transition: None,
        },
        IntentRule {
            key: IntentKey::Contact,
            matcher: Matcher::AnyOf(&["contact", "email", "phone", "call", "reach", "address"]),
            reply: "You can reach us at hello@example-it.com or (555) 010-4400 - or keep \
                    chatting here and I'll route things for you.",
            suggestions: &["Get a quote", "Open a support request"],
            transition: None,
        },
        IntentRule {
            key: IntentKey::Human,
            matcher: Matcher::AnyOf(&["human", "agent", "person", "representative", "someone"]),
            reply: "Happy to hand you over. Leave your details via a quote or support \
                    request and a real person will follow up the same business day.",
            suggestions: &["Get a quote", "Open a support request"],
            transition: None,
        },
        IntentRule {
            key: IntentKey::Thanks,
            matcher: Matcher::AnyOf(&["thanks", "thank you", "appreciate", "cheers"]),
            reply: "Any time! Anything else I can help with?",
            suggestions: &["Services", "Pricing"],
            transition: None,
        },
        IntentRule {
            key: IntentKey::Goodbye,
            matcher: Matcher::AnyOf(&["bye", "goodbye", "see you", "later"]),
            reply: "Thanks for stopping by - we're here whenever you need us.",
            suggestions: &[],
            transition: None,
        },
        IntentRule {
            key: IntentKey::Greeting,
            matcher: Matcher::AnyOf(&["hello", "hi", "hey", "good morning", "good afternoon"]),
            reply: "Hi there! I'm AutoBot. Ask me about our services, pricing, or open a \
                    support request.",
            suggestions: &["Services", "Pricing", "Support"],
            transition: None,
        },
    ];

    let fallback = IntentRule {
        key: IntentKey::Fallback,
        matcher: Matcher::Always,
        reply: "I'm not sure I caught that. I can tell you about our services, put \
                together a quote, or open a support request.",
        suggestions: &["Services", "Pricing", "Support"],
        transition: None,
    };

    RuleSet { rules, fallback }
}
