use thiserror::Error;

use crate::dialogue::LeadKind;

/// One step of guided collection. The sequence for a lead kind is fixed and
/// consumed strictly left to right; collection cannot complete while any
/// field lacks a value its validator accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub prompt: &'static str,
    pub validator: FieldValidator,
}

/// Total, pure predicates over raw input. Accepted values are returned in
/// canonical form (trimmed; counts re-rendered as plain digits).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValidator {
    NonEmpty,
    Email,
    CountRange { max: u32 },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FieldRejection {
    #[error("that looked empty - could you type it out for me?")]
    Empty,
    #[error("`{0}` doesn't look like an email address. Something like name@company.com works.")]
    NotEmail(String),
    #[error("I need a number there - roughly how many, as digits?")]
    NotANumber,
    #[error("that number seems off - I can take anything from 1 to {max}.")]
    OutOfRange { max: u32 },
}

impl FieldValidator {
    pub fn validate(&self, raw: &str) -> Result<String, FieldRejection> {
        let trimmed = raw.trim();
        match self {
            Self::NonEmpty => {
                if trimmed.is_empty() {
                    Err(FieldRejection::Empty)
                } else {
                    Ok(trimmed.to_owned())
                }
            }
            Self::Email => {
                if looks_like_email(trimmed) {
                    Ok(trimmed.to_owned())
                } else if trimmed.is_empty() {
                    Err(FieldRejection::Empty)
                } else {
                    Err(FieldRejection::NotEmail(trimmed.to_owned()))
                }
            }
            Self::CountRange { max } => {
                let digits = trimmed.trim_start_matches('~').trim();
                let count =
                    digits.parse::<u32>().map_err(|_| FieldRejection::NotANumber)?;
                if count == 0 || count > *max {
                    Err(FieldRejection::OutOfRange { max: *max })
                } else {
                    Ok(count.to_string())
                }
            }
        }
    }
}

fn looks_like_email(raw: &str) -> bool {
    if raw.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@')
}

/// Upper bound for "roughly how many users" answers.
const MAX_USER_COUNT: u32 = 100_000;

pub fn fields_for(kind: LeadKind) -> &'static [FieldSpec] {
    match kind {
        LeadKind::Quote => QUOTE_FIELDS,
        LeadKind::Support => SUPPORT_FIELDS,
    }
}

static QUOTE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "name",
        label: "Name",
        prompt: "First things first - what's your name?",
        validator: FieldValidator::NonEmpty,
    },
    FieldSpec {
        key: "email",
        label: "Work email",
        prompt: "What's the best email to send the quote to?",
        validator: FieldValidator::Email,
    },
    FieldSpec {
        key: "company",
        label: "Company",
        prompt: "Which company is this for?",
        validator: FieldValidator::NonEmpty,
    },
    FieldSpec {
        key: "user_count",
        label: "Approximate users",
        prompt: "Roughly how many people use computers at your company?",
        validator: FieldValidator::CountRange { max: MAX_USER_COUNT },
    },
];

static SUPPORT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "name",
        label: "Name",
        prompt: "Who am I opening this for - what's your name?",
        validator: FieldValidator::NonEmpty,
    },
    FieldSpec {
        key: "email",
        label: "Work email",
        prompt: "What email should our engineers reply to?",
        validator: FieldValidator::Email,
    },
    FieldSpec {
        key: "issue",
        label: "Issue summary",
        prompt: "In a sentence or two, what's going wrong?",
        validator: FieldValidator::NonEmpty,
    },
];

#[cfg(test)]
mod tests {
    use super::{fields_for, FieldRejection, FieldValidator};
    use crate::dialogue::LeadKind;

    #[test]
    fn non_empty_rejects_whitespace_and_trims() {
        let validator = FieldValidator::NonEmpty;
        assert_eq!(validator.validate("   "), Err(FieldRejection::Empty));
        assert_eq!(validator.validate("  Ada  "), Ok("Ada".to_owned()));
    }

    #[test]
    fn email_shape_check() {
        let validator = FieldValidator::Email;
        assert!(validator.validate("ada@example.com").is_ok());
        assert!(validator.validate("  ada@example.co.uk ").is_ok());
        assert_eq!(
            validator.validate("not-an-email"),
            Err(FieldRejection::NotEmail("not-an-email".to_owned()))
        );
        assert!(validator.validate("@example.com").is_err());
        assert!(validator.validate("ada@nodot").is_err());
        assert!(validator.validate("ada smith@example.com").is_err());
        assert_eq!(validator.validate(""), Err(FieldRejection::Empty));
    }

    #[test]
    fn count_range_accepts_small_positive_integers() {
        let validator = FieldValidator::CountRange { max: 500 };
        assert_eq!(validator.validate("25"), Ok("25".to_owned()));
        assert_eq!(validator.validate("~40"), Ok("40".to_owned()));
        assert_eq!(validator.validate("500"), Ok("500".to_owned()));
        assert_eq!(validator.validate("0"), Err(FieldRejection::OutOfRange { max: 500 }));
        assert_eq!(validator.validate("501"), Err(FieldRejection::OutOfRange { max: 500 }));
        assert_eq!(validator.validate("a few"), Err(FieldRejection::NotANumber));
    }

    #[test]
    fn field_tables_have_unique_keys_in_declaration_order() {
        for kind in [LeadKind::Quote, LeadKind::Support] {
            let specs = fields_for(kind);
            assert!(!specs.is_empty());
            for (index, spec) in specs.iter().enumerate() {
                assert!(
                    !specs[..index].iter().any(|earlier| earlier.key == spec.key),
                    "duplicate field key {} for {kind:?}",
                    spec.key
                );
            }
        }
    }
}
