use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Session-scoped visitor metadata, captured once when the conversation
/// starts and attached unchanged to every lead submitted in that session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionContext {
    pub path: String,
    pub referrer: Option<String>,
    pub utm: BTreeMap<String, String>,
}

impl SubmissionContext {
    /// `query` is the raw query string of the entry location (without the
    /// leading `?`); only `utm_*` parameters are retained.
    pub fn capture(
        path: impl Into<String>,
        referrer: Option<String>,
        query: Option<&str>,
    ) -> Self {
        Self {
            path: path.into(),
            referrer: referrer.filter(|value| !value.is_empty()),
            utm: query.map(parse_utm_params).unwrap_or_default(),
        }
    }
}

fn parse_utm_params(query: &str) -> BTreeMap<String, String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, _)| key.starts_with("utm_"))
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::SubmissionContext;

    #[test]
    fn captures_only_utm_parameters() {
        let context = SubmissionContext::capture(
            "/pricing",
            Some("https://search.example".to_owned()),
            Some("utm_source=newsletter&utm_campaign=q3&page=2"),
        );

        assert_eq!(context.path, "/pricing");
        assert_eq!(context.referrer.as_deref(), Some("https://search.example"));
        assert_eq!(context.utm.len(), 2);
        assert_eq!(context.utm.get("utm_source").map(String::as_str), Some("newsletter"));
        assert!(!context.utm.contains_key("page"));
    }

    #[test]
    fn empty_referrer_and_missing_query_are_absent() {
        let context = SubmissionContext::capture("/", Some(String::new()), None);
        assert_eq!(context.referrer, None);
        assert!(context.utm.is_empty());
    }

    #[test]
    fn duplicate_utm_keys_keep_the_last_value() {
        let context =
            SubmissionContext::capture("/", None, Some("utm_source=a&utm_source=b"));
        assert_eq!(context.utm.get("utm_source").map(String::as_str), Some("b"));
    }
}
