use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{PopSentryError, PopSentryResult};
use crate::popup::types::{ActionDescriptor, PopupResult};

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").expect("code fence pattern is valid")
});

/// The model's verdict, relayed to the caller as `Agent-response`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Recommendation {
    #[serde(default, deserialize_with = "lenient_string")]
    pub popup_detection: String,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_metadata: Option<ElementMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ElementMetadata {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub element_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub element_details: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub resource_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub bounds: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub clickable: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub class_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub xpath: Option<String>,
}

impl Recommendation {
    pub fn popup_detected(&self) -> bool {
        self.popup_detection.trim().eq_ignore_ascii_case("yes")
    }

    /// Replace the model's XPath guess with the computed one when the chosen
    /// element can be matched to an analyzer descriptor: by resource id first,
    /// then bounds, then text. Returns whether a match was found.
    pub fn attach_xpath(&mut self, result: &PopupResult) -> bool {
        let Some(meta) = self.element_metadata.as_mut() else {
            return false;
        };
        let Some(action) = match_descriptor(meta, &result.interactable_elements) else {
            return false;
        };
        meta.xpath = Some(action.xpath.clone());
        true
    }
}

fn match_descriptor<'a>(meta: &ElementMetadata, actions: &'a [ActionDescriptor]) -> Option<&'a ActionDescriptor> {
    fn wanted(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    if let Some(id) = wanted(&meta.resource_id) {
        if let Some(hit) = actions.iter().find(|a| a.id == id) {
            return Some(hit);
        }
    }
    if let Some(bounds) = wanted(&meta.bounds) {
        if let Some(hit) = actions.iter().find(|a| a.bounds == bounds) {
            return Some(hit);
        }
    }
    let text = wanted(&meta.text)?;
    actions.iter().find(|a| a.text == text)
}

/// Parse the model's reply, tolerating a surrounding Markdown code fence.
pub fn parse_reply(content: &str) -> PopSentryResult<Recommendation> {
    let cleaned = match CODE_FENCE.captures(content) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => content.trim(),
    };
    serde_json::from_str(cleaned).map_err(|e| {
        PopSentryError::Advisor(format!(
            "Failed to parse AI message content as JSON ({e}). Content: {content}"
        ))
    })
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(id: &str, bounds: &str, text: &str, xpath: &str) -> ActionDescriptor {
        ActionDescriptor {
            text: text.into(),
            id: id.into(),
            element_type: "Button".into(),
            bounds: bounds.into(),
            content_desc: String::new(),
            enabled: true,
            focused: false,
            scrollable: false,
            long_clickable: false,
            password: false,
            selected: false,
            xpath: xpath.into(),
        }
    }

    #[test]
    fn strips_json_fence() {
        let reply = "```json\n{\"popup_detection\": \"Yes\", \"suggested_action\": \"Tap Allow\"}\n```";
        let rec = parse_reply(reply).unwrap();
        assert!(rec.popup_detected());
        assert_eq!(rec.suggested_action.as_deref(), Some("Tap Allow"));
        assert!(rec.element_metadata.is_none());
    }

    #[test]
    fn accepts_bare_json_and_non_string_fields() {
        let rec = parse_reply(
            r#" {"popup_detection": "No", "element_metadata": {"clickable": true, "bounds": null}} "#,
        )
        .unwrap();
        assert!(!rec.popup_detected());
        let meta = rec.element_metadata.unwrap();
        assert_eq!(meta.clickable.as_deref(), Some("true"));
        assert!(meta.bounds.is_none());
    }

    #[test]
    fn popup_verdict_ignores_case_and_padding() {
        let verdict = |v: &str| Recommendation {
            popup_detection: v.into(),
            ..Default::default()
        }
        .popup_detected();
        assert!(verdict(" YES "));
        assert!(verdict("yes"));
        assert!(!verdict("No"));
        assert!(!verdict(""));
        assert!(!verdict("Yes, a dialog"));
    }

    #[test]
    fn prose_is_an_advisor_error() {
        let err = parse_reply("NO POP-UP DETECTED").unwrap_err();
        assert!(matches!(err, PopSentryError::Advisor(ref m) if m.contains("NO POP-UP DETECTED")));
    }

    #[test]
    fn xpath_matched_by_id_then_bounds_then_text() {
        let result = PopupResult {
            is_popup: true,
            interactable_elements: vec![
                action("deny", "[0,0][1,1]", "Deny", "/h/a[1]"),
                action("", "[2,2][3,3]", "Allow", "/h/a[2]"),
            ],
            ..PopupResult::empty()
        };

        let mut by_id = Recommendation {
            element_metadata: Some(ElementMetadata {
                resource_id: Some("deny".into()),
                xpath: Some("//guess".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(by_id.attach_xpath(&result));
        assert_eq!(by_id.element_metadata.unwrap().xpath.as_deref(), Some("/h/a[1]"));

        let mut by_bounds = Recommendation {
            element_metadata: Some(ElementMetadata {
                resource_id: Some("unknown".into()),
                bounds: Some("[2,2][3,3]".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(by_bounds.attach_xpath(&result));
        assert_eq!(by_bounds.element_metadata.unwrap().xpath.as_deref(), Some("/h/a[2]"));

        let mut by_text = Recommendation {
            element_metadata: Some(ElementMetadata {
                text: Some(" Allow ".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(by_text.attach_xpath(&result));

        let mut unmatched = Recommendation {
            element_metadata: Some(ElementMetadata {
                text: Some("Later".into()),
                xpath: Some("//guess".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(!unmatched.attach_xpath(&result));
        assert_eq!(unmatched.element_metadata.unwrap().xpath.as_deref(), Some("//guess"));
    }
}
