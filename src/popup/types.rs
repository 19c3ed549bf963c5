use serde::{Deserialize, Serialize, Serializer};

/// Analyzer output for one screen.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct PopupResult {
    pub is_popup: bool,
    /// Non-clickable text inside the popup sub-tree, document order.
    pub content: Vec<String>,
    pub interactable_elements: Vec<ActionDescriptor>,
    pub images: Vec<ImageDescriptor>,
    /// Geometry of the matched popup; serialized as `{}` when absent.
    #[serde(serialize_with = "details_or_empty")]
    pub details: Option<PopupDetails>,
}

impl PopupResult {
    /// The record for "no popup": every list and `details` empty.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopupDetails {
    pub width: i64,
    pub height: i64,
    pub center_x: f64,
    pub center_y: f64,
}

/// A clickable node the execution agent could act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub text: String,
    /// `resource-id` attribute.
    pub id: String,
    /// Last dot-segment of the tag, e.g. `Button`.
    #[serde(rename = "type")]
    pub element_type: String,
    pub bounds: String,
    pub content_desc: String,
    pub enabled: bool,
    pub focused: bool,
    pub scrollable: bool,
    pub long_clickable: bool,
    pub password: bool,
    pub selected: bool,
    /// Hierarchical XPath of the node in the full document.
    pub xpath: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub resource_id: String,
    pub content_desc: String,
    pub bounds: String,
}

/// How an analysis ended. Lets callers tell "found nothing" apart from
/// "an error was swallowed" while still collapsing both to an empty record.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Detected(PopupResult),
    NotDetected,
    /// The document could not be parsed; recovered as "no popup".
    Suppressed { reason: String },
}

impl AnalysisOutcome {
    pub fn is_detected(&self) -> bool {
        matches!(self, AnalysisOutcome::Detected(_))
    }

    pub fn into_result(self) -> PopupResult {
        match self {
            AnalysisOutcome::Detected(result) => result,
            AnalysisOutcome::NotDetected | AnalysisOutcome::Suppressed { .. } => PopupResult::empty(),
        }
    }
}

fn details_or_empty<S>(details: &Option<PopupDetails>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match details {
        Some(d) => d.serialize(serializer),
        None => serde_json::Map::new().serialize(serializer),
    }
}
