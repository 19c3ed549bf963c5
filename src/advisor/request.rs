use serde::{Deserialize, Serialize};

use crate::errors::{PopSentryError, PopSentryResult};

/// Body of `POST /invoke`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InvokeRequest {
    /// Screenshot URL or file path.
    #[serde(default)]
    pub image: Option<String>,
    /// Free-text description of the test case being executed.
    #[serde(alias = "testcase_desc")]
    pub testcase_dec: String,
    /// Hierarchy URL, file path or inline markup.
    #[serde(default)]
    pub xml: Option<String>,
}

/// The one screen representation a request carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenInput {
    Screenshot(String),
    Hierarchy(String),
}

impl InvokeRequest {
    /// Exactly one of `image` / `xml` must be present; empty strings count as absent.
    pub fn screen_input(&self) -> PopSentryResult<ScreenInput> {
        let image = self.image.as_deref().filter(|s| !s.is_empty());
        let xml = self.xml.as_deref().filter(|s| !s.is_empty());
        match (image, xml) {
            (Some(_), Some(_)) => Err(PopSentryError::ConflictingInput(
                "Both image and xml were provided. Please provide only one.".into(),
            )),
            (Some(image), None) => Ok(ScreenInput::Screenshot(image.to_string())),
            (None, Some(xml)) => Ok(ScreenInput::Hierarchy(xml.to_string())),
            (None, None) => Err(PopSentryError::MissingInput(
                "Either image or xml must be provided.".into(),
            )),
        }
    }
}
