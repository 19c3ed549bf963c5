use std::sync::Arc;

use crate::advisor::image::{data_url, encode_image};
use crate::advisor::prompts::{HIERARCHY_PROMPT, SCREENSHOT_PROMPT};
use crate::advisor::reply::{parse_reply, Recommendation};
use crate::advisor::request::{InvokeRequest, ScreenInput};
use crate::config::FetchConfig;
use crate::errors::{PopSentryError, PopSentryResult};
use crate::llm::registry::{ProviderRegistry, Role};
use crate::llm::types::{ChatMessage, ContentPart, ImageUrl};
use crate::popup::analyzer::PopupAnalyzer;
use crate::popup::types::{AnalysisOutcome, PopupResult};

/// Turns one screen (screenshot or hierarchy) plus a test-case description into
/// a single recommended next action.
pub struct PopupAdvisor {
    registry: Arc<ProviderRegistry>,
    fetch: FetchConfig,
    http: reqwest::Client,
}

impl PopupAdvisor {
    pub fn new(registry: Arc<ProviderRegistry>, fetch: FetchConfig) -> Self {
        Self {
            registry,
            fetch,
            http: reqwest::Client::new(),
        }
    }

    pub async fn advise(&self, request: &InvokeRequest) -> PopSentryResult<Recommendation> {
        let input = request.screen_input()?;
        let role = match input {
            ScreenInput::Screenshot(_) => Role::Vision,
            ScreenInput::Hierarchy(_) => Role::Hierarchy,
        };

        let (provider, call) = self.registry.call_config_for_role(role)?;
        if !provider.has_credentials() {
            return Err(PopSentryError::Config(format!(
                "API key not found for provider '{}'. Please check the configuration.",
                provider.name()
            )));
        }

        let (messages, analysis) = match input {
            ScreenInput::Screenshot(source) => {
                let encoded = encode_image(&self.http, &source).await?;
                (screenshot_messages(&request.testcase_dec, &encoded), None)
            }
            ScreenInput::Hierarchy(source) => {
                let result = self.analyze_hierarchy(source).await?;
                (hierarchy_messages(&request.testcase_dec, &result)?, Some(result))
            }
        };

        let reply = provider.chat(messages, &call).await?;
        tracing::debug!(content = %reply.content, "advisor reply");

        let mut recommendation = parse_reply(&reply.content)?;
        if let Some(result) = &analysis {
            let matched = recommendation.attach_xpath(result);
            tracing::debug!(matched, "computed xpath attached");
        }

        tracing::info!(
            role = role.as_str(),
            popup = recommendation.popup_detected(),
            resource_id = ?recommendation
                .element_metadata
                .as_ref()
                .and_then(|m| m.resource_id.as_deref()),
            "recommendation ready"
        );
        Ok(recommendation)
    }

    /// Fetch, parse and analyze on the blocking pool. Parse failures come back
    /// as an empty result; fetch failures are errors.
    async fn analyze_hierarchy(&self, source: String) -> PopSentryResult<PopupResult> {
        let analyzer = PopupAnalyzer::new(self.fetch.clone());
        let outcome = tokio::task::spawn_blocking(move || analyzer.analyze_lenient(&source))
            .await
            .map_err(|e| PopSentryError::Advisor(format!("analysis task failed: {e}")))??;

        match &outcome {
            AnalysisOutcome::Detected(_) => {}
            AnalysisOutcome::NotDetected => tracing::debug!("analyzer found no popup"),
            AnalysisOutcome::Suppressed { .. } => tracing::debug!("sending empty analysis"),
        }
        Ok(outcome.into_result())
    }
}

pub fn screenshot_messages(testcase: &str, encoded_image: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SCREENSHOT_PROMPT),
        ChatMessage::user(format!("test-case description: {testcase}")),
        ChatMessage::user_parts(vec![
            ContentPart::Text {
                text: "this is the screenshot of the current screen".into(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: data_url(encoded_image),
                },
            },
        ]),
    ]
}

pub fn hierarchy_messages(testcase: &str, result: &PopupResult) -> PopSentryResult<Vec<ChatMessage>> {
    let analysis = serde_json::to_string(result)?;
    Ok(vec![
        ChatMessage::system(HIERARCHY_PROMPT),
        ChatMessage::user(format!("test-case description: {testcase}")),
        ChatMessage::user(format!("this is the output from the pop-up detector: {analysis}")),
    ])
}
