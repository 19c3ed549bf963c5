//! Popup detection over a parsed UI hierarchy.
//!
//! The analyzer walks [`CANDIDATE_CONTAINERS`] in priority order, takes the
//! first node matching each tag, and classifies it by area against the
//! screen. The first candidate that classifies as a popup wins; its sub-tree
//! is then mined for text, clickable elements and images.
use crate::config::FetchConfig;
use crate::errors::{PopSentryError, PopSentryResult};
use crate::hierarchy::fetcher::HierarchyFetcher;
use crate::hierarchy::types::HierarchyDocument;
use crate::hierarchy::xpath::locate_first;
use crate::popup::extract::{extract_content, extract_images, extract_interactables};
use crate::popup::geometry::{measure, parse_bounds, GeometryError, Measurement};
use crate::popup::types::{AnalysisOutcome, PopupDetails, PopupResult};

/// Container tags that may host a popup, highest priority first.
pub const CANDIDATE_CONTAINERS: [&str; 4] = [
    "android.widget.FrameLayout",
    "android.app.Dialog",
    "android.widget.PopupWindow",
    "androidx.appcompat.app.AlertDialog",
];

/// Stateless apart from fetch settings; every call builds and drops its own tree.
#[derive(Debug, Clone, Default)]
pub struct PopupAnalyzer {
    fetcher: HierarchyFetcher,
}

impl PopupAnalyzer {
    pub fn new(fetch: FetchConfig) -> Self {
        Self {
            fetcher: HierarchyFetcher::new(fetch),
        }
    }

    /// Load `source` (URL, file path or markup) and analyze it.
    /// Fetch and parse failures are both returned as errors.
    pub fn analyze(&self, source: &str) -> PopSentryResult<PopupResult> {
        let document = self.fetcher.load(source)?;
        Ok(self.inspect(&document).into_result())
    }

    /// Like [`analyze`](Self::analyze), but a document that fails to parse is
    /// reported as [`AnalysisOutcome::Suppressed`]. Fetch failures still propagate.
    pub fn analyze_lenient(&self, source: &str) -> PopSentryResult<AnalysisOutcome> {
        match self.fetcher.load(source) {
            Ok(document) => Ok(self.inspect(&document)),
            Err(PopSentryError::Parse(reason)) => {
                tracing::warn!(reason = %reason, "hierarchy parse failed; reporting no popup");
                Ok(AnalysisOutcome::Suppressed { reason })
            }
            Err(e) => Err(e),
        }
    }

    /// Run candidate detection and extraction on an already parsed document.
    pub fn inspect(&self, document: &HierarchyDocument) -> AnalysisOutcome {
        let screen_width = document.screen_width();
        let screen_height = document.screen_height();
        let root = &document.root;

        for tag in CANDIDATE_CONTAINERS {
            let Some((candidate, xpath)) = locate_first(root, tag) else {
                continue;
            };

            let measurement = match classify(candidate.attr_or_empty("bounds"), screen_width, screen_height) {
                Ok(m) => m,
                Err(e) => {
                    tracing::debug!(tag = tag, error = %e, "candidate skipped");
                    continue;
                }
            };

            tracing::debug!(
                tag = tag,
                area_ratio = measurement.area_ratio,
                is_centered_x = measurement.is_centered_x,
                is_centered_y = measurement.is_centered_y,
                "candidate measured"
            );

            if !measurement.is_popup() {
                continue;
            }

            let result = PopupResult {
                is_popup: true,
                content: extract_content(candidate),
                interactable_elements: extract_interactables(candidate, &xpath),
                images: extract_images(candidate),
                details: Some(PopupDetails {
                    width: measurement.width,
                    height: measurement.height,
                    center_x: measurement.center_x,
                    center_y: measurement.center_y,
                }),
            };
            tracing::info!(
                tag = tag,
                xpath = %xpath,
                content = result.content.len(),
                interactable = result.interactable_elements.len(),
                images = result.images.len(),
                "popup detected"
            );
            return AnalysisOutcome::Detected(result);
        }

        tracing::info!(screen_width, screen_height, "no popup detected");
        AnalysisOutcome::NotDetected
    }
}

fn classify(bounds: &str, screen_width: i64, screen_height: i64) -> Result<Measurement, GeometryError> {
    let rect = parse_bounds(bounds)?;
    measure(rect, screen_width, screen_height)
}

/// Analyze `source` with default fetch settings.
pub fn analyze(source: &str) -> PopSentryResult<PopupResult> {
    PopupAnalyzer::default().analyze(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::parser::parse_hierarchy;

    fn inspect(xml: &str) -> AnalysisOutcome {
        PopupAnalyzer::default().inspect(&parse_hierarchy(xml).unwrap())
    }

    const DIALOG: &str = r#"<hierarchy width="1000" height="2000">
  <android.app.Dialog bounds="[100,500][900,1500]">
    <android.widget.TextView text="Allow access?" clickable="false"/>
    <android.widget.Button text="OK" clickable="true" resource-id="btn_ok"/>
  </android.app.Dialog>
</hierarchy>"#;

    #[test]
    fn dialog_example() {
        let result = analyze(DIALOG).unwrap();
        assert!(result.is_popup);
        assert_eq!(result.content, vec!["Allow access?"]);
        assert_eq!(result.interactable_elements.len(), 1);
        let ok = &result.interactable_elements[0];
        assert_eq!(ok.text, "OK");
        assert_eq!(ok.id, "btn_ok");
        assert_eq!(ok.element_type, "Button");
        assert!(ok.enabled);
        assert_eq!(ok.xpath, "/hierarchy/android.app.Dialog[1]/android.widget.Button[1]");
        assert!(result.images.is_empty());
        assert_eq!(
            result.details,
            Some(PopupDetails { width: 800, height: 1000, center_x: 500.0, center_y: 1000.0 })
        );
    }

    #[test]
    fn no_candidate_tags_means_no_popup() {
        let outcome = inspect(
            r#"<hierarchy width="1000" height="2000">
  <android.widget.LinearLayout bounds="[0,0][10,10]">
    <android.widget.Button text="OK" clickable="true"/>
  </android.widget.LinearLayout>
</hierarchy>"#,
        );
        assert_eq!(outcome, AnalysisOutcome::NotDetected);
        assert_eq!(outcome.into_result(), PopupResult::empty());
    }

    #[test]
    fn full_screen_frame_falls_through_to_dialog() {
        let outcome = inspect(
            r#"<hierarchy width="1000" height="2000">
  <android.widget.FrameLayout bounds="[0,0][1000,2000]">
    <android.app.Dialog bounds="[100,100][200,200]">
      <android.widget.TextView text="inner"/>
    </android.app.Dialog>
  </android.widget.FrameLayout>
</hierarchy>"#,
        );
        let AnalysisOutcome::Detected(result) = outcome else {
            panic!("expected a popup");
        };
        assert_eq!(result.content, vec!["inner"]);
        assert_eq!(result.details.unwrap().width, 100);
    }

    #[test]
    fn exactly_full_screen_is_not_a_popup() {
        let outcome = inspect(
            r#"<hierarchy width="1080" height="2400">
  <android.widget.FrameLayout bounds="[0,0][1080,2400]"><android.widget.TextView text="x"/></android.widget.FrameLayout>
</hierarchy>"#,
        );
        assert_eq!(outcome, AnalysisOutcome::NotDetected);
    }

    #[test]
    fn just_below_full_screen_in_a_corner_is_a_popup() {
        // 999 x 1000 on a 1000 x 1000 screen: ratio 0.999, anchored top-left.
        let outcome = inspect(
            r#"<hierarchy width="1000" height="1000">
  <android.widget.PopupWindow bounds="[0,0][999,1000]"/>
</hierarchy>"#,
        );
        assert!(outcome.is_detected());
    }

    #[test]
    fn malformed_bounds_do_not_stop_the_search() {
        let outcome = inspect(
            r#"<hierarchy width="1000" height="2000">
  <android.widget.FrameLayout bounds="garbage">
    <android.widget.TextView text="frame text"/>
  </android.widget.FrameLayout>
  <android.app.Dialog bounds="[0,0][500,500]">
    <android.widget.TextView text="dialog text"/>
  </android.app.Dialog>
</hierarchy>"#,
        );
        let result = outcome.into_result();
        assert!(result.is_popup);
        assert_eq!(result.content, vec!["dialog text"]);
    }

    #[test]
    fn missing_bounds_are_skipped_too() {
        let outcome = inspect(
            r#"<hierarchy width="1000" height="2000">
  <android.widget.FrameLayout/>
  <androidx.appcompat.app.AlertDialog bounds="[0,0][10,10]"/>
</hierarchy>"#,
        );
        assert!(outcome.is_detected());
    }

    #[test]
    fn zero_screen_never_classifies() {
        for root in [r#"<hierarchy width="0" height="0">"#, "<hierarchy>"] {
            let xml = format!(
                r#"{root}<android.app.Dialog bounds="[0,0][10,10]"/></hierarchy>"#
            );
            assert_eq!(inspect(&xml), AnalysisOutcome::NotDetected);
        }
    }

    #[test]
    fn only_first_match_per_tag_is_considered() {
        // The first FrameLayout is full screen; a later, smaller one is ignored.
        let outcome = inspect(
            r#"<hierarchy width="100" height="100">
  <android.widget.FrameLayout bounds="[0,0][100,100]"/>
  <android.widget.FrameLayout bounds="[10,10][20,20]"/>
</hierarchy>"#,
        );
        assert_eq!(outcome, AnalysisOutcome::NotDetected);
    }

    #[test]
    fn analysis_is_idempotent() {
        assert_eq!(analyze(DIALOG).unwrap(), analyze(DIALOG).unwrap());
    }

    #[test]
    fn parse_errors_propagate_or_are_suppressed() {
        let analyzer = PopupAnalyzer::default();
        assert!(matches!(analyzer.analyze("<broken"), Err(PopSentryError::Parse(_))));
        assert!(matches!(
            analyzer.analyze_lenient("<broken").unwrap(),
            AnalysisOutcome::Suppressed { .. }
        ));
    }

    #[test]
    fn fetch_errors_propagate_from_lenient_path() {
        let err = PopupAnalyzer::default()
            .analyze_lenient("http://127.0.0.1:9/window_dump.xml")
            .unwrap_err();
        assert!(matches!(err, PopSentryError::Fetch(_)));
    }
}
