//! Extraction passes over a matched popup sub-tree. Each pass is independent
//! and only looks at the descendants of the popup node, never the node itself.

use std::ops::ControlFlow;

use crate::hierarchy::types::Node;
use crate::hierarchy::xpath::{join_xpath, walk_descendants};
use crate::popup::types::{ActionDescriptor, ImageDescriptor};

/// Image-like tags, in the order their matches are reported.
pub const IMAGE_TAGS: [&str; 3] = [
    "android.widget.ImageView",
    "android.widget.ImageButton",
    "android.widget.Image",
];

/// Non-empty `text` of every descendant that is not clickable, in document order.
pub fn extract_content(popup: &Node) -> Vec<String> {
    popup
        .descendants()
        .filter(|n| !n.flag("clickable", false))
        .filter_map(|n| n.attr("text"))
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every descendant with `clickable="true"`, in document order. `popup_xpath` is the
/// popup node's own XPath so descriptors can carry document-wide paths.
pub fn extract_interactables(popup: &Node, popup_xpath: &str) -> Vec<ActionDescriptor> {
    let mut actions = Vec::new();
    walk_descendants(popup, |n, steps| {
        if n.flag("clickable", false) {
            actions.push(ActionDescriptor {
                text: n.attr_or_empty("text").to_string(),
                id: n.attr_or_empty("resource-id").to_string(),
                element_type: n.short_type().to_string(),
                bounds: n.attr_or_empty("bounds").to_string(),
                content_desc: n.attr_or_empty("content-desc").to_string(),
                enabled: n.flag("enabled", true),
                focused: n.flag("focused", false),
                scrollable: n.flag("scrollable", false),
                long_clickable: n.flag("long-clickable", false),
                password: n.flag("password", false),
                selected: n.flag("selected", false),
                xpath: join_xpath(popup_xpath, steps),
            });
        }
        ControlFlow::<()>::Continue(())
    });
    actions
}

/// Image descendants grouped by [`IMAGE_TAGS`] order, document order within a tag.
/// An image is kept only if it has a resource id, a content description or a `src`.
pub fn extract_images(popup: &Node) -> Vec<ImageDescriptor> {
    IMAGE_TAGS
        .iter()
        .flat_map(|tag| popup.descendants().filter(move |n| n.tag == *tag))
        .filter(|n| {
            !n.attr_or_empty("resource-id").is_empty()
                || !n.attr_or_empty("content-desc").is_empty()
                || !n.attr_or_empty("src").is_empty()
        })
        .map(|n| ImageDescriptor {
            resource_id: n.attr_or_empty("resource-id").to_string(),
            content_desc: n.attr_or_empty("content-desc").to_string(),
            bounds: n.attr_or_empty("bounds").to_string(),
        })
        .collect()
}
