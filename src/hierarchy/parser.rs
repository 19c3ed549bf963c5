//! Builds a [`HierarchyDocument`] from UI dump markup with quick_xml.
//!
//! Only elements and their attributes are kept. Text content, comments,
//! processing instructions and the XML declaration are ignored.
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::{PopSentryError, PopSentryResult};
use crate::hierarchy::types::{HierarchyDocument, Node};

pub fn parse_hierarchy(xml: &str) -> PopSentryResult<HierarchyDocument> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut open: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if open.is_empty() && root.is_some() {
                    return Err(parse_error("multiple root elements", reader.buffer_position()));
                }
                open.push(node_from_start(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                let node = node_from_start(e)?;
                attach(node, &mut open, &mut root, reader.buffer_position())?;
            }
            Ok(Event::End(_)) => {
                let node = open
                    .pop()
                    .ok_or_else(|| parse_error("unexpected closing tag", reader.buffer_position()))?;
                attach(node, &mut open, &mut root, reader.buffer_position())?;
            }
            Ok(Event::Text(ref t)) => {
                if open.is_empty() && t.iter().any(|b| !b.is_ascii_whitespace()) {
                    return Err(parse_error("text outside the root element", reader.buffer_position()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(PopSentryError::Parse(format!(
                    "{e} (at byte {})",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(PopSentryError::Parse(format!(
            "unclosed element <{}> at end of input",
            unclosed.tag
        )));
    }

    let root = root.ok_or_else(|| PopSentryError::Parse("no root element".into()))?;
    tracing::debug!(root = %root.tag, children = root.children.len(), "hierarchy parsed");
    Ok(HierarchyDocument::new(root))
}

fn node_from_start(e: &BytesStart<'_>) -> PopSentryResult<Node> {
    let mut node = Node::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr.map_err(|err| PopSentryError::Parse(format!("<{}>: {err}", node.tag)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| PopSentryError::Parse(format!("<{}> {key}: {err}", node.tag)))?
            .into_owned();
        node.attributes.insert(key, value);
    }
    Ok(node)
}

fn attach(
    node: Node,
    open: &mut [Node],
    root: &mut Option<Node>,
    position: usize,
) -> PopSentryResult<()> {
    if let Some(parent) = open.last_mut() {
        parent.children.push(node);
    } else if root.is_some() {
        return Err(parse_error("multiple root elements", position));
    } else {
        *root = Some(node);
    }
    Ok(())
}

fn parse_error(what: &str, position: usize) -> PopSentryError {
    PopSentryError::Parse(format!("{what} (at byte {position})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_nodes_and_attributes() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<hierarchy rotation="0" width="1080" height="2400">
  <android.widget.FrameLayout bounds="[0,0][1080,2400]">
    <android.widget.TextView text="Tom &amp; Jerry" clickable="false"/>
    <android.widget.Button text="OK" clickable="true"></android.widget.Button>
  </android.widget.FrameLayout>
</hierarchy>"#;
        let doc = parse_hierarchy(xml).unwrap();
        assert_eq!(doc.root.tag, "hierarchy");
        assert_eq!(doc.screen_width(), 1080);
        let frame = &doc.root.children[0];
        assert_eq!(frame.children.len(), 2);
        assert_eq!(frame.children[0].attr("text"), Some("Tom & Jerry"));
        assert_eq!(frame.children[1].tag, "android.widget.Button");
    }

    #[test]
    fn single_empty_root_is_a_document() {
        let doc = parse_hierarchy("<hierarchy/>").unwrap();
        assert!(doc.root.children.is_empty());
    }

    #[test]
    fn rejects_malformed_markup() {
        for bad in [
            "",
            "not markup at all",
            "<a><b></a>",
            "<a>",
            "<a/><b/>",
            "<a></a></b>",
            r#"<a x="1" x="2"/>"#,
        ] {
            assert!(
                matches!(parse_hierarchy(bad), Err(PopSentryError::Parse(_))),
                "expected parse error for {bad:?}"
            );
        }
    }
}
