use std::collections::HashMap;

/// One view node of a UI hierarchy dump.
#[derive(Debug, Default)]
pub struct Node {
    /// Dot-qualified element type, e.g. `android.widget.ImageView`.
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attribute value, or the empty string when absent.
    pub fn attr_or_empty(&self, name: &str) -> &str {
        self.attr(name).unwrap_or("")
    }

    /// Boolean attribute: `true` only for the exact string `"true"`; `default` when absent.
    pub fn flag(&self, name: &str, default: bool) -> bool {
        match self.attr(name) {
            Some(value) => value == "true",
            None => default,
        }
    }

    /// Last dot-separated segment of the tag (`ImageView` for `android.widget.ImageView`).
    pub fn short_type(&self) -> &str {
        self.tag.rsplit('.').next().unwrap_or(&self.tag)
    }

    /// All descendants in depth-first pre-order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }
}

// Dumps can nest arbitrarily deep; tear the tree down without recursing.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A parsed hierarchy dump. Read-only once built.
#[derive(Debug)]
pub struct HierarchyDocument {
    pub root: Node,
}

impl HierarchyDocument {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Screen width from the root's `width` attribute; 0 when absent or unparseable.
    pub fn screen_width(&self) -> i64 {
        dimension(&self.root, "width")
    }

    /// Screen height from the root's `height` attribute; 0 when absent or unparseable.
    pub fn screen_height(&self) -> i64 {
        dimension(&self.root, "height")
    }
}

fn dimension(root: &Node, name: &str) -> i64 {
    root.attr(name)
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(tag: &str, id: &str) -> Node {
        let mut n = Node::new(tag);
        n.attributes.insert("resource-id".into(), id.into());
        n
    }

    #[test]
    fn descendants_are_preorder_and_exclude_self() {
        let mut a = leaf("x.A", "a");
        a.children.push(leaf("x.A1", "a1"));
        a.children.push(leaf("x.A2", "a2"));
        let mut root = Node::new("hierarchy");
        root.children.push(a);
        root.children.push(leaf("x.B", "b"));

        let ids: Vec<&str> = root
            .descendants()
            .map(|n| n.attr_or_empty("resource-id"))
            .collect();
        assert_eq!(ids, vec!["a", "a1", "a2", "b"]);
    }

    #[test]
    fn flag_is_exact_match() {
        let mut n = Node::new("x.Button");
        n.attributes.insert("clickable".into(), "True".into());
        assert!(!n.flag("clickable", false));
        assert!(n.flag("enabled", true));
        n.attributes.insert("enabled".into(), "false".into());
        assert!(!n.flag("enabled", true));
    }

    #[test]
    fn short_type_takes_last_segment() {
        assert_eq!(Node::new("android.widget.Button").short_type(), "Button");
        assert_eq!(Node::new("View").short_type(), "View");
    }

    #[test]
    fn dimensions_default_independently() {
        let mut root = Node::new("hierarchy");
        root.attributes.insert("width".into(), "1080".into());
        root.attributes.insert("height".into(), "tall".into());
        let doc = HierarchyDocument::new(root);
        assert_eq!(doc.screen_width(), 1080);
        assert_eq!(doc.screen_height(), 0);
    }

    #[test]
    fn deep_tree_drops_and_iterates() {
        let mut node = Node::new("leaf");
        for _ in 0..200_000 {
            let mut parent = Node::new("a");
            parent.children.push(node);
            node = parent;
        }
        assert_eq!(node.descendants().count(), 200_000);
        drop(node);
    }
}
