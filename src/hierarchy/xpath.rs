//! Hierarchical XPath strings for nodes: `/hierarchy/android.widget.FrameLayout[1]/...`,
//! where each step's index is the 1-based position among same-tag siblings.
//!
//! Walks keep their own stack so nesting depth is bounded by memory, not by the
//! thread's call stack. Paths are only joined for the nodes a caller keeps.

use std::collections::HashMap;
use std::ops::ControlFlow;

use crate::hierarchy::types::Node;

/// XPath of a document root.
pub fn root_xpath(root: &Node) -> String {
    format!("/{}", root.tag)
}

/// `tag[n]` step for every child of `parent`, in child order.
pub fn child_steps(parent: &Node) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    parent
        .children
        .iter()
        .map(|child| {
            let position = seen.entry(child.tag.as_str()).or_insert(0);
            *position += 1;
            format!("{}[{}]", child.tag, position)
        })
        .collect()
}

/// Append relative `steps` to `base`.
pub fn join_xpath(base: &str, steps: &[String]) -> String {
    let mut path = String::with_capacity(base.len() + steps.iter().map(|s| s.len() + 1).sum::<usize>());
    path.push_str(base);
    for step in steps {
        path.push('/');
        path.push_str(step);
    }
    path
}

struct Frame<'a> {
    children: &'a [Node],
    steps: Vec<String>,
    next: usize,
}

impl<'a> Frame<'a> {
    fn of(node: &'a Node) -> Self {
        Self {
            children: &node.children,
            steps: child_steps(node),
            next: 0,
        }
    }
}

/// Depth-first pre-order walk over the descendants of `root`, excluding `root`.
/// `visit` receives each node with its steps relative to `root`; breaking stops
/// the walk and returns the break value.
pub fn walk_descendants<'a, B>(
    root: &'a Node,
    mut visit: impl FnMut(&'a Node, &[String]) -> ControlFlow<B>,
) -> Option<B> {
    let mut frames = vec![Frame::of(root)];
    let mut chain: Vec<String> = Vec::new();

    while let Some(frame) = frames.last_mut() {
        if frame.next == frame.children.len() {
            frames.pop();
            chain.pop();
            continue;
        }
        let children = frame.children;
        let child = &children[frame.next];
        chain.push(std::mem::take(&mut frame.steps[frame.next]));
        frame.next += 1;

        if let ControlFlow::Break(found) = visit(child, &chain) {
            return Some(found);
        }
        if child.children.is_empty() {
            chain.pop();
        } else {
            frames.push(Frame::of(child));
        }
    }
    None
}

/// First descendant of `root` (pre-order, excluding `root`) tagged `tag`, with its XPath.
pub fn locate_first<'a>(root: &'a Node, tag: &str) -> Option<(&'a Node, String)> {
    let base = root_xpath(root);
    walk_descendants(root, |node, steps| {
        if node.tag == tag {
            ControlFlow::Break((node, join_xpath(&base, steps)))
        } else {
            ControlFlow::Continue(())
        }
    })
}
