//! Kinematic tree inspection.
//!
//! [`mjcf_tree`] turns an element's subtree into plain [`TreeNode`]s labelled
//! `"<tag>: <name>"`, and [`render_tree`] draws any such tree with
//! box-drawing characters:
//!
//! ```text
//! ├─── body: torso
//! │    ├─── geom: chest
//! │    └─── body: arm
//! │         └─── geom: hand
//! └─── body: table
//! ```
//!
//! # Example
//!
//! ```rust
//! use mjutils_mjcf::{mjcf_tree, parse_str, render_tree};
//!
//! let model = parse_str(r#"<mujoco><worldbody>
//!   <body name="torso"><geom name="chest"/><body name="arm"/></body>
//! </worldbody></mujoco>"#).unwrap();
//!
//! let tree = mjcf_tree(model.child("worldbody").unwrap(), true);
//! assert_eq!(render_tree(&tree), "└─── body: torso\n     └─── body: arm\n");
//! ```

use serde::Serialize;

use crate::element::Element;

/// One labelled node of a printable tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub label: String,
    /// Shown one level below the label when the node has no children.
    pub value: Option<String>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn branch(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            label: label.into(),
            value: None,
            children,
        }
    }

    pub fn leaf(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: Some(value.into()),
            children: Vec::new(),
        }
    }
}

/// Tree of `element`'s children, recursively.
///
/// With `bodies_only`, only `body` children are listed.
pub fn mjcf_tree(element: &Element, bodies_only: bool) -> Vec<TreeNode> {
    element
        .children
        .iter()
        .filter(|c| !bodies_only || c.tag == "body")
        .map(|c| {
            let label = format!("{}: {}", c.tag, c.name().unwrap_or("None"));
            TreeNode::branch(label, mjcf_tree(c, bodies_only))
        })
        .collect()
}

/// Render `nodes` as a box-drawing tree, one line per entry.
pub fn render_tree(nodes: &[TreeNode]) -> String {
    let mut out = String::new();
    let mut open = Vec::new();
    render_level(nodes, &mut open, &mut out);
    out
}

/// Print [`render_tree`] to stdout.
pub fn print_tree(nodes: &[TreeNode]) {
    print!("{}", render_tree(nodes));
}

fn render_level(nodes: &[TreeNode], open: &mut Vec<bool>, out: &mut String) {
    for (i, node) in nodes.iter().enumerate() {
        let has_more = i + 1 < nodes.len();
        push_line(out, open, has_more, &node.label);

        open.push(has_more);
        if node.children.is_empty() {
            if let Some(value) = node.value.as_deref().filter(|v| !v.is_empty()) {
                push_line(out, open, false, value);
            }
        } else {
            render_level(&node.children, open, out);
        }
        open.pop();
    }
}

fn push_line(out: &mut String, open: &[bool], has_more: bool, text: &str) {
    for &ancestor_open in open {
        out.push_str(if ancestor_open { "\u{2502}    " } else { "     " });
    }
    out.push_str(if has_more { "\u{251c}" } else { "\u{2514}" });
    out.push_str("\u{2500}\u{2500}\u{2500} ");
    out.push_str(text);
    out.push('\n');
}

// ────────────────────────────────────────────────────────────────────────────
// Summary
// ────────────────────────────────────────────────────────────────────────────

/// Element counts of a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeSummary {
    pub bodies: usize,
    pub joints: usize,
    pub geoms: usize,
    pub sites: usize,
    pub actuators: usize,
    pub sensors: usize,
}

/// Count the bodies, joints, geoms and sites under `<worldbody>` and the
/// entries of the `<actuator>` and `<sensor>` sections.
pub fn kinematic_summary(root: &Element) -> TreeSummary {
    let mut summary = TreeSummary::default();
    for world in root.children_with_tag("worldbody") {
        for e in world.descendants() {
            match e.tag.as_str() {
                "body" => summary.bodies += 1,
                "joint" | "freejoint" => summary.joints += 1,
                "geom" => summary.geoms += 1,
                "site" => summary.sites += 1,
                _ => {}
            }
        }
    }
    summary.actuators = root
        .children_with_tag("actuator")
        .map(|a| a.children.len())
        .sum();
    summary.sensors = root
        .children_with_tag("sensor")
        .map(|s| s.children.len())
        .sum();
    summary
}
