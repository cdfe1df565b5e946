//! `mjutils-mjcf` – MJCF (MuJoCo XML) model trees.
//!
//! Everything in this crate operates on an owned, in-memory [`Element`]
//! tree.  The physics engine compiles these trees; this crate only prepares
//! them and writes them back out.
//!
//! # Modules
//!
//! - [`element`] – [`Element`][element::Element] and
//!   [`AttrValue`][element::AttrValue]: the mutable model tree.
//! - [`parser`] – [`parse_str`][parser::parse_str] /
//!   [`parse_file`][parser::parse_file]: build a tree from MJCF text.
//! - [`export`] – [`to_clean_xml`][export::to_clean_xml]: serialize a tree to
//!   tidy, diff-friendly XML (no empty default wrapper, no asset hashes, no
//!   redundant `class="/"` / `gravcomp="0"`, spacing between sections).
//! - [`frame`] – [`set_body_frame`][frame::set_body_frame] and
//!   [`reparent_body`][frame::reparent_body]: move body frames without
//!   disturbing anything attached to them.
//! - [`tree`] – [`mjcf_tree`][tree::mjcf_tree] and
//!   [`render_tree`][tree::render_tree]: inspect the kinematic tree.

pub mod element;
pub mod export;
pub mod frame;
pub mod parser;
pub mod tree;

pub use element::{AttrValue, Element};
pub use export::{ExportOptions, to_clean_xml, write_clean_xml};
pub use frame::{CompilerSettings, local_pose, reparent_body, set_body_frame, world_pose};
pub use parser::{parse_file, parse_str};
pub use tree::{TreeNode, TreeSummary, kinematic_summary, mjcf_tree, print_tree, render_tree};
