//! Logging and debugging facilities for Reflux.
//!
//! This module provides:
//! - Target names for filtering the `tracing` output of each subsystem
//! - A text tree renderer for visualizing nested views
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Reflux uses the `tracing` crate for instrumentation. To see logs, install
//! a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("reflux::projection=debug,reflux::sync=trace")
//!         .init();
//! }
//! ```

use std::fmt::Write as FmtWrite;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "reflux_core::signal";
    /// Property system target.
    pub const PROPERTY: &str = "reflux_core::property";
    /// Dispatch context target.
    pub const CONTEXT: &str = "reflux_core::context";
    /// Ordered view synchronization target.
    pub const SYNC: &str = "reflux::sync";
    /// Notification batching target.
    pub const BATCH: &str = "reflux::batching";
    /// Grouping projection target.
    pub const PROJECTION: &str = "reflux::projection";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact dash-prefixed representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to append the child count to nodes that have children.
    pub show_counts: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_counts: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_counts: false,
            ..Default::default()
        }
    }
}

/// One labelled node of a tree to render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    /// Text shown for this node.
    pub label: String,
    /// Child nodes, rendered in order.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a leaf node.
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// Create a node with children.
    pub fn branch(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

/// Renders [`TreeNode`] forests as indented text.
#[derive(Debug, Clone, Default)]
pub struct TreeFormatter {
    options: TreeFormatOptions,
}

impl TreeFormatter {
    /// Create a formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// The options this formatter renders with.
    pub fn options(&self) -> &TreeFormatOptions {
        &self.options
    }

    /// Render `roots` under a `title` header line.
    pub fn format(&self, title: &str, roots: &[TreeNode]) -> String {
        let mut output = String::new();
        output.push_str(title);
        output.push('\n');

        if roots.is_empty() {
            output.push_str("  (empty)\n");
        } else {
            for root in roots {
                self.format_node_into(root, 0, true, &mut output);
            }
        }
        output
    }

    fn format_node_into(&self, node: &TreeNode, depth: usize, is_last: bool, output: &mut String) {
        if let Some(max) = self.options.max_depth {
            if depth > max {
                return;
            }
        }

        output.push_str(&self.build_prefix(depth, is_last));
        output.push_str(&node.label);
        if self.options.show_counts && !node.children.is_empty() {
            // Writing into a String cannot fail.
            let _ = write!(output, " ({})", node.children.len());
        }
        output.push('\n');

        let child_count = node.children.len();
        for (i, child) in node.children.iter().enumerate() {
            self.format_node_into(child, depth + 1, i + 1 == child_count, output);
        }
    }

    /// Build the prefix string for a tree node.
    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => (
                "\u{2502}",
                "\u{251c}\u{2500}\u{2500}",
                "\u{2514}\u{2500}\u{2500}",
            ),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            for _ in 0..self.options.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }
}

/// A guard that emits a tracing span when dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "reflux::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
