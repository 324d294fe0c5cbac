//! Text rendering of a projection's groups and items.

use std::fmt;
use std::hash::Hash;

use reflux_core::{NotifyPropertyChanged, TreeFormatOptions, TreeFormatter, TreeNode};

use super::grouping::GroupingProjection;

/// Renders a [`GroupingProjection`] as a tree: one node per group, labelled
/// with its key, and one leaf per item.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use reflux::{
///     GroupingProjectionBuilder, ObservableCollection, ProjectionTreeDebug, Shared,
///     TreeFormatOptions, TreeStyle,
/// };
///
/// let source = Arc::new(ObservableCollection::from_vec(vec![Shared::new(3), Shared::new(14)]));
/// let projection = GroupingProjectionBuilder::new(source, |n: &i32| n / 10).build().unwrap();
///
/// let debug = ProjectionTreeDebug::with_options(TreeFormatOptions {
///     style: TreeStyle::Ascii,
///     ..Default::default()
/// });
/// assert_eq!(
///     debug.format(&projection),
///     "Projection (2 groups, 2 items):\n0 (1)\n`-- 3\n1 (1)\n`-- 14\n"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProjectionTreeDebug {
    formatter: TreeFormatter,
}

impl ProjectionTreeDebug {
    /// Creates a formatter with the default Unicode style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a formatter with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self {
            formatter: TreeFormatter::with_options(options),
        }
    }

    /// Render the current state of `projection`.
    pub fn format<K, T>(&self, projection: &GroupingProjection<K, T>) -> String
    where
        K: Ord + Hash + Clone + Send + Sync + fmt::Debug + 'static,
        T: NotifyPropertyChanged + Send + Sync + fmt::Debug + 'static,
    {
        let roots: Vec<TreeNode> = projection
            .snapshot()
            .iter()
            .map(|group| {
                let items = group
                    .snapshot()
                    .iter()
                    .map(|item| TreeNode::leaf(format!("{:?}", item)))
                    .collect();
                TreeNode::branch(format!("{:?}", group.key()), items)
            })
            .collect();

        let title = format!(
            "Projection ({} groups, {} items):",
            roots.len(),
            roots.iter().map(|g| g.children.len()).sum::<usize>()
        );
        self.formatter.format(&title, &roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::ObservableCollection;
    use crate::projection::GroupingProjectionBuilder;
    use crate::shared::Shared;
    use reflux_core::TreeStyle;
    use std::sync::Arc;

    #[test]
    fn test_empty_projection() {
        let source = Arc::new(ObservableCollection::<Shared<i32>>::new());
        let projection = GroupingProjectionBuilder::new(source, |n: &i32| *n).build().unwrap();

        assert_eq!(
            ProjectionTreeDebug::new().format(&projection),
            "Projection (0 groups, 0 items):\n  (empty)\n"
        );
    }

    #[test]
    fn test_compact_without_counts() {
        let source = Arc::new(ObservableCollection::from_vec(vec![
            Shared::new(21),
            Shared::new(5),
            Shared::new(27),
        ]));
        let projection = GroupingProjectionBuilder::new(source, |n: &i32| n / 10)
            .order_by(|n: &i32| *n)
            .build()
            .unwrap();

        let debug = ProjectionTreeDebug::with_options(TreeFormatOptions {
            style: TreeStyle::Compact,
            ..TreeFormatOptions::minimal()
        });

        assert_eq!(
            debug.format(&projection),
            "Projection (2 groups, 3 items):\n0\n- 5\n2\n- 21\n- 27\n"
        );
    }
}
