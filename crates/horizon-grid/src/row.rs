//! Display rows produced by the pipeline.
//!
//! Every pipeline run rebuilds the displayed sequence from scratch. Each
//! entry is a [`DisplayRow`]: either a data row pointing back at its raw data
//! position, or a synthetic [`GroupNode`] header injected by the grouping
//! stage. Display rows are snapshots; they are never mutated after the run
//! that produced them.

use std::sync::Arc;

use crate::options::AggregateFunction;
use crate::value::CellValue;

/// One aggregate computed over a group's member rows.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAggregate {
    /// Column the aggregate was computed on.
    pub column_id: String,
    /// Aggregation function.
    pub function: AggregateFunction,
    /// Result; `Null` when no member produced a number.
    pub value: CellValue,
}

/// A synthetic row representing rows that share a value at one grouping level.
#[derive(Debug, Clone)]
pub struct GroupNode<R> {
    /// Composite key: ancestor values and this level's value joined with `|`.
    pub key: String,
    /// Group values from the top level down to this one. Unlike `key`, the
    /// path is unique per header.
    pub path: Vec<String>,
    /// This level's stringified group value.
    pub value: String,
    /// Column the group was formed on.
    pub column_id: String,
    /// Nesting level, `0` for top-level groups.
    pub level: usize,
    /// Member rows in post-sort order, collapsed or not.
    pub members: Vec<Arc<R>>,
    /// Raw data positions of the members, parallel to `members`.
    pub member_indices: Vec<usize>,
    /// `false` if the key is in the collapsed set.
    pub expanded: bool,
    /// Aggregates in configuration order.
    pub aggregates: Vec<GroupAggregate>,
}

impl<R> GroupNode<R> {
    /// Number of member rows.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Looks up the aggregate computed for `column_id` with `function`.
    pub fn aggregate(&self, column_id: &str, function: AggregateFunction) -> Option<&CellValue> {
        self.aggregates
            .iter()
            .find(|aggregate| aggregate.column_id == column_id && aggregate.function == function)
            .map(|aggregate| &aggregate.value)
    }
}

/// What a display row represents.
#[derive(Debug, Clone)]
pub enum RowKind<R> {
    /// A row of the caller's data.
    Data {
        /// Position of the item in the raw row data.
        source_index: usize,
        /// The item itself.
        item: Arc<R>,
    },
    /// A group header.
    Group(Arc<GroupNode<R>>),
}

/// A row of the displayed sequence.
#[derive(Debug, Clone)]
pub struct DisplayRow<R> {
    /// Position in the displayed sequence (after pagination).
    pub index: usize,
    /// Data row or group header.
    pub kind: RowKind<R>,
    /// Whether the row is selected.
    pub selected: bool,
    /// Whether the row is highlighted.
    pub highlighted: bool,
}

impl<R> DisplayRow<R> {
    pub(crate) fn new(index: usize, kind: RowKind<R>) -> Self {
        Self {
            index,
            kind,
            selected: false,
            highlighted: false,
        }
    }

    /// Returns `true` for group headers.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, RowKind::Group(_))
    }

    /// The data item, for data rows.
    pub fn data(&self) -> Option<&R> {
        match &self.kind {
            RowKind::Data { item, .. } => Some(item),
            RowKind::Group(_) => None,
        }
    }

    /// Raw data position, for data rows.
    pub fn source_index(&self) -> Option<usize> {
        match &self.kind {
            RowKind::Data { source_index, .. } => Some(*source_index),
            RowKind::Group(_) => None,
        }
    }

    /// The group node, for group headers.
    pub fn group(&self) -> Option<&GroupNode<R>> {
        match &self.kind {
            RowKind::Group(node) => Some(node),
            RowKind::Data { .. } => None,
        }
    }

    /// Composite group key, for group headers.
    pub fn group_key(&self) -> Option<&str> {
        self.group().map(|node| node.key.as_str())
    }

    /// Group nesting level; `0` for data rows.
    pub fn group_level(&self) -> usize {
        self.group().map_or(0, |node| node.level)
    }

    /// Whether a group header is expanded; `true` for data rows.
    pub fn is_expanded(&self) -> bool {
        self.group().is_none_or(|node| node.expanded)
    }
}
