//! The drift comparison engine.
//!
//! [`compare`] walks two canonical configuration trees and classifies every
//! difference as added, removed, modified, or type-changed, each tagged with
//! its full [`Path`] from the document root.
//!
//! # Classification Rules
//!
//! - Mappings are compared by key: keys only in the base are `Removed`, keys
//!   only in the target are `Added`, keys in both recurse.
//! - Sequences are compared positionally by index. No alignment or
//!   longest-common-subsequence matching is performed: reordering the same
//!   elements reports as a cascade of per-index modifications.
//! - Scalars of the same kind compare by value. Floats use exact equality.
//! - Nodes of different variant kinds, or scalars of different kinds
//!   (integer vs string, say), report `TypeChanged` and are not recursed
//!   into.
//! - An explicit null is a value: `a: null` against a document without `a`
//!   reports `Removed`, never `Modified`.
//!
//! # Determinism
//!
//! Traversal is a pre-order walk visiting mapping keys in document order
//! (base order for shared and removed keys, target order for added keys) and
//! sequence indices in position order. Repeated comparisons of the same
//! inputs produce element-for-element identical reports.
//!
//! # Resource Model
//!
//! The engine is a pure synchronous computation over immutable inputs: no
//! I/O, no shared state, no failure paths for well-formed trees. Cost is
//! O(total node count across both trees); stack depth is proportional to the
//! nesting depth of the deeper input and is not limited internally, which is
//! a documented limitation. Callers needing bounds impose them by
//! pre-validating input size.

use serde::Serialize;

use crate::node::{mapping_get, ConfigNode};
use crate::path::{Path, PathSegment};

/// The classification of one detected difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftKind {
    /// Present only in the target document.
    Added,
    /// Present only in the base document.
    Removed,
    /// Present in both with the same kind but different value.
    Modified,
    /// Present in both with incompatible variant or scalar kinds.
    TypeChanged,
}

/// One detected difference.
///
/// `old_value` is `None` iff the entry is `Added`; `new_value` is `None` iff
/// it is `Removed`. Values are deep copies of the input subtrees, so the
/// entry stays valid after the inputs are dropped or mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftEntry {
    /// Location of the difference, from the document root.
    pub path: Path,
    /// Classification of the difference.
    pub kind: DriftKind,
    /// Value in the base document, if present there.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<ConfigNode>,
    /// Value in the target document, if present there.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<ConfigNode>,
}

impl DriftEntry {
    /// An entry for a value present only in the target.
    #[must_use]
    pub fn added(path: Path, new_value: ConfigNode) -> Self {
        Self {
            path,
            kind: DriftKind::Added,
            old_value: None,
            new_value: Some(new_value),
        }
    }

    /// An entry for a value present only in the base.
    #[must_use]
    pub fn removed(path: Path, old_value: ConfigNode) -> Self {
        Self {
            path,
            kind: DriftKind::Removed,
            old_value: Some(old_value),
            new_value: None,
        }
    }

    /// An entry for a same-kind value change.
    #[must_use]
    pub fn modified(path: Path, old_value: ConfigNode, new_value: ConfigNode) -> Self {
        Self {
            path,
            kind: DriftKind::Modified,
            old_value: Some(old_value),
            new_value: Some(new_value),
        }
    }

    /// An entry for a variant or scalar kind change.
    #[must_use]
    pub fn type_changed(path: Path, old_value: ConfigNode, new_value: ConfigNode) -> Self {
        Self {
            path,
            kind: DriftKind::TypeChanged,
            old_value: Some(old_value),
            new_value: Some(new_value),
        }
    }
}

/// The engine's output: every detected difference, partitioned by kind.
///
/// `modified` holds both [`DriftKind::Modified`] and
/// [`DriftKind::TypeChanged`] entries (both sides present, values differ);
/// the entry's `kind` disambiguates. The report owns its values outright and
/// holds no references back into the compared trees.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DriftReport {
    /// Paths present only in the target document.
    pub added: Vec<DriftEntry>,
    /// Paths present only in the base document.
    pub removed: Vec<DriftEntry>,
    /// Paths present in both documents but differing in value or kind.
    pub modified: Vec<DriftEntry>,
}

impl DriftReport {
    /// Returns `true` if no drift was detected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Total number of entries across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    fn push(&mut self, entry: DriftEntry) {
        match entry.kind {
            DriftKind::Added => self.added.push(entry),
            DriftKind::Removed => self.removed.push(entry),
            DriftKind::Modified | DriftKind::TypeChanged => self.modified.push(entry),
        }
    }
}

/// Compares two mapping-rooted configuration trees.
///
/// Precondition: both roots are [`ConfigNode::Mapping`]. The loader
/// guarantees this; handing the engine anything else is a programming error,
/// checked with a debug assertion rather than a runtime error path.
///
/// The inputs are read-only; it is safe to call this concurrently from
/// multiple threads on shared trees.
#[must_use]
pub fn compare(base: &ConfigNode, target: &ConfigNode) -> DriftReport {
    debug_assert!(base.is_mapping(), "compare precondition: base root must be a mapping");
    debug_assert!(
        target.is_mapping(),
        "compare precondition: target root must be a mapping"
    );

    let mut report = DriftReport::default();
    diff_nodes(&Path::root(), base, target, &mut report);
    report
}

/// Recursive pre-order diff of one node pair.
fn diff_nodes(path: &Path, base: &ConfigNode, target: &ConfigNode, report: &mut DriftReport) {
    match (base, target) {
        (ConfigNode::Mapping(a), ConfigNode::Mapping(b)) => {
            // Base order: shared keys recurse, base-only keys are removals.
            for (key, base_value) in a {
                let child = path.child(PathSegment::key(key.clone()));
                match mapping_get(b, key) {
                    Some(target_value) => diff_nodes(&child, base_value, target_value, report),
                    None => report.push(DriftEntry::removed(child, base_value.clone())),
                }
            }
            // Target order: target-only keys are additions.
            for (key, target_value) in b {
                if mapping_get(a, key).is_none() {
                    let child = path.child(PathSegment::key(key.clone()));
                    report.push(DriftEntry::added(child, target_value.clone()));
                }
            }
        },
        (ConfigNode::Sequence(a), ConfigNode::Sequence(b)) => {
            for (index, (base_item, target_item)) in a.iter().zip(b).enumerate() {
                diff_nodes(&path.child(PathSegment::Index(index)), base_item, target_item, report);
            }
            // Surplus indices on either side, beyond the shorter length.
            for (index, base_item) in a.iter().enumerate().skip(b.len()) {
                report.push(DriftEntry::removed(
                    path.child(PathSegment::Index(index)),
                    base_item.clone(),
                ));
            }
            for (index, target_item) in b.iter().enumerate().skip(a.len()) {
                report.push(DriftEntry::added(
                    path.child(PathSegment::Index(index)),
                    target_item.clone(),
                ));
            }
        },
        (ConfigNode::Scalar(x), ConfigNode::Scalar(y)) => {
            if x.kind() != y.kind() {
                report.push(DriftEntry::type_changed(path.clone(), base.clone(), target.clone()));
            } else if x != y {
                report.push(DriftEntry::modified(path.clone(), base.clone(), target.clone()));
            }
        },
        // Variant-kind mismatch: report and stop, do not recurse further.
        _ => report.push(DriftEntry::type_changed(path.clone(), base.clone(), target.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_yaml_str;
    use crate::node::Scalar;

    fn doc(content: &str) -> ConfigNode {
        load_yaml_str(content).expect("test document must parse")
    }

    fn key_path(keys: &[&str]) -> Path {
        keys.iter().map(|k| PathSegment::key(*k)).collect()
    }

    #[test]
    fn identical_documents_yield_empty_report() {
        let a = doc("server:\n  port: 8080\n  hosts: [a, b]\n");
        let b = doc("server:\n  port: 8080\n  hosts: [a, b]\n");
        let report = compare(&a, &b);
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
    }

    #[test]
    fn empty_mappings_yield_empty_report() {
        let report = compare(&doc("{}"), &doc("{}"));
        assert!(report.is_empty());
    }

    #[test]
    fn modified_scalar() {
        let report = compare(&doc("a: 1"), &doc("a: 2"));
        assert_eq!(report.added, Vec::new());
        assert_eq!(report.removed, Vec::new());
        assert_eq!(
            report.modified,
            vec![DriftEntry::modified(
                key_path(&["a"]),
                ConfigNode::Scalar(Scalar::Int(1)),
                ConfigNode::Scalar(Scalar::Int(2)),
            )]
        );
    }

    #[test]
    fn added_key() {
        let report = compare(&doc("a: 1"), &doc("a: 1\nb: 2"));
        assert_eq!(
            report.added,
            vec![DriftEntry::added(key_path(&["b"]), ConfigNode::Scalar(Scalar::Int(2)))]
        );
        assert!(report.removed.is_empty());
        assert!(report.modified.is_empty());
    }

    #[test]
    fn removed_key() {
        let report = compare(&doc("a: 1\nb: 2"), &doc("a: 1"));
        assert_eq!(
            report.removed,
            vec![DriftEntry::removed(key_path(&["b"]), ConfigNode::Scalar(Scalar::Int(2)))]
        );
        assert!(report.added.is_empty());
        assert!(report.modified.is_empty());
    }

    #[test]
    fn scalar_kind_change_is_type_changed_not_coerced() {
        let report = compare(&doc("a: 1"), &doc("a: \"1\""));
        assert_eq!(
            report.modified,
            vec![DriftEntry::type_changed(
                key_path(&["a"]),
                ConfigNode::Scalar(Scalar::Int(1)),
                ConfigNode::Scalar(Scalar::Str("1".into())),
            )]
        );
    }

    #[test]
    fn variant_kind_change_stops_recursion() {
        let base = doc("a:\n  nested: 1\n  other: 2\n");
        let target = doc("a: scalar\n");
        let report = compare(&base, &target);
        // One entry at `a`, nothing underneath it.
        assert_eq!(report.len(), 1);
        assert_eq!(report.modified[0].kind, DriftKind::TypeChanged);
        assert_eq!(report.modified[0].path, key_path(&["a"]));
    }

    #[test]
    fn mapping_vs_sequence_is_one_type_change() {
        let base = doc("a:\n  x: 1\n  y: 2\n");
        let target = doc("a:\n  - 1\n  - 2\n");
        let report = compare(&base, &target);
        // One entry at `a`; the collections' contents are not walked.
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.modified,
            vec![DriftEntry::type_changed(
                key_path(&["a"]),
                ConfigNode::Mapping(vec![
                    ("x".into(), ConfigNode::Scalar(Scalar::Int(1))),
                    ("y".into(), ConfigNode::Scalar(Scalar::Int(2))),
                ]),
                ConfigNode::Sequence(vec![
                    ConfigNode::Scalar(Scalar::Int(1)),
                    ConfigNode::Scalar(Scalar::Int(2)),
                ]),
            )]
        );
    }

    #[test]
    fn nested_modification_reports_full_path() {
        let report = compare(
            &doc("server:\n  port: 8080\n"),
            &doc("server:\n  port: 9090\n"),
        );
        assert_eq!(report.len(), 1);
        assert_eq!(report.modified[0].path, key_path(&["server", "port"]));
        assert_eq!(report.modified[0].path.to_string(), "server.port");
    }

    #[test]
    fn null_vs_missing_is_removed_not_modified() {
        let report = compare(&doc("a: null"), &doc("{}"));
        assert!(report.modified.is_empty());
        assert_eq!(
            report.removed,
            vec![DriftEntry::removed(key_path(&["a"]), ConfigNode::Scalar(Scalar::Null))]
        );
    }

    #[test]
    fn missing_vs_null_is_added() {
        let report = compare(&doc("{}"), &doc("a: null"));
        assert!(report.modified.is_empty());
        assert_eq!(
            report.added,
            vec![DriftEntry::added(key_path(&["a"]), ConfigNode::Scalar(Scalar::Null))]
        );
    }

    #[test]
    fn null_vs_value_is_type_changed() {
        let report = compare(&doc("a: null"), &doc("a: 1"));
        assert_eq!(report.modified[0].kind, DriftKind::TypeChanged);
    }

    #[test]
    fn sequence_growth_is_added_at_index() {
        let report = compare(&doc("a: [1, 2, 3]"), &doc("a: [1, 2, 3, 4]"));
        assert!(report.removed.is_empty());
        assert!(report.modified.is_empty());
        let expected_path: Path = vec![PathSegment::key("a"), PathSegment::Index(3)].into();
        assert_eq!(
            report.added,
            vec![DriftEntry::added(expected_path, ConfigNode::Scalar(Scalar::Int(4)))]
        );
    }

    #[test]
    fn sequence_truncation_is_removed_at_index() {
        let report = compare(&doc("a: [1, 2, 3]"), &doc("a: [1]"));
        let paths: Vec<String> = report.removed.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, ["a[1]", "a[2]"]);
        assert!(report.added.is_empty());
    }

    #[test]
    fn sequence_reorder_reports_per_index_modifications() {
        // Positional comparison by design: no alignment matching.
        let report = compare(&doc("a: [1, 2]"), &doc("a: [2, 1]"));
        let paths: Vec<String> = report.modified.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, ["a[0]", "a[1]"]);
    }

    #[test]
    fn sequence_elements_recurse() {
        let report = compare(
            &doc("servers:\n  - host: a\n    port: 1\n  - host: b\n"),
            &doc("servers:\n  - host: a\n    port: 2\n  - host: b\n"),
        );
        assert_eq!(report.len(), 1);
        assert_eq!(report.modified[0].path.to_string(), "servers[0].port");
    }

    #[test]
    fn float_comparison_is_exact() {
        let report = compare(&doc("a: 0.1"), &doc("a: 0.1"));
        assert!(report.is_empty());
        let report = compare(&doc("a: 0.30000000000000004"), &doc("a: 0.3"));
        assert_eq!(report.modified.len(), 1);
        assert_eq!(report.modified[0].kind, DriftKind::Modified);
    }

    #[test]
    fn integer_vs_float_is_type_changed() {
        let report = compare(&doc("a: 1"), &doc("a: 1.0"));
        assert_eq!(report.modified[0].kind, DriftKind::TypeChanged);
    }

    #[test]
    fn bucket_entries_follow_document_order() {
        let base = doc("zebra: 1\napple: 2\nshared: 3\n");
        let target = doc("delta: 4\nshared: 5\ncharlie: 6\n");
        let report = compare(&base, &target);

        let removed: Vec<String> = report.removed.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(removed, ["zebra", "apple"]);
        let added: Vec<String> = report.added.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(added, ["delta", "charlie"]);
        assert_eq!(report.modified[0].path.to_string(), "shared");
    }

    #[test]
    fn parent_entries_precede_child_entries() {
        let base = doc("outer:\n  gone: 1\n  inner:\n    deep: 2\n");
        let target = doc("outer:\n  inner:\n    deep: 3\n");
        let report = compare(&base, &target);
        assert_eq!(report.removed[0].path.to_string(), "outer.gone");
        assert_eq!(report.modified[0].path.to_string(), "outer.inner.deep");
    }

    #[test]
    fn report_owns_copies_of_input_values() {
        let base = doc("a: 1");
        let target = doc("a: 2");
        let report = compare(&base, &target);
        drop(base);
        drop(target);
        assert_eq!(report.modified[0].old_value, Some(ConfigNode::Scalar(Scalar::Int(1))));
    }

    #[test]
    fn repeated_comparison_is_deterministic() {
        let base = doc("a: {x: 1, y: [1, 2]}\nb: 2\nc: null\n");
        let target = doc("a: {x: 2, y: [1]}\nd: 7\n");
        let first = compare(&base, &target);
        let second = compare(&base, &target);
        assert_eq!(first, second);
    }

    #[test]
    fn report_serializes_by_bucket() {
        let report = compare(&doc("a: 1"), &doc("a: 2\nb: 3"));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "added": [{"path": ["b"], "kind": "added", "new_value": 3}],
                "removed": [],
                "modified": [{"path": ["a"], "kind": "modified", "old_value": 1, "new_value": 2}],
            })
        );
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;
    use crate::node::Scalar;

    fn arb_scalar() -> impl Strategy<Value = Scalar> {
        prop_oneof![
            Just(Scalar::Null),
            any::<bool>().prop_map(Scalar::Bool),
            any::<i64>().prop_map(Scalar::Int),
            (i64::MAX as u64 + 1..u64::MAX).prop_map(Scalar::Uint),
            // Finite floats only: NaN breaks reflexivity by definition.
            (-1.0e9f64..1.0e9).prop_map(Scalar::Float),
            "[a-z0-9]{0,8}".prop_map(Scalar::Str),
        ]
    }

    fn arb_node() -> impl Strategy<Value = ConfigNode> {
        arb_scalar().prop_map(ConfigNode::Scalar).prop_recursive(4, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(ConfigNode::Sequence),
                prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                    .prop_map(|m| ConfigNode::Mapping(m.into_iter().collect())),
            ]
        })
    }

    /// Mapping-rooted trees, matching the loader contract.
    fn arb_document() -> impl Strategy<Value = ConfigNode> {
        prop::collection::btree_map("[a-z]{1,4}", arb_node(), 0..5)
            .prop_map(|m| ConfigNode::Mapping(m.into_iter().collect()))
    }

    /// Sorts by path; each path occurs in at most one entry per report.
    fn by_path(mut entries: Vec<DriftEntry>) -> Vec<DriftEntry> {
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }

    proptest! {
        #[test]
        fn identity(doc in arb_document()) {
            prop_assert!(compare(&doc, &doc).is_empty());
        }

        #[test]
        fn determinism(base in arb_document(), target in arb_document()) {
            prop_assert_eq!(compare(&base, &target), compare(&base, &target));
        }

        #[test]
        fn kind_symmetry(base in arb_document(), target in arb_document()) {
            let forward = compare(&base, &target);
            let reverse = compare(&target, &base);

            // Forward additions are reverse removals at the same paths with
            // the same values, and vice versa.
            let mirrored_added: Vec<DriftEntry> = reverse
                .removed
                .iter()
                .map(|e| DriftEntry::added(e.path.clone(), e.old_value.clone().unwrap()))
                .collect();
            prop_assert_eq!(by_path(forward.added.clone()), by_path(mirrored_added));

            let mirrored_removed: Vec<DriftEntry> = reverse
                .added
                .iter()
                .map(|e| DriftEntry::removed(e.path.clone(), e.new_value.clone().unwrap()))
                .collect();
            prop_assert_eq!(by_path(forward.removed.clone()), by_path(mirrored_removed));

            // Modifications mirror with old/new swapped, same kind.
            let mirrored_modified: Vec<DriftEntry> = reverse
                .modified
                .iter()
                .map(|e| DriftEntry {
                    path: e.path.clone(),
                    kind: e.kind,
                    old_value: e.new_value.clone(),
                    new_value: e.old_value.clone(),
                })
                .collect();
            prop_assert_eq!(by_path(forward.modified.clone()), by_path(mirrored_modified));
        }

        #[test]
        fn buckets_are_kind_consistent(base in arb_document(), target in arb_document()) {
            let report = compare(&base, &target);
            for entry in &report.added {
                prop_assert_eq!(entry.kind, DriftKind::Added);
                prop_assert!(entry.old_value.is_none());
                prop_assert!(entry.new_value.is_some());
            }
            for entry in &report.removed {
                prop_assert_eq!(entry.kind, DriftKind::Removed);
                prop_assert!(entry.old_value.is_some());
                prop_assert!(entry.new_value.is_none());
            }
            for entry in &report.modified {
                prop_assert!(matches!(entry.kind, DriftKind::Modified | DriftKind::TypeChanged));
                prop_assert!(entry.old_value.is_some());
                prop_assert!(entry.new_value.is_some());
            }
        }

        #[test]
        fn empty_report_means_equal_trees(base in arb_document(), target in arb_document()) {
            if compare(&base, &target).is_empty() {
                prop_assert_eq!(&base, &target);
            }
        }
    }
}
