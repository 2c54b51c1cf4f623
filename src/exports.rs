//! The nested exports structure that function triggers are assigned into.

use crate::naming::PROPERTY_DELIMITER;
use serde::Serialize;
use std::collections::BTreeMap;

/// One node of the exports tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportNode<T> {
    /// A trigger extracted from a loaded module.
    Trigger(T),
    /// The relative source path, assigned in path-only mode.
    Path(String),
    /// A function group created by a dash in the function name.
    Group(BTreeMap<String, ExportNode<T>>),
}

impl<T> ExportNode<T> {
    fn group() -> Self {
        ExportNode::Group(BTreeMap::new())
    }

    pub fn is_group(&self) -> bool {
        matches!(self, ExportNode::Group(_))
    }

    pub fn as_trigger(&self) -> Option<&T> {
        match self {
            ExportNode::Trigger(trigger) => Some(trigger),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&str> {
        match self {
            ExportNode::Path(path) => Some(path),
            _ => None,
        }
    }
}

/// Caller-owned exports. The exporter only ever writes into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Exports<T> {
    root: BTreeMap<String, ExportNode<T>>,
}

impl<T> Default for Exports<T> {
    fn default() -> Self {
        Self {
            root: BTreeMap::new(),
        }
    }
}

impl<T> Exports<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-set `node` at a dot-delimited property path.
    ///
    /// Missing groups are created. A leaf standing where a group is needed is
    /// replaced by a group. An existing value at the final key is overwritten;
    /// siblings are left alone.
    pub fn set(&mut self, property_path: &str, node: ExportNode<T>) {
        let segments: Vec<&str> = property_path.split(PROPERTY_DELIMITER).collect();
        set_in(&mut self.root, &segments, node);
    }

    pub fn set_trigger(&mut self, property_path: &str, trigger: T) {
        self.set(property_path, ExportNode::Trigger(trigger));
    }

    pub fn set_path(&mut self, property_path: &str, relative_path: impl Into<String>) {
        self.set(property_path, ExportNode::Path(relative_path.into()));
    }

    /// Look up a node by dot-delimited property path.
    pub fn get(&self, property_path: &str) -> Option<&ExportNode<T>> {
        let mut segments = property_path.split(PROPERTY_DELIMITER);
        let first = segments.next()?;
        let mut node = self.root.get(first)?;
        for segment in segments {
            match node {
                ExportNode::Group(children) => node = children.get(segment)?,
                _ => return None,
            }
        }
        Some(node)
    }

    pub fn contains(&self, property_path: &str) -> bool {
        self.get(property_path).is_some()
    }

    pub fn trigger(&self, property_path: &str) -> Option<&T> {
        self.get(property_path).and_then(ExportNode::as_trigger)
    }

    /// Top-level keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Every non-group node with its full property path, depth first.
    pub fn leaves(&self) -> Vec<(String, &ExportNode<T>)> {
        let mut out = Vec::new();
        collect_leaves(&self.root, String::new(), &mut out);
        out
    }

    pub fn as_map(&self) -> &BTreeMap<String, ExportNode<T>> {
        &self.root
    }

    pub fn into_inner(self) -> BTreeMap<String, ExportNode<T>> {
        self.root
    }
}

fn set_in<T>(
    map: &mut BTreeMap<String, ExportNode<T>>,
    segments: &[&str],
    node: ExportNode<T>,
) {
    match segments {
        [] => {}
        [last] => {
            map.insert(last.to_string(), node);
        }
        [first, rest @ ..] => {
            let entry = map
                .entry(first.to_string())
                .or_insert_with(ExportNode::group);
            if !entry.is_group() {
                *entry = ExportNode::group();
            }
            if let ExportNode::Group(children) = entry {
                set_in(children, rest, node);
            }
        }
    }
}

fn collect_leaves<'a, T>(
    map: &'a BTreeMap<String, ExportNode<T>>,
    prefix: String,
    out: &mut Vec<(String, &'a ExportNode<T>)>,
) {
    for (key, node) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}{}{}", prefix, PROPERTY_DELIMITER, key)
        };
        match node {
            ExportNode::Group(children) => collect_leaves(children, path, out),
            leaf => out.push((path, leaf)),
        }
    }
}
