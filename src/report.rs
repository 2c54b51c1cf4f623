//! Rendering of the exports structure.

use anyhow::Result;
use exportfns::{ExportNode, Exports};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Render exports as a JSON document.
pub fn render_json<T: Serialize>(exports: &Exports<T>, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(exports)?
    } else {
        serde_json::to_string(exports)?
    };
    Ok(json)
}

/// Render exports as an indented tree.
///
/// ```text
/// folder
///   new: folder/new.func.json
/// sample: {"trigger":"https"}
/// ```
pub fn render_tree<T: Display>(exports: &Exports<T>) -> String {
    let mut output = String::new();
    write_group(exports.as_map(), 0, &mut output);
    output
}

fn write_group<T: Display>(
    group: &BTreeMap<String, ExportNode<T>>,
    depth: usize,
    output: &mut String,
) {
    let indent = "  ".repeat(depth);
    for (key, node) in group {
        match node {
            ExportNode::Group(children) => {
                output.push_str(&format!("{}{}\n", indent, key));
                write_group(children, depth + 1, output);
            }
            ExportNode::Trigger(trigger) => {
                output.push_str(&format!("{}{}: {}\n", indent, key, trigger));
            }
            ExportNode::Path(path) => {
                output.push_str(&format!("{}{}: {}\n", indent, key, path));
            }
        }
    }
}
