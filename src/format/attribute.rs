//! Attribute and metadata panel formatting.
//!
//! [`format_attribute`] is total: every value, including ones that cannot be
//! decoded or rendered, produces exactly one table row. Strings in a row are
//! clipped to [`MAX_VALUE_WIDTH`](super::MAX_VALUE_WIDTH) columns each.

use super::{clip_text, render_array, shape_tuple, single_line, ArrayLayout};
use crate::container::{AttributeValue, Dtype, NodeKind};

/// Header and separator rows of the attribute table.
const TABLE_HEAD: &str = "| Key | Type | Value |\n| --- | ---- | ----- |\n";

/// Format one attribute as a markdown table row (without trailing newline).
pub fn format_attribute(key: &str, value: &AttributeValue) -> String {
    let key = single_line(&clip_text(key));
    match value {
        AttributeValue::Scalar(number) => {
            format!("| {} | {} | {} |", key, number.kind_name(), number)
        },
        AttributeValue::Text { kind, value } => {
            format!("| {} | {} | {} |", key, kind.name(), single_line(&clip_text(value)))
        },
        AttributeValue::Array { shape, values } => {
            match render_array(shape, &values.to_strings(), &ArrayLayout::ATTRIBUTE) {
                Ok(text) => format!("| {} | array{} | `{}` |", key, shape_tuple(shape), text),
                Err(e) => {
                    tracing::debug!("Attribute {} not renderable: {}", key, e);
                    format!("| {} | array | <error formatting> |", key)
                },
            }
        },
        AttributeValue::Unrecognized { kind } => {
            format!("| {} | {} | no display |", key, single_line(&clip_text(kind)))
        },
    }
}

/// Format all attributes as a markdown table, header included.
pub fn attribute_table(attributes: &[(String, AttributeValue)]) -> String {
    let mut table = String::from(TABLE_HEAD);
    for (key, value) in attributes {
        table.push_str(&format_attribute(key, value));
        table.push('\n');
    }
    table
}

/// Build the metadata panel text for a node.
///
/// `shape` and `dtype` are only shown for datasets; pass `None` when they
/// could not be read.
pub fn metadata_text(
    path: &str,
    kind: NodeKind,
    shape: Option<&[usize]>,
    dtype: Option<&Dtype>,
    attributes: &[(String, AttributeValue)],
) -> String {
    let mut text = format!("# {}\n- HDF: {}\n", path, kind.name());

    if kind == NodeKind::Dataset {
        let shape = shape.map(shape_tuple).unwrap_or_else(|| "?".to_string());
        let dtype = dtype.map(|d| d.to_string()).unwrap_or_else(|| "?".to_string());
        text.push_str(&format!("- Shape: {}\n- Type: {}\n", shape, dtype));
    }

    if attributes.is_empty() {
        text.push_str("\n(No attributes)\n");
    } else {
        text.push_str("## Attributes\n");
        text.push_str(&attribute_table(attributes));
    }
    text
}
