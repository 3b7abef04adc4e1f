//! Bounded array rendering in the style of numpy's `array2string`.

use crate::container::element_count;
use crate::error::{H5LensError, Result};
use unicode_width::UnicodeWidthStr;

/// Layout rules for rendering an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayLayout {
    /// Text placed between elements.
    pub separator: &'static str,
    /// Wrap rows longer than this many columns.
    pub line_width: usize,
    /// Summarise arrays holding more elements than this.
    pub threshold: usize,
    /// Elements kept at each end of a summarised axis.
    pub edge_items: usize,
    /// Strip the newlines after wrapping.
    pub single_line: bool,
}

impl ArrayLayout {
    /// Layout for attribute table cells.
    pub const ATTRIBUTE: ArrayLayout = ArrayLayout {
        separator: ", ",
        line_width: 80,
        threshold: 1000,
        edge_items: 3,
        single_line: true,
    };

    /// Layout for the data panel preview.
    pub const PREVIEW: ArrayLayout = ArrayLayout {
        separator: " ",
        line_width: 80,
        threshold: 1000,
        edge_items: 3,
        single_line: false,
    };
}

impl Default for ArrayLayout {
    fn default() -> Self {
        Self::PREVIEW
    }
}

/// Render `values` (row-major) as an array of the given `shape`.
///
/// Fails when the number of values does not match the shape.
pub fn render_array(shape: &[usize], values: &[String], layout: &ArrayLayout) -> Result<String> {
    let Some(expected) = element_count(shape) else {
        return Err(H5LensError::Format(format!("shape {:?} is too large", shape)));
    };
    if expected != values.len() {
        return Err(H5LensError::Format(format!(
            "{} values do not fill shape {:?}",
            values.len(),
            shape
        )));
    }

    if shape.is_empty() {
        return values
            .first()
            .cloned()
            .ok_or_else(|| H5LensError::Format("scalar without a value".to_string()));
    }

    let renderer = Renderer {
        shape,
        values,
        layout,
        summarize: values.len() > layout.threshold,
        width: values.iter().map(|v| v.width()).max().unwrap_or(0),
    };

    let mut out = String::new();
    renderer.write_axis(&mut out, 0, 0);

    if layout.single_line {
        out = out.replace('\n', "");
    }
    Ok(out)
}

struct Renderer<'a> {
    shape: &'a [usize],
    values: &'a [String],
    layout: &'a ArrayLayout,
    summarize: bool,
    width: usize,
}

impl Renderer<'_> {
    /// Indices shown along an axis of length `len`; `None` marks the ellipsis.
    fn shown(&self, len: usize) -> Vec<Option<usize>> {
        let edge = self.layout.edge_items;
        if self.summarize && len > 2 * edge {
            (0..edge)
                .map(Some)
                .chain(std::iter::once(None))
                .chain((len - edge..len).map(Some))
                .collect()
        } else {
            (0..len).map(Some).collect()
        }
    }

    fn write_axis(&self, out: &mut String, axis: usize, offset: usize) {
        let ndim = self.shape.len();
        let stride: usize = self.shape[axis + 1..].iter().product();
        let indent = " ".repeat(axis + 1);
        let separator = self.layout.separator;

        out.push('[');
        if axis + 1 == ndim {
            let mut line_len = indent.len();
            for (i, idx) in self.shown(self.shape[axis]).into_iter().enumerate() {
                let item = match idx {
                    Some(j) => {
                        let value = &self.values[offset + j];
                        let pad = self.width.saturating_sub(value.width());
                        format!("{}{}", " ".repeat(pad), value)
                    },
                    None => "...".to_string(),
                };
                if i > 0 {
                    if line_len + separator.len() + item.width() + 1 > self.layout.line_width {
                        out.push_str(separator.trim_end());
                        out.push('\n');
                        out.push_str(&indent);
                        line_len = indent.len();
                    } else {
                        out.push_str(separator);
                        line_len += separator.len();
                    }
                }
                out.push_str(&item);
                line_len += item.width();
            }
        } else {
            for (i, idx) in self.shown(self.shape[axis]).into_iter().enumerate() {
                if i > 0 {
                    out.push_str(separator.trim_end());
                    out.push_str(&"\n".repeat(ndim - axis - 1));
                    out.push_str(&indent);
                }
                match idx {
                    Some(j) => self.write_axis(out, axis + 1, offset + j * stride),
                    None => out.push_str("..."),
                }
            }
        }
        out.push(']');
    }
}
