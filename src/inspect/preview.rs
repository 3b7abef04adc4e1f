//! Bounded text preview collected while chunks stream past.

use crate::container::{DataChunk, Dtype};
use crate::format::{clip_text, render_array, ArrayLayout};
use std::collections::VecDeque;
use std::ops::Range;

/// Keeps just enough rendered values to build the preview.
///
/// When the dataset fits under the threshold every value is kept; otherwise
/// only the first and last `edge_items` values are, whatever the dataset size.
/// Strings are clipped as they are rendered.
#[derive(Debug, Clone)]
pub(crate) struct PreviewBuffer {
    shape: Vec<usize>,
    total: usize,
    head_limit: usize,
    edge_items: usize,
    threshold: usize,
    single_precision: bool,
    head: Vec<String>,
    tail: VecDeque<String>,
    seen: usize,
}

impl PreviewBuffer {
    pub(crate) fn new(
        shape: &[usize],
        total: usize,
        dtype: &Dtype,
        threshold: usize,
        edge_items: usize,
    ) -> Self {
        let head_limit = if total <= threshold { total } else { edge_items };
        Self {
            shape: shape.to_vec(),
            total,
            head_limit,
            edge_items,
            threshold,
            single_precision: *dtype == Dtype::Float(32),
            head: Vec::with_capacity(head_limit),
            tail: VecDeque::with_capacity(edge_items),
            seen: 0,
        }
    }

    fn summarised(&self) -> bool {
        self.total > self.threshold
    }

    /// Record the values of the next chunk.
    pub(crate) fn push(&mut self, chunk: &DataChunk) {
        let len = chunk.len();

        if self.seen < self.head_limit {
            let take = (self.head_limit - self.seen).min(len);
            self.head.extend(self.render(chunk, 0..take));
        }

        if self.summarised() {
            let start = len.saturating_sub(self.edge_items);
            for value in self.render(chunk, start..len) {
                if self.tail.len() == self.edge_items {
                    self.tail.pop_front();
                }
                self.tail.push_back(value);
            }
        }

        self.seen += len;
    }

    fn render(&self, chunk: &DataChunk, range: Range<usize>) -> Vec<String> {
        match chunk {
            DataChunk::Int(v) => v[range].iter().map(|x| x.to_string()).collect(),
            DataChunk::UInt(v) => v[range].iter().map(|x| x.to_string()).collect(),
            DataChunk::Float(v) if self.single_precision => {
                v[range].iter().map(|x| format!("{:?}", *x as f32)).collect()
            },
            DataChunk::Float(v) => v[range].iter().map(|x| format!("{:?}", x)).collect(),
            DataChunk::Text(v) => v[range].iter().map(|x| format!("'{}'", clip_text(x))).collect(),
        }
    }

    /// Build the preview text.
    pub(crate) fn finish(&self) -> Result<String, String> {
        if self.seen != self.total {
            return Err(format!(
                "read {} values, dataset holds {}",
                self.seen, self.total
            ));
        }
        if self.total == 0 {
            return Ok("[]".to_string());
        }

        if !self.summarised() {
            let layout = ArrayLayout {
                threshold: self.threshold,
                edge_items: self.edge_items,
                ..ArrayLayout::PREVIEW
            };
            return render_array(&self.shape, &self.head, &layout).map_err(|e| e.to_string());
        }

        let mut items: Vec<&str> = self.head.iter().map(String::as_str).collect();
        items.push("...");
        items.extend(self.tail.iter().map(String::as_str));
        Ok(format!(
            "[{}]\n\n({} elements, showing first {} and last {})",
            items.join(" "),
            self.total,
            self.head.len(),
            self.tail.len()
        ))
    }
}
