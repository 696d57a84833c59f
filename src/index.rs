use hashbrown::HashMap;

use crate::error::{Result, WidthError};
use crate::sort::quick_sort_by;

/// Space glyph codepoints sorted by their width, for nearest-width lookups.
///
/// The index is a snapshot: it must be rebuilt whenever the space widths it was built from change.
#[derive(Debug, Clone, Default)]
pub struct WidthIndex {
    codepoints_by_width: Vec<i32>,
    widths_by_index: Vec<f32>,
}

impl WidthIndex {
    pub fn new() -> WidthIndex {
        WidthIndex::default()
    }

    /// Rebuilds the index from `space_widths`, discarding the previous contents.
    pub fn build(&mut self, space_widths: &HashMap<i32, f32>) {
        self.codepoints_by_width.clear();
        self.widths_by_index.clear();
        self.codepoints_by_width.extend(space_widths.keys().cloned());

        let len = self.codepoints_by_width.len();
        quick_sort_by(
            0,
            len,
            &mut self.codepoints_by_width,
            |codepoints, a, b| {
                let a = space_widths[&codepoints[a]];
                let b = space_widths[&codepoints[b]];
                a.total_cmp(&b)
            },
            |codepoints, a, b| codepoints.swap(a, b),
        );

        self.widths_by_index
            .extend(self.codepoints_by_width.iter().map(|c| space_widths[c]));
        log::debug!("built width index over {} space glyphs", len);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.codepoints_by_width.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codepoints_by_width.is_empty()
    }

    /// Codepoint at `index`, in ascending width order.
    #[inline]
    pub fn codepoint(&self, index: usize) -> i32 {
        self.codepoints_by_width[index]
    }

    /// Width at `index`, in ascending width order.
    #[inline]
    pub fn width(&self, index: usize) -> f32 {
        self.widths_by_index[index]
    }

    /// Index of the width closest to `width`.
    ///
    /// An exact match returns any matching index. Otherwise the two widths around the insertion
    /// point are compared by distance, the lower index winning ties.
    pub fn nearest_index(&self, width: f32) -> Result<usize> {
        let widths = &self.widths_by_index;
        if widths.is_empty() {
            return Err(WidthError::EmptyIndex);
        }
        let insertion = match widths.binary_search_by(|probe| probe.total_cmp(&width)) {
            Ok(exact) => return Ok(exact),
            Err(insertion) => insertion,
        };
        if insertion == 0 {
            return Ok(0);
        }
        if insertion == widths.len() {
            return Ok(insertion - 1);
        }
        let below = (widths[insertion - 1] - width).abs();
        let above = (widths[insertion] - width).abs();
        if above < below {
            Ok(insertion)
        } else {
            Ok(insertion - 1)
        }
    }

    /// Codepoint whose width is closest to `width`.
    pub fn nearest_codepoint(&self, width: f32) -> Result<i32> {
        self.nearest_index(width).map(|index| self.codepoints_by_width[index])
    }
}
