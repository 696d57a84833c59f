use std::io::{Read, Write};

use smallvec::SmallVec;

use crate::error::Result;
use crate::index::WidthIndex;
use crate::widths::GlyphWidths;

/// Codepoints of space glyphs, in the order they should be written.
pub type SpaceCodepoints = SmallVec<[i32; 8]>;

/// Measures text and composes arbitrary spacing out of a fixed set of glyph widths.
///
/// The manager owns a [`GlyphWidths`] table and the [`WidthIndex`] built over its space glyphs.
/// Loading new data rebuilds the index; changes made through
/// [`glyph_widths_mut`](GlyphWidthManager::glyph_widths_mut) require a call to
/// [`rebuild_index`](GlyphWidthManager::rebuild_index).
///
/// The manager is not synchronized. Share it behind a lock covering both loads and queries.
#[derive(Debug, Clone, Default)]
pub struct GlyphWidthManager {
    glyph_widths: GlyphWidths,
    index: WidthIndex,
}

impl GlyphWidthManager {
    pub fn new() -> GlyphWidthManager {
        GlyphWidthManager::default()
    }

    /// Creates a manager from serialized glyph widths.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<GlyphWidthManager> {
        let mut manager = GlyphWidthManager::new();
        manager.load_glyph_data(&mut reader)?;
        Ok(manager)
    }

    /// Replaces the glyph widths with the ones read from `reader`, and rebuilds the index.
    ///
    /// After a failure the manager must not be queried until a load succeeds.
    pub fn load_glyph_data<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        self.index = WidthIndex::new();
        self.glyph_widths.load(reader)?;
        self.rebuild_index();
        Ok(())
    }

    pub fn save_glyph_data<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.glyph_widths.save(writer)
    }

    pub fn rebuild_index(&mut self) {
        self.index.build(self.glyph_widths.space_widths());
    }

    #[inline]
    pub fn glyph_widths(&self) -> &GlyphWidths {
        &self.glyph_widths
    }

    /// Mutable access to the table. The index goes stale until `rebuild_index` is called.
    #[inline]
    pub fn glyph_widths_mut(&mut self) -> &mut GlyphWidths {
        &mut self.glyph_widths
    }

    #[inline]
    pub fn index(&self) -> &WidthIndex {
        &self.index
    }

    /// Returns the space glyph whose width is closest to `width`.
    ///
    /// Fails with `WidthError::EmptyIndex` when no space glyph is known.
    pub fn nearest_codepoint(&self, width: f32) -> Result<i32> {
        self.index.nearest_codepoint(width)
    }

    /// Greedily picks space glyphs whose summed width approaches `width`.
    ///
    /// Every step takes the glyph nearest to what is left, and stops as soon as that glyph would
    /// not bring the remainder closer to zero. The result is not guaranteed to be exact nor
    /// optimal, and is empty when no space glyph is known.
    pub fn space_codepoints_for_width(&self, width: f32) -> SpaceCodepoints {
        let mut codepoints = SpaceCodepoints::new();
        let mut remaining = width;
        while let Ok(index) = self.index.nearest_index(remaining) {
            let next = remaining - self.index.width(index);
            // strict, so that zero-width glyphs and NaN end the search
            if !(next.abs() < remaining.abs()) {
                break;
            }
            log::trace!(
                "space glyph {} moves {} to {}",
                self.index.codepoint(index),
                remaining,
                next
            );
            remaining = next;
            codepoints.push(self.index.codepoint(index));
        }
        codepoints
    }

    /// Same as [`space_codepoints_for_width`](GlyphWidthManager::space_codepoints_for_width), as
    /// text.
    ///
    /// Codepoints which are not valid chars are written as U+FFFD.
    pub fn spaces_for_width(&self, width: f32) -> String {
        self.space_codepoints_for_width(width)
            .iter()
            .map(|&codepoint| {
                let c = if codepoint < 0 { None } else { std::char::from_u32(codepoint as u32) };
                c.unwrap_or_else(|| {
                    log::warn!("space glyph {} is not a valid char", codepoint);
                    std::char::REPLACEMENT_CHARACTER
                })
            })
            .collect()
    }

    /// Returns whether `codepoint` is a space glyph or a bitmap glyph.
    pub fn has(&self, codepoint: i32) -> bool {
        self.glyph_widths.space_widths().contains_key(&codepoint)
            || self.glyph_widths.bitmap_widths().contains_key(&codepoint)
    }

    /// Width of `codepoint`, space widths taking priority over bitmap widths.
    ///
    /// Unknown codepoints are 0 wide; use [`has`](GlyphWidthManager::has) to tell them apart.
    pub fn width(&self, codepoint: i32) -> f32 {
        if let Some(&width) = self.glyph_widths.space_widths().get(&codepoint) {
            return width;
        }
        self.glyph_widths
            .bitmap_widths()
            .get(&codepoint)
            .cloned()
            .unwrap_or(0.0)
    }

    /// Sum of the widths of every char of `text`.
    pub fn text_width(&self, text: &str) -> f32 {
        text.chars().map(|c| self.width(c as i32)).sum()
    }
}
