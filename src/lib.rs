//! Pixel widths of text drawn with a fixed glyph set, and spacing composed out of space glyphs.
//!
//! Widths are loaded from a compact binary table (see [`GlyphWidths`]). The space glyphs of that
//! table are indexed by width, so that any pixel offset can be approximated by a sequence of
//! space characters:
//!
//! ```
//! use glyph_widths::GlyphWidthManager;
//!
//! let mut manager = GlyphWidthManager::new();
//! manager.glyph_widths_mut().add_space_advances(vec![(0xf801, 1.0), (0xf804, 4.0)]);
//! manager.glyph_widths_mut().add_bitmap_widths(vec![('A' as i32, 6.0)]);
//! manager.rebuild_index();
//!
//! assert_eq!(manager.text_width("AA"), 12.0);
//! assert_eq!(manager.spaces_for_width(6.0), "\u{f804}\u{f801}\u{f801}");
//! ```

mod error;
mod index;
mod manager;
mod sheet;
pub mod sort;
mod widths;

pub use self::error::{Result, WidthError};
pub use self::index::WidthIndex;
pub use self::manager::{GlyphWidthManager, SpaceCodepoints};
pub use self::sheet::{GlyphSheet, SheetBuilder};
pub use self::widths::GlyphWidths;
