//! Bitmap glyph sheets.
//!
//! A sheet is an image cut in a grid of equally sized cells, one per character. The width of a
//! bitmap glyph is derived from the right-most column of its cell holding a visible pixel.

use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::error::{Result, WidthError};

/// Display height used when none is given.
const DEFAULT_HEIGHT: u32 = 8;

/// A bitmap glyph sheet whose geometry was validated.
#[derive(Debug, Clone)]
pub struct GlyphSheet {
    rows: Vec<Vec<char>>,
    display_height: u32,
    width: u32,
    height: u32,
    alpha: Vec<u8>,
    cell_width: u32,
    cell_height: u32,
}

/// Builder for `GlyphSheet`.
///
/// # Example
///
/// ```
/// use glyph_widths::GlyphSheet;
///
/// // Two 2x2 cells side by side, 'a' with a single visible pixel.
/// let alpha = vec![
///     255, 0, 0, 0,
///     0, 0, 0, 0,
/// ];
/// let sheet = GlyphSheet::builder()
///     .row("ab")
///     .height(2)
///     .from_alpha(4, 2, alpha)
///     .unwrap();
/// assert_eq!(sheet.widths(), vec![('a' as i32, 2.0), ('b' as i32, 1.0)]);
/// ```
#[derive(Debug, Clone)]
pub struct SheetBuilder {
    rows: Vec<String>,
    height: u32,
}

impl Default for SheetBuilder {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            height: DEFAULT_HEIGHT,
        }
    }
}

impl SheetBuilder {
    /// Appends a row of characters, laid out left to right.
    pub fn row<S: Into<String>>(mut self, row: S) -> Self {
        self.rows.push(row.into());
        self
    }

    pub fn rows<I, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.extend(rows.into_iter().map(Into::into));
        self
    }

    /// Height, in pixels, at which glyphs of this sheet are displayed. Defaults to 8.
    pub fn height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// Builds a sheet from one alpha value per pixel, row-major.
    pub fn from_alpha(self, width: u32, height: u32, alpha: Vec<u8>) -> Result<GlyphSheet> {
        if alpha.len() != width as usize * height as usize {
            return Err(WidthError::InvalidSheet("alpha buffer does not match the sheet size"));
        }
        let rows: Vec<Vec<char>> = self.rows.iter().map(|row| row.chars().collect()).collect();
        let columns = match rows.first() {
            None => return Err(WidthError::InvalidSheet("no character rows")),
            Some(first) if first.is_empty() => {
                return Err(WidthError::InvalidSheet("empty first character row"))
            }
            Some(first) => first.len() as u32,
        };
        let cell_width = width / columns;
        let cell_height = height / rows.len() as u32;
        if cell_width == 0 || cell_height == 0 {
            return Err(WidthError::InvalidSheet("glyph cells are smaller than a pixel"));
        }
        if rows.iter().any(|row| row.len() as u32 * cell_width > width) {
            return Err(WidthError::InvalidSheet("a row holds more glyphs than fit the sheet"));
        }
        Ok(GlyphSheet {
            rows,
            display_height: self.height,
            width,
            height,
            alpha,
            cell_width,
            cell_height,
        })
    }

    pub fn from_image(self, image: &DynamicImage) -> Result<GlyphSheet> {
        let (width, height) = image.dimensions();
        let alpha = image.to_rgba().pixels().map(|pixel| pixel.0[3]).collect();
        self.from_alpha(width, height, alpha)
    }

    /// Decodes the sheet image from `bytes`, guessing the format when none is given.
    pub fn from_image_bytes(self, bytes: &[u8], format: Option<ImageFormat>) -> Result<GlyphSheet> {
        let image = match format {
            Some(format) => image::load_from_memory_with_format(bytes, format),
            None => image::load_from_memory(bytes),
        }?;
        self.from_image(&image)
    }
}

impl GlyphSheet {
    pub fn builder() -> SheetBuilder {
        SheetBuilder::default()
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn cell_dimensions(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    #[inline]
    fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.alpha[y as usize * self.width as usize + x as usize]
    }

    /// Number of columns from the left edge of the cell to its right-most visible pixel.
    fn visible_width(&self, column: u32, row: u32) -> u32 {
        let left = column * self.cell_width;
        let top = row * self.cell_height;
        (0..self.cell_width)
            .rev()
            .find(|&i| (0..self.cell_height).any(|k| self.alpha_at(left + i, top + k) != 0))
            .map_or(0, |i| i + 1)
    }

    /// Advance of every character of the sheet, in row order.
    ///
    /// The visible width is scaled to the display height, rounded, and followed by one pixel of
    /// spacing.
    pub fn widths(&self) -> Vec<(i32, f32)> {
        let scale = self.display_height as f32 / self.cell_height as f32;
        let mut widths = Vec::new();
        for (y, row) in self.rows.iter().enumerate() {
            for (x, &c) in row.iter().enumerate() {
                let visible = self.visible_width(x as u32, y as u32);
                let advance = (0.5 + f64::from(visible as f32 * scale)) as i32 + 1;
                widths.push((c as i32, advance as f32));
            }
        }
        log::debug!(
            "computed {} bitmap widths from a {}x{} sheet",
            widths.len(),
            self.width,
            self.height
        );
        widths
    }
}
