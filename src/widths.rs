//! The glyph width table and its binary format.
//!
//! The layout is little-endian, without padding, magic number or version:
//!
//! ```text
//! i32 space width count
//! i32 bitmap width count
//! space width count  * { i32 codepoint, f32 width }
//! bitmap width count * { i32 codepoint, f32 width }
//! ```

use std::io::{self, Read, Write};

use hashbrown::HashMap;

use crate::error::{Result, WidthError};

/// Size of the header and of every record.
const RECORD_LEN: usize = 8;

/// The ASCII space. A bitmap provider never overrides it once it is a space glyph.
const ASCII_SPACE: i32 = 32;

/// Codepoint to width mappings for space glyphs and bitmap glyphs.
///
/// A codepoint may be present in both mappings; lookups prefer the space width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphWidths {
    space_widths: HashMap<i32, f32>,
    bitmap_widths: HashMap<i32, f32>,
}

impl GlyphWidths {
    pub fn new() -> GlyphWidths {
        GlyphWidths::default()
    }

    #[inline]
    pub fn space_widths(&self) -> &HashMap<i32, f32> {
        &self.space_widths
    }

    #[inline]
    pub fn bitmap_widths(&self) -> &HashMap<i32, f32> {
        &self.bitmap_widths
    }

    pub fn clear(&mut self) {
        self.space_widths.clear();
        self.bitmap_widths.clear();
    }

    /// Replaces both mappings with the contents of `reader`.
    ///
    /// A header or record shorter than 8 bytes fails with `WidthError::CorruptData`. The table
    /// must not be queried after a failed load.
    pub fn load<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        self.clear();

        let mut buffer = [0u8; RECORD_LEN];
        read_record(reader, &mut buffer)?;
        let space_count = record_count(&buffer[0..4]);
        let bitmap_count = record_count(&buffer[4..8]);

        let space_widths = read_widths(reader, space_count, &mut buffer)?;
        let bitmap_widths = read_widths(reader, bitmap_count, &mut buffer)?;
        self.space_widths = space_widths;
        self.bitmap_widths = bitmap_widths;

        log::debug!(
            "loaded glyph widths space={} bitmap={}",
            self.space_widths.len(),
            self.bitmap_widths.len()
        );
        Ok(())
    }

    /// Writes both mappings to `writer`. Record order is unspecified.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut buffer = [0u8; RECORD_LEN];
        buffer[0..4].copy_from_slice(&(self.space_widths.len() as i32).to_le_bytes());
        buffer[4..8].copy_from_slice(&(self.bitmap_widths.len() as i32).to_le_bytes());
        writer.write_all(&buffer)?;

        write_widths(writer, &self.space_widths, &mut buffer)?;
        write_widths(writer, &self.bitmap_widths, &mut buffer)?;

        log::debug!(
            "saved glyph widths space={} bitmap={}",
            self.space_widths.len(),
            self.bitmap_widths.len()
        );
        Ok(())
    }

    /// Registers space glyph advances. Every codepoint given stops being a bitmap glyph.
    pub fn add_space_advances<I: IntoIterator<Item = (i32, f32)>>(&mut self, advances: I) {
        for (codepoint, advance) in advances {
            self.bitmap_widths.remove(&codepoint);
            self.space_widths.insert(codepoint, advance);
        }
    }

    /// Registers bitmap glyph widths. Every codepoint given stops being a space glyph, except
    /// for the ASCII space which is skipped when it already is one.
    pub fn add_bitmap_widths<I: IntoIterator<Item = (i32, f32)>>(&mut self, widths: I) {
        for (codepoint, width) in widths {
            if codepoint == ASCII_SPACE && self.space_widths.contains_key(&ASCII_SPACE) {
                continue;
            }
            self.space_widths.remove(&codepoint);
            self.bitmap_widths.insert(codepoint, width);
        }
    }
}

fn record_count(bytes: &[u8]) -> usize {
    let count = read_i32(bytes);
    if count < 0 {
        log::warn!("negative glyph width count {} read as 0", count);
        return 0;
    }
    count as usize
}

#[inline]
fn read_i32(bytes: &[u8]) -> i32 {
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[inline]
fn read_f32(bytes: &[u8]) -> f32 {
    f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn read_record<R: Read>(reader: &mut R, buffer: &mut [u8; RECORD_LEN]) -> Result<()> {
    reader.read_exact(buffer).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => WidthError::CorruptData,
        _ => WidthError::Io(e),
    })
}

fn read_widths<R: Read>(
    reader: &mut R,
    count: usize,
    buffer: &mut [u8; RECORD_LEN],
) -> Result<HashMap<i32, f32>> {
    // the count is untrusted, so it does not size the allocation
    let mut widths = HashMap::default();
    for _ in 0..count {
        read_record(reader, buffer)?;
        widths.insert(read_i32(&buffer[0..4]), read_f32(&buffer[4..8]));
    }
    Ok(widths)
}

fn write_widths<W: Write>(
    writer: &mut W,
    widths: &HashMap<i32, f32>,
    buffer: &mut [u8; RECORD_LEN],
) -> Result<()> {
    for (codepoint, width) in widths {
        buffer[0..4].copy_from_slice(&codepoint.to_le_bytes());
        buffer[4..8].copy_from_slice(&width.to_le_bytes());
        writer.write_all(buffer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn blob(spaces: &[(i32, f32)], bitmaps: &[(i32, f32)]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(spaces.len() as i32).to_le_bytes());
        out.extend_from_slice(&(bitmaps.len() as i32).to_le_bytes());
        for (codepoint, width) in spaces.iter().chain(bitmaps) {
            out.extend_from_slice(&codepoint.to_le_bytes());
            out.extend_from_slice(&width.to_le_bytes());
        }
        out
    }

    #[test]
    fn loads_exact_layout() {
        let data = blob(&[(32, 4.0), (0xf801, -1.0)], &[(65, 6.0)]);
        assert_eq!(data.len(), 8 + 8 * 3);

        let mut widths = GlyphWidths::new();
        widths.load(&mut Cursor::new(data)).unwrap();
        assert_eq!(widths.space_widths().len(), 2);
        assert_eq!(widths.space_widths()[&32], 4.0);
        assert_eq!(widths.space_widths()[&0xf801], -1.0);
        assert_eq!(widths.bitmap_widths().len(), 1);
        assert_eq!(widths.bitmap_widths()[&65], 6.0);
    }

    #[test]
    fn load_replaces_previous_contents() {
        let mut widths = GlyphWidths::new();
        widths.add_space_advances(vec![(1, 1.0), (2, 2.0)]);
        widths.add_bitmap_widths(vec![(97, 5.0)]);

        widths
            .load(&mut Cursor::new(blob(&[(3, 3.0)], &[])))
            .unwrap();
        assert_eq!(widths.space_widths().len(), 1);
        assert!(widths.space_widths().contains_key(&3));
        assert!(widths.bitmap_widths().is_empty());
    }

    #[test]
    fn save_writes_header_then_records() {
        let mut widths = GlyphWidths::new();
        widths.add_space_advances(vec![(32, 4.0)]);
        widths.add_bitmap_widths(vec![(65, 6.0), (66, 6.0)]);

        let mut out = Vec::new();
        widths.save(&mut out).unwrap();
        assert_eq!(out.len(), 8 + 8 * 3);
        assert_eq!(&out[0..4], &1i32.to_le_bytes());
        assert_eq!(&out[4..8], &2i32.to_le_bytes());
        // the single space record comes first
        assert_eq!(&out[8..12], &32i32.to_le_bytes());
        assert_eq!(&out[12..16], &4.0f32.to_le_bytes());

        let mut reloaded = GlyphWidths::new();
        reloaded.load(&mut Cursor::new(out)).unwrap();
        assert_eq!(reloaded, widths);
    }

    #[test]
    fn empty_table_round_trips() {
        let mut out = Vec::new();
        GlyphWidths::new().save(&mut out).unwrap();
        assert_eq!(out, [0u8; 8]);

        let mut reloaded = GlyphWidths::new();
        reloaded.load(&mut Cursor::new(out)).unwrap();
        assert!(reloaded.space_widths().is_empty());
        assert!(reloaded.bitmap_widths().is_empty());
    }

    #[test]
    fn short_header_is_corrupt() {
        let mut widths = GlyphWidths::new();
        for len in 0..8 {
            let data = vec![0u8; len];
            match widths.load(&mut Cursor::new(data)) {
                Err(WidthError::CorruptData) => {}
                other => panic!("expected corrupt data for len {}, got {:?}", len, other),
            }
        }
    }

    #[test]
    fn missing_record_is_corrupt() {
        let mut data = blob(&[(32, 4.0)], &[(65, 6.0)]);
        data.truncate(data.len() - 8);
        let mut widths = GlyphWidths::new();
        match widths.load(&mut Cursor::new(data)) {
            Err(WidthError::CorruptData) => {}
            other => panic!("expected corrupt data, got {:?}", other),
        }
    }

    #[test]
    fn negative_count_reads_no_records() {
        let mut data = Vec::new();
        data.extend_from_slice(&(-3i32).to_le_bytes());
        data.extend_from_slice(&1i32.to_le_bytes());
        data.extend_from_slice(&65i32.to_le_bytes());
        data.extend_from_slice(&6.0f32.to_le_bytes());

        let mut widths = GlyphWidths::new();
        widths.load(&mut Cursor::new(data)).unwrap();
        assert!(widths.space_widths().is_empty());
        assert_eq!(widths.bitmap_widths()[&65], 6.0);
    }

    #[test]
    fn later_duplicate_record_wins() {
        let data = blob(&[(32, 4.0), (32, 5.0)], &[]);
        let mut widths = GlyphWidths::new();
        widths.load(&mut Cursor::new(data)).unwrap();
        assert_eq!(widths.space_widths().len(), 1);
        assert_eq!(widths.space_widths()[&32], 5.0);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream closed"))
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn stream_failures_are_io_errors() {
        let mut widths = GlyphWidths::new();
        match widths.load(&mut FailingReader) {
            Err(WidthError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("expected an i/o error, got {:?}", other),
        }

        widths.add_space_advances(vec![(32, 4.0)]);
        match widths.save(&mut FailingWriter) {
            Err(WidthError::Io(_)) => {}
            other => panic!("expected an i/o error, got {:?}", other),
        }
        // saving never touches the table
        assert_eq!(widths.space_widths()[&32], 4.0);
    }

    #[test]
    fn providers_override_each_other() {
        let mut widths = GlyphWidths::new();
        widths.add_bitmap_widths(vec![(65, 6.0), (32, 4.0)]);
        widths.add_space_advances(vec![(65, 3.0)]);
        assert!(!widths.bitmap_widths().contains_key(&65));
        assert_eq!(widths.space_widths()[&65], 3.0);

        widths.add_bitmap_widths(vec![(65, 7.0)]);
        assert!(!widths.space_widths().contains_key(&65));
        assert_eq!(widths.bitmap_widths()[&65], 7.0);
    }

    #[test]
    fn bitmap_never_replaces_the_space_glyph() {
        let mut widths = GlyphWidths::new();
        widths.add_space_advances(vec![(32, 4.0)]);
        widths.add_bitmap_widths(vec![(32, 2.0), (33, 2.0)]);
        assert_eq!(widths.space_widths()[&32], 4.0);
        assert!(!widths.bitmap_widths().contains_key(&32));
        assert_eq!(widths.bitmap_widths()[&33], 2.0);
    }
}
