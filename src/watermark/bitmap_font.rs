//! Built-in 5x7 bitmap font.
//!
//! Last step of the font fallback chain. It needs no font files, so
//! rendering can always proceed. Glyphs cover printable ASCII and are drawn
//! at a fixed 2x scale on a 6x8 cell. Any other character is drawn as a
//! hollow box.

/// Glyph width in font units.
pub const GLYPH_WIDTH: u32 = 5;
/// Glyph height in font units.
pub const GLYPH_HEIGHT: u32 = 7;
/// Cell width in font units (one blank column of spacing).
pub const CELL_WIDTH: u32 = 6;
/// Cell height in font units (one blank row below the glyph).
pub const CELL_HEIGHT: u32 = 8;
/// Fixed pixel scale of every glyph.
pub const SCALE: u32 = 2;

const FIRST_CHAR: u32 = 0x20;
const LAST_CHAR: u32 = 0x7E;

const HOLLOW_BOX: [u8; 5] = [0x7F, 0x41, 0x41, 0x41, 0x7F];

/// Column bitmaps for 0x20..=0x7E, least significant bit at the top row.
const GLYPHS: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x55, 0x22, 0x50], // &
    [0x00, 0x05, 0x03, 0x00, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00], // )
    [0x08, 0x2A, 0x1C, 0x2A, 0x08], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4B, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // :
    [0x00, 0x56, 0x36, 0x00, 0x00], // ;
    [0x00, 0x08, 0x14, 0x22, 0x41], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x41, 0x22, 0x14, 0x08, 0x00], // >
    [0x02, 0x01, 0x51, 0x09, 0x06], // ?
    [0x32, 0x49, 0x79, 0x41, 0x3E], // @
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x7F, 0x09, 0x09, 0x01, 0x01], // F
    [0x3E, 0x41, 0x41, 0x51, 0x32], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x7F, 0x02, 0x04, 0x02, 0x7F], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], // R
    [0x46, 0x49, 0x49, 0x49, 0x31], // S
    [0x01, 0x01, 0x7F, 0x01, 0x01], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x7F, 0x20, 0x18, 0x20, 0x7F], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x03, 0x04, 0x78, 0x04, 0x03], // Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // Z
    [0x00, 0x00, 0x7F, 0x41, 0x41], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // \
    [0x41, 0x41, 0x7F, 0x00, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // _
    [0x00, 0x01, 0x02, 0x04, 0x00], // `
    [0x20, 0x54, 0x54, 0x54, 0x78], // a
    [0x7F, 0x48, 0x44, 0x44, 0x38], // b
    [0x38, 0x44, 0x44, 0x44, 0x20], // c
    [0x38, 0x44, 0x44, 0x48, 0x7F], // d
    [0x38, 0x54, 0x54, 0x54, 0x18], // e
    [0x08, 0x7E, 0x09, 0x01, 0x02], // f
    [0x08, 0x14, 0x54, 0x54, 0x3C], // g
    [0x7F, 0x08, 0x04, 0x04, 0x78], // h
    [0x00, 0x44, 0x7D, 0x40, 0x00], // i
    [0x20, 0x40, 0x44, 0x3D, 0x00], // j
    [0x00, 0x7F, 0x10, 0x28, 0x44], // k
    [0x00, 0x41, 0x7F, 0x40, 0x00], // l
    [0x7C, 0x04, 0x18, 0x04, 0x78], // m
    [0x7C, 0x08, 0x04, 0x04, 0x78], // n
    [0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0x7C, 0x14, 0x14, 0x14, 0x08], // p
    [0x08, 0x14, 0x14, 0x18, 0x7C], // q
    [0x7C, 0x08, 0x04, 0x04, 0x08], // r
    [0x48, 0x54, 0x54, 0x54, 0x20], // s
    [0x04, 0x3F, 0x44, 0x40, 0x20], // t
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // u
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // v
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // w
    [0x44, 0x28, 0x10, 0x28, 0x44], // x
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // y
    [0x44, 0x64, 0x54, 0x4C, 0x44], // z
    [0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x7F, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x10, 0x08, 0x08, 0x10, 0x08], // ~
];

/// Fixed-size bitmap font. Size and style requests do not apply to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitmapFont;

impl BitmapFont {
    /// Horizontal advance of every character in pixels.
    pub fn advance(&self) -> u32 {
        CELL_WIDTH * SCALE
    }

    /// Line height in pixels.
    pub fn line_height(&self) -> u32 {
        CELL_HEIGHT * SCALE
    }

    /// Distance from the top of the cell to the baseline.
    pub fn ascent(&self) -> f32 {
        (GLYPH_HEIGHT * SCALE) as f32
    }

    /// Space below the baseline, negative like outline font descents.
    pub fn descent(&self) -> f32 {
        -(((CELL_HEIGHT - GLYPH_HEIGHT) * SCALE) as f32)
    }

    /// Whether `c` has a real glyph (rather than the hollow box).
    pub fn has_glyph(&self, c: char) -> bool {
        (FIRST_CHAR..=LAST_CHAR).contains(&(c as u32))
    }

    /// Width and height of `text` in pixels. Empty text measures zero.
    pub fn measure(&self, text: &str) -> (u32, u32) {
        let count = text.chars().count() as u32;
        if count == 0 {
            return (0, 0);
        }
        (count * self.advance(), self.line_height())
    }

    fn columns(&self, c: char) -> &'static [u8; 5] {
        if self.has_glyph(c) {
            &GLYPHS[(c as u32 - FIRST_CHAR) as usize]
        } else {
            &HOLLOW_BOX
        }
    }

    /// Call `plot(x, y)` for every lit pixel of `text`, relative to the
    /// top-left corner of the first cell.
    pub fn for_each_pixel(&self, text: &str, mut plot: impl FnMut(i32, i32)) {
        for (index, c) in text.chars().enumerate() {
            let origin_x = index as u32 * self.advance();
            for (col, bits) in self.columns(c).iter().enumerate() {
                for row in 0..GLYPH_HEIGHT {
                    if bits & (1 << row) == 0 {
                        continue;
                    }
                    let base_x = origin_x + col as u32 * SCALE;
                    let base_y = row * SCALE;
                    for dy in 0..SCALE {
                        for dx in 0..SCALE {
                            plot((base_x + dx) as i32, (base_y + dy) as i32);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_pixels(text: &str) -> Vec<(i32, i32)> {
        let mut pixels = Vec::new();
        BitmapFont.for_each_pixel(text, |x, y| pixels.push((x, y)));
        pixels
    }

    #[test]
    fn test_table_covers_printable_ascii() {
        assert_eq!(GLYPHS.len() as u32, LAST_CHAR - FIRST_CHAR + 1);
        assert!(BitmapFont.has_glyph(' '));
        assert!(BitmapFont.has_glyph('~'));
        assert!(!BitmapFont.has_glyph('\u{7F}'));
        assert!(!BitmapFont.has_glyph('水'));
    }

    #[test]
    fn test_measure() {
        assert_eq!(BitmapFont.measure(""), (0, 0));
        assert_eq!(BitmapFont.measure("A"), (12, 16));
        assert_eq!(BitmapFont.measure("SAMPLE"), (72, 16));
        // Non-ASCII still occupies one cell per character
        assert_eq!(BitmapFont.measure("水印"), (24, 16));
    }

    #[test]
    fn test_metrics_sum_to_line_height() {
        let font = BitmapFont;
        assert_eq!(font.ascent() - font.descent(), font.line_height() as f32);
    }

    #[test]
    fn test_space_draws_nothing() {
        assert!(lit_pixels(" ").is_empty());
    }

    #[test]
    fn test_pixels_stay_inside_cells() {
        let text = "Hello, World!";
        let (width, height) = BitmapFont.measure(text);
        for (x, y) in lit_pixels(text) {
            assert!(x >= 0 && (x as u32) < width);
            assert!(y >= 0 && (y as u32) < height);
        }
    }

    #[test]
    fn test_glyph_is_scaled() {
        // '|' is a single full-height column: 7 rows x 2 scale, 2 px wide
        let pixels = lit_pixels("|");
        assert_eq!(pixels.len(), (GLYPH_HEIGHT * SCALE * SCALE) as usize);
        assert!(pixels.iter().all(|&(x, _)| x == 4 || x == 5));
    }

    #[test]
    fn test_unknown_char_is_hollow_box() {
        let pixels = lit_pixels("水");
        // Corners of the box are lit, the center is not
        assert!(pixels.contains(&(0, 0)));
        assert!(pixels.contains(&(9, 13)));
        assert!(!pixels.contains(&(4, 6)));
    }
}
