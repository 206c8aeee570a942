//! Font metrics and text encoding for the standard Times faces.
//!
//! The PDF uses the base-14 `Times-Roman` and `Times-Bold` fonts with
//! `WinAnsiEncoding`, so no font program is embedded. Widths come from the
//! Adobe AFM files (units of 1/1000 em). Accented Latin-1 letters borrow the
//! width of their base letter.

/// One of the two faces the renderer draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
}

impl FontFace {
    /// Name of the font in the page resource dictionary.
    pub fn resource_name(self) -> &'static [u8] {
        match self {
            FontFace::Regular => b"F1",
            FontFace::Bold => b"F2",
        }
    }

    /// PostScript name of the standard font.
    pub fn base_font(self) -> &'static [u8] {
        match self {
            FontFace::Regular => b"Times-Roman",
            FontFace::Bold => b"Times-Bold",
        }
    }

    /// Face used for a run with the given emphasis.
    pub fn for_emphasis(bold: bool) -> Self {
        if bold {
            FontFace::Bold
        } else {
            FontFace::Regular
        }
    }
}

const DEFAULT_WIDTH: u16 = 500;

// Widths for bytes 0x20..=0x7E.
#[rustfmt::skip]
const TIMES_ROMAN_ASCII: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD_ASCII: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

// Base letters for 0xC0..=0xFF; `*` marks glyphs with their own width.
const LATIN1_LETTER_BASE: &[u8; 64] =
    b"AAAAAA*CEEEEIIIIDNOOOOO*OUUUUY*saaaaaa*ceeeeiiiidnooooo*ouuuuy*y";

/// Width of one WinAnsi-encoded byte in 1/1000 em.
pub fn byte_width(face: FontFace, byte: u8) -> u16 {
    let ascii = match face {
        FontFace::Regular => &TIMES_ROMAN_ASCII,
        FontFace::Bold => &TIMES_BOLD_ASCII,
    };
    let bold = face == FontFace::Bold;

    match byte {
        0x20..=0x7E => ascii[(byte - 0x20) as usize],
        0x85 | 0x89 => 1000,
        0x91 | 0x92 => 333,
        0x93 | 0x94 => if bold { 500 } else { 444 },
        0x95 => 350,
        0x96 => 500,
        0x97 => 1000,
        0x99 => if bold { 1000 } else { 980 },
        0xA0 => 250,
        0xC6 => if bold { 1000 } else { 889 },
        0xE6 => 722,
        0xD7 | 0xF7 => if bold { 570 } else { 564 },
        0xDE => 611,
        0xFE => 556,
        0xC0..=0xFF => {
            let base = LATIN1_LETTER_BASE[(byte - 0xC0) as usize];
            if base == b'*' {
                DEFAULT_WIDTH
            } else {
                ascii[(base - 0x20) as usize]
            }
        }
        _ => DEFAULT_WIDTH,
    }
}

/// Width of `text` in points when set in `face` at `size`.
pub fn text_width(text: &str, face: FontFace, size: f32) -> f32 {
    let units: u32 = encode_win_ansi(text)
        .into_iter()
        .map(|b| byte_width(face, b) as u32)
        .sum();
    units as f32 * size / 1000.0
}

/// Encode text for a simple font with `WinAnsiEncoding`.
///
/// Tabs become spaces, other control characters are dropped and characters
/// outside the code page are replaced by `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().filter_map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        '\t' => b' ',
        c if (c as u32) < 0x20 || c == '\u{7F}' => return None,
        c if (c as u32) < 0x7F => c as u8,
        c if (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => b'?',
    };
    Some(byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_widths() {
        assert_eq!(byte_width(FontFace::Regular, b' '), 250);
        assert_eq!(byte_width(FontFace::Regular, b'W'), 944);
        assert_eq!(byte_width(FontFace::Bold, b'W'), 1000);
        assert_eq!(byte_width(FontFace::Regular, b'~'), 541);
    }

    #[test]
    fn bold_is_wider() {
        let text = "Senior Software Engineer";
        assert!(text_width(text, FontFace::Bold, 12.0) > text_width(text, FontFace::Regular, 12.0));
    }

    #[test]
    fn width_scales_with_size() {
        let w12 = text_width("abc", FontFace::Regular, 12.0);
        let w24 = text_width("abc", FontFace::Regular, 24.0);
        assert!((w24 - 2.0 * w12).abs() < 1e-4);
        // a + b + c = 444 + 500 + 444
        assert!((w12 - 1388.0 * 12.0 / 1000.0).abs() < 1e-4);
    }

    #[test]
    fn encodes_typographic_punctuation() {
        assert_eq!(encode_win_ansi("•"), vec![0x95]);
        assert_eq!(encode_win_ansi("a–b—c"), vec![b'a', 0x96, b'b', 0x97, b'c']);
        assert_eq!(encode_win_ansi("“x”"), vec![0x93, b'x', 0x94]);
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
    }

    #[test]
    fn unmappable_and_control_characters() {
        assert_eq!(encode_win_ansi("a\u{4E2D}b"), b"a?b".to_vec());
        assert_eq!(encode_win_ansi("a\tb\u{7}"), b"a b".to_vec());
    }

    #[test]
    fn accented_letters_borrow_base_width() {
        assert_eq!(
            byte_width(FontFace::Regular, 0xE9),
            byte_width(FontFace::Regular, b'e')
        );
        assert_eq!(byte_width(FontFace::Regular, 0x95), 350);
    }
}
