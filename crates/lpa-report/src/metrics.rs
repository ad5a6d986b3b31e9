//! Base-14 Helvetica metrics and WinAnsi encoding
//!
//! Widths are in thousandths of the font size, taken from the Adobe AFM
//! files for printable ASCII.

use serde::{Deserialize, Serialize};

/// Millimetres per PDF point
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// Font face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Font {
    /// Helvetica
    Regular,
    /// Helvetica-Bold
    Bold,
    /// Helvetica-Oblique
    Italic,
}

impl Font {
    /// Resource name in the page dictionary
    #[must_use]
    pub const fn resource(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
            Self::Italic => "F3",
        }
    }

    /// PostScript base font name
    #[must_use]
    pub const fn base_font(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
            Self::Italic => "Helvetica-Oblique",
        }
    }

    /// All faces, in resource order
    pub const ALL: [Self; 3] = [Self::Regular, Self::Bold, Self::Italic];
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Map a character to its WinAnsi byte
///
/// Characters outside the encoding become `?`.
#[must_use]
pub fn win_ansi(c: char) -> u8 {
    match c {
        '\u{20}'..='\u{7e}' => c as u8,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{a0}'..='\u{ff}' => c as u8,
        _ => b'?',
    }
}

/// Encode a string to WinAnsi bytes
#[must_use]
pub fn encode(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi).collect()
}

fn byte_width(font: Font, byte: u8) -> u16 {
    let table = match font {
        Font::Bold => &HELVETICA_BOLD,
        Font::Regular | Font::Italic => &HELVETICA,
    };
    match byte {
        0x20..=0x7e => table[usize::from(byte - 0x20)],
        0x91 | 0x92 => 222,
        0x93 | 0x94 => 333,
        0x95 => 350,
        0x96 => 556,
        0x97 => 1000,
        _ => 556,
    }
}

/// Width of a string in millimetres
#[must_use]
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| u32::from(byte_width(font, win_ansi(c))))
        .sum();
    units as f32 / 1000.0 * size * MM_PER_PT
}

/// Split text into lines no wider than `max_width` millimetres
///
/// Explicit newlines are kept, so blank lines survive. Words wider than a
/// line are broken between characters.
#[must_use]
pub fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if text_width(&candidate, font, size) <= max_width {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            // break an over-long word
            for c in word.chars() {
                let mut next = line.clone();
                next.push(c);
                if !line.is_empty() && text_width(&next, font, size) > max_width {
                    lines.push(std::mem::take(&mut line));
                    line.push(c);
                } else {
                    line = next;
                }
            }
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_follow_afm() {
        // "Hi" = 722 + 222 units at 10pt
        let w = text_width("Hi", Font::Regular, 10.0);
        assert!((w - 0.944 * 10.0 * MM_PER_PT).abs() < 1e-4);
        assert!(text_width("Hi", Font::Bold, 10.0) > w);
        assert_eq!(text_width("Hi", Font::Italic, 10.0), w);
    }

    #[test]
    fn encoding_maps_typography() {
        assert_eq!(encode("a•b"), vec![b'a', 0x95, b'b']);
        assert_eq!(encode("é"), vec![0xe9]);
        assert_eq!(encode("日本"), vec![b'?', b'?']);
    }

    #[test]
    fn wrap_respects_width_and_newlines() {
        let text = "The quick brown fox jumps over the lazy dog\n\nagain";
        let lines = wrap(text, Font::Regular, 11.0, 40.0);
        assert!(lines.len() > 3);
        assert!(lines.contains(&String::new()));
        assert_eq!(lines.last().map(String::as_str), Some("again"));
        for line in &lines {
            assert!(text_width(line, Font::Regular, 11.0) <= 40.0);
        }
    }

    #[test]
    fn wrap_breaks_long_words() {
        let word = "W".repeat(80);
        let lines = wrap(&word, Font::Bold, 14.0, 50.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(text_width(line, Font::Bold, 14.0) <= 50.0);
        }
    }
}
