//! Text metrics and font handling shared by the serializers.
//!
//! The PDF backend uses the base-14 Helvetica faces, which every reader
//! provides, so captions are measured with their standard AFM advance
//! widths. The raster backend outlines glyphs from a [`FontSet`]: the
//! caller's TrueType/OpenType faces, or DejaVu Sans bundled into the
//! crate (see `fonts/LICENSE`).

use std::sync::Arc;

use maposter_core::{FontWeight, HAlign, VAlign};

use crate::ExportError;

/// Cap height of Helvetica, in em.
pub const CAP_HEIGHT_EM: f64 = 0.718;

/// Descender depth of Helvetica, in em.
pub const DESCENT_EM: f64 = 0.207;

const BUNDLED_REGULAR: &[u8] = include_bytes!("../fonts/DejaVuSans.ttf");
const BUNDLED_BOLD: &[u8] = include_bytes!("../fonts/DejaVuSans-Bold.ttf");

/// Advance used for characters missing from the width tables.
const FALLBACK_WIDTH: u16 = 556;

/// Helvetica advance widths for U+0020..=U+007E, in 1/1000 em.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths for U+0020..=U+007E, in 1/1000 em.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// A base-14 PDF font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuiltinFont {
    /// `Helvetica`.
    Helvetica,
    /// `Helvetica-Bold`.
    HelveticaBold,
}

impl BuiltinFont {
    /// The face used for `weight`.
    #[must_use]
    pub const fn for_weight(weight: FontWeight) -> Self {
        match weight {
            FontWeight::Regular => Self::Helvetica,
            FontWeight::Bold => Self::HelveticaBold,
        }
    }

    /// PostScript name.
    #[must_use]
    pub const fn base_font(self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Resource name on the page.
    #[must_use]
    pub const fn resource_name(self) -> &'static str {
        match self {
            Self::Helvetica => "F1",
            Self::HelveticaBold => "F2",
        }
    }

    fn advance(self, ch: char) -> u16 {
        let table = match self {
            Self::Helvetica => &HELVETICA,
            Self::HelveticaBold => &HELVETICA_BOLD,
        };
        let ch = base_letter(ch);
        match ch {
            ' '..='~' => table[ch as usize - 0x20],
            '\u{b0}' => 400,
            '\u{a9}' => 737,
            '\u{c6}' => 1000,
            '\u{e6}' => 889,
            '\u{df}' => 611,
            _ => FALLBACK_WIDTH,
        }
    }

    /// Advance width of `text` at `size_pt`, in points.
    #[must_use]
    pub fn width_pt(self, text: &str, size_pt: f64) -> f64 {
        let units: u32 = text.chars().map(|ch| u32::from(self.advance(ch))).sum();
        f64::from(units) * size_pt / 1000.0
    }
}

/// Map accented Latin-1 letters to their unaccented base letter, which
/// has the same advance in Helvetica.
const fn base_letter(ch: char) -> char {
    match ch {
        '\u{c0}'..='\u{c5}' => 'A',
        '\u{c7}' => 'C',
        '\u{c8}'..='\u{cb}' => 'E',
        '\u{cc}'..='\u{cf}' => 'I',
        '\u{d1}' => 'N',
        '\u{d2}'..='\u{d6}' | '\u{d8}' => 'O',
        '\u{d9}'..='\u{dc}' => 'U',
        '\u{dd}' => 'Y',
        '\u{e0}'..='\u{e5}' => 'a',
        '\u{e7}' => 'c',
        '\u{e8}'..='\u{eb}' => 'e',
        '\u{ec}'..='\u{ef}' => 'i',
        '\u{f1}' => 'n',
        '\u{f2}'..='\u{f6}' | '\u{f8}' => 'o',
        '\u{f9}'..='\u{fc}' => 'u',
        '\u{fd}' | '\u{ff}' => 'y',
        other => other,
    }
}

/// Encode `text` for a WinAnsiEncoding font. Characters outside the
/// Latin-1 printable ranges become `?`.
#[must_use]
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match u8::try_from(u32::from(ch)) {
            Ok(byte @ (0x20..=0x7E | 0xA0..=0xFF)) => byte,
            _ => b'?',
        })
        .collect()
}

/// Horizontal offset from the anchor to the start of the text.
#[must_use]
pub fn start_offset(h_align: HAlign, width: f64) -> f64 {
    match h_align {
        HAlign::Left => 0.0,
        HAlign::Center => -width / 2.0,
        HAlign::Right => -width,
    }
}

/// Vertical offset from the anchor to the baseline, `y` upward.
#[must_use]
pub fn baseline_offset(v_align: VAlign, size_pt: f64) -> f64 {
    match v_align {
        VAlign::Bottom => DESCENT_EM * size_pt,
        VAlign::Center => -CAP_HEIGHT_EM / 2.0 * size_pt,
        VAlign::Top => -CAP_HEIGHT_EM * size_pt,
    }
}

/// TrueType/OpenType faces used to draw raster captions.
///
/// Without caller faces both weights use the bundled DejaVu Sans. A
/// caller regular face without a bold one serves both weights.
#[derive(Debug, Clone, Default)]
pub struct FontSet {
    regular: Option<Arc<Vec<u8>>>,
    bold: Option<Arc<Vec<u8>>>,
}

impl FontSet {
    /// The bundled DejaVu Sans faces.
    #[must_use]
    pub fn bundled() -> Self {
        Self::default()
    }

    /// Build a set from raw font files.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidFont`] if either face cannot be
    /// parsed.
    pub fn from_bytes(regular: Vec<u8>, bold: Option<Vec<u8>>) -> Result<Self, ExportError> {
        validate(&regular, "regular")?;
        if let Some(bold) = &bold {
            validate(bold, "bold")?;
        }
        Ok(Self {
            regular: Some(Arc::new(regular)),
            bold: bold.map(Arc::new),
        })
    }

    /// Returns `true` if the set uses the bundled faces.
    #[must_use]
    pub const fn is_bundled(&self) -> bool {
        self.regular.is_none()
    }

    /// Parsed face for `weight`. `None` only if the face fails to parse.
    #[must_use]
    pub fn face(&self, weight: FontWeight) -> Option<ttf_parser::Face<'_>> {
        let regular = self.regular.as_deref().map(Vec::as_slice);
        let bold = self.bold.as_deref().map(Vec::as_slice);
        let data = match (weight, regular, bold) {
            (FontWeight::Bold, _, Some(bold)) => bold,
            (_, Some(regular), _) => regular,
            (FontWeight::Bold, None, None) => BUNDLED_BOLD,
            (FontWeight::Regular, None, _) => BUNDLED_REGULAR,
        };
        ttf_parser::Face::parse(data, 0).ok()
    }
}

fn validate(data: &[u8], which: &str) -> Result<(), ExportError> {
    ttf_parser::Face::parse(data, 0)
        .map(|_| ())
        .map_err(|err| ExportError::InvalidFont(format!("{which} face: {err}")))
}
