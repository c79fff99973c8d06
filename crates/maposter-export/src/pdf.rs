//! Single-page PDF serializer.
//!
//! The canvas is resized to the exact paper dimensions (bleed included
//! for print-ready output) and written as vector paths with `lopdf`.
//! Captions use the base-14 Helvetica faces, so no font is embedded.
//!
//! Print-ready pages are laid out on a larger sheet:
//!
//! - `MediaBox`: bleed area plus a slug on every side, holding the crop
//!   marks.
//! - `BleedBox`: the artwork, exactly the resolved paper size with bleed.
//! - `TrimBox`: the nominal paper size.
//!
//! Output is deterministic: no timestamps or random document ids.

use std::collections::BTreeMap;

use geo::{Coord, LineString};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, StringFormat, dictionary};
use maposter_core::crop_marks::{MARK_COLOR, MARK_WIDTH_PT, SLUG_MM};
use maposter_core::{
    Canvas, Color, GradientFade, MM_PER_INCH, POINTS_PER_INCH, PaperSpec, Primitive, RuleItem,
    TextItem, apply_to_canvas, crop_marks,
};

use crate::frame::PageFrame;
use crate::text::{BuiltinFont, baseline_offset, encode_win_ansi, start_offset};
use crate::{ExportError, PosterArtifact};

/// Page settings.
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    /// Paper size, orientation and bleed.
    pub paper: PaperSpec,
    /// Document title stored in the info dictionary.
    pub title: Option<String>,
}

fn mm_to_pt(mm: f64) -> f64 {
    mm / MM_PER_INCH * POINTS_PER_INCH
}

#[allow(clippy::cast_possible_truncation)]
fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn rect_array(x0: f64, y0: f64, x1: f64, y1: f64) -> Object {
    Object::Array(vec![real(x0), real(y0), real(x1), real(y1)])
}

/// Write `canvas` as a one-page PDF sized to `options.paper`.
///
/// The canvas is consumed: it is resized to the page before drawing.
///
/// # Errors
///
/// Returns [`ExportError::Pdf`] if content encoding or document
/// serialization fails.
pub fn to_pdf(mut canvas: Canvas, options: &PageOptions) -> Result<PosterArtifact, ExportError> {
    let paper = options.paper;
    let (width_mm, height_mm) = paper.dimensions_mm();
    apply_to_canvas(&mut canvas, width_mm, height_mm);

    let mut writer = PageWriter::default();
    let (media, frame) = if paper.print_ready {
        let (trim_w, trim_h) = paper.trim_mm();
        let marks = crop_marks(trim_w, trim_h, paper.bleed_mm);
        let slug = mm_to_pt(SLUG_MM);
        let frame = PageFrame::for_canvas(&canvas, slug, slug);

        writer.op("q", vec![]);
        writer.op(
            "re",
            vec![real(slug), real(slug), real(frame.width), real(frame.height)],
        );
        writer.op("W", vec![]);
        writer.op("n", vec![]);
        writer.draw_canvas(&canvas, &frame);
        writer.op("Q", vec![]);
        writer.stroke_setup(MARK_COLOR, MARK_WIDTH_PT, 0);
        for mark in &marks.marks {
            writer.op("m", vec![real(mm_to_pt(mark.from.x)), real(mm_to_pt(mark.from.y))]);
            writer.op("l", vec![real(mm_to_pt(mark.to.x)), real(mm_to_pt(mark.to.y))]);
            writer.op("S", vec![]);
        }
        (
            (mm_to_pt(marks.sheet_mm.0), mm_to_pt(marks.sheet_mm.1)),
            frame,
        )
    } else {
        let frame = PageFrame::for_canvas(&canvas, 0.0, 0.0);
        writer.draw_canvas(&canvas, &frame);
        ((frame.width, frame.height), frame)
    };

    let bytes = writer.finish(media, &frame, options)?;
    log::debug!(
        "wrote PDF page {width_mm:.1}x{height_mm:.1} mm (print-ready: {})",
        paper.print_ready
    );
    Ok(PosterArtifact::Page {
        bytes,
        width_mm,
        height_mm,
        print_ready: paper.print_ready,
    })
}

#[derive(Default)]
struct PageWriter {
    ops: Vec<Operation>,
    /// Alpha in thousandths to graphics-state resource name.
    alpha_states: BTreeMap<u16, String>,
}

impl PageWriter {
    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.ops.push(Operation::new(operator, operands));
    }

    fn fill_color(&mut self, color: Color) {
        let [r, g, b] = color.to_unit_rgb();
        self.op("rg", vec![real(r), real(g), real(b)]);
    }

    fn stroke_setup(&mut self, color: Color, width_pt: f64, cap: i64) {
        let [r, g, b] = color.to_unit_rgb();
        self.op("RG", vec![real(r), real(g), real(b)]);
        self.op("w", vec![real(width_pt)]);
        self.op("J", vec![Object::Integer(cap)]);
        self.op("j", vec![Object::Integer(1)]);
    }

    /// Select a fill alpha, registering an `ExtGState` for it. Opaque
    /// content needs none.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn fill_alpha(&mut self, alpha: f64) {
        let key = (alpha.clamp(0.0, 1.0) * 1000.0).round() as u16;
        if key == 1000 {
            return;
        }
        let next = self.alpha_states.len();
        let name = self
            .alpha_states
            .entry(key)
            .or_insert_with(|| format!("GA{next}"))
            .clone();
        self.op("gs", vec![Object::Name(name.into_bytes())]);
    }

    fn path(&mut self, line: &LineString<f64>, to_page: impl Fn(Coord<f64>) -> Coord<f64>) {
        let mut points = line.coords().map(|c| to_page(*c));
        if let Some(first) = points.next() {
            self.op("m", vec![real(first.x), real(first.y)]);
            for p in points {
                self.op("l", vec![real(p.x), real(p.y)]);
            }
        }
    }

    fn draw_canvas(&mut self, canvas: &Canvas, frame: &PageFrame) {
        self.fill_color(canvas.background());
        self.op(
            "re",
            vec![
                real(frame.origin_x),
                real(frame.origin_y),
                real(frame.width),
                real(frame.height),
            ],
        );
        self.op("f", vec![]);

        for op in canvas.ops() {
            match &op.primitive {
                Primitive::Area { polygon, color } => {
                    self.fill_color(*color);
                    for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
                        self.path(ring, |c| frame.map(canvas, c));
                        self.op("h", vec![]);
                    }
                    self.op("f*", vec![]);
                }
                Primitive::Line {
                    line,
                    color,
                    width_pt,
                } => {
                    self.stroke_setup(*color, *width_pt, 1);
                    self.path(line, |c| frame.map(canvas, c));
                    self.op("S", vec![]);
                }
                Primitive::Fade(fade) => self.fade(canvas, frame, fade),
                Primitive::Text(text) => self.text(canvas, frame, text),
                Primitive::Rule(rule) => self.rule(canvas, frame, rule),
            }
        }
    }

    fn fade(&mut self, canvas: &Canvas, frame: &PageFrame, fade: &GradientFade) {
        for band in fade.bands() {
            let (low, high) = frame.band(canvas, band.y_min, band.y_max);
            self.op("q", vec![]);
            self.fill_alpha(band.alpha);
            self.fill_color(fade.color);
            self.op(
                "re",
                vec![real(low.x), real(low.y), real(high.x - low.x), real(high.y - low.y)],
            );
            self.op("f", vec![]);
            self.op("Q", vec![]);
        }
    }

    fn text(&mut self, canvas: &Canvas, frame: &PageFrame, item: &TextItem) {
        let font = BuiltinFont::for_weight(item.weight);
        let anchor = frame.normalized(canvas, item.anchor);
        let width = font.width_pt(&item.text, item.size_pt);
        let x = anchor.x + start_offset(item.h_align, width);
        let y = anchor.y + baseline_offset(item.v_align, item.size_pt);

        self.op("q", vec![]);
        self.fill_alpha(item.opacity);
        self.fill_color(item.color);
        self.op("BT", vec![]);
        self.op(
            "Tf",
            vec![
                Object::Name(font.resource_name().as_bytes().to_vec()),
                real(item.size_pt),
            ],
        );
        self.op("Td", vec![real(x), real(y)]);
        self.op(
            "Tj",
            vec![Object::String(encode_win_ansi(&item.text), StringFormat::Literal)],
        );
        self.op("ET", vec![]);
        self.op("Q", vec![]);
    }

    fn rule(&mut self, canvas: &Canvas, frame: &PageFrame, rule: &RuleItem) {
        let from = frame.normalized(canvas, rule.from);
        let to = frame.normalized(canvas, rule.to);
        self.stroke_setup(rule.color, rule.width_pt, 0);
        self.op("m", vec![real(from.x), real(from.y)]);
        self.op("l", vec![real(to.x), real(to.y)]);
        self.op("S", vec![]);
    }

    fn finish(
        self,
        media: (f64, f64),
        frame: &PageFrame,
        options: &PageOptions,
    ) -> Result<Vec<u8>, ExportError> {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for font in [BuiltinFont::Helvetica, BuiltinFont::HelveticaBold] {
            let id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource_name(), id);
        }

        let mut states = Dictionary::new();
        for (&key, name) in &self.alpha_states {
            let alpha = f64::from(key) / 1000.0;
            states.set(
                name.as_bytes().to_vec(),
                dictionary! {
                    "Type" => "ExtGState",
                    "ca" => real(alpha),
                    "CA" => real(alpha),
                },
            );
        }

        let content = Content {
            operations: self.ops,
        }
        .encode()
        .map_err(|err| ExportError::Pdf(err.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => rect_array(0.0, 0.0, media.0, media.1),
            "Resources" => dictionary! {
                "Font" => fonts,
                "ExtGState" => states,
            },
        };
        if options.paper.print_ready {
            let bleed = mm_to_pt(options.paper.bleed_mm.max(0.0));
            page.set(
                "BleedBox",
                rect_array(
                    frame.origin_x,
                    frame.origin_y,
                    frame.origin_x + frame.width,
                    frame.origin_y + frame.height,
                ),
            );
            page.set(
                "TrimBox",
                rect_array(
                    frame.origin_x + bleed,
                    frame.origin_y + bleed,
                    frame.origin_x + frame.width - bleed,
                    frame.origin_y + frame.height - bleed,
                ),
            );
        }
        let page_id = doc.add_object(page);

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut info = dictionary! {
            "Producer" => Object::string_literal("maposter"),
        };
        if let Some(title) = &options.title {
            info.set("Title", Object::string_literal(title.as_str()));
        }
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", info_id);

        doc.compress();
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|err| ExportError::Pdf(err.to_string()))?;
        Ok(bytes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use geo::line_string;
    use maposter_core::{
        CanvasSize, FontWeight, HAlign, Layer, MapView, Orientation, PaperSize, VAlign,
    };

    use super::*;

    fn canvas() -> Canvas {
        let mut canvas = Canvas::new(CanvasSize::default(), Color::WHITE, MapView {
            radius_m: 1000.0,
        });
        canvas.push(
            Layer::Roads,
            Primitive::Line {
                line: line_string![(x: -500.0, y: 0.0), (x: 500.0, y: 10.0)],
                color: Color::BLACK,
                width_pt: 1.2,
            },
        );
        canvas.push(
            Layer::Captions,
            Primitive::Text(TextItem {
                text: "\u{a9} OpenStreetMap".to_owned(),
                anchor: Coord { x: 0.98, y: 0.02 },
                h_align: HAlign::Right,
                v_align: VAlign::Bottom,
                size_pt: 6.0,
                weight: FontWeight::Regular,
                color: Color::BLACK,
                opacity: 0.5,
            }),
        );
        canvas
    }

    fn boxes(bytes: &[u8]) -> Dictionary {
        let doc = Document::load_mem(bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();
        doc.get_dictionary(page_id).unwrap().clone()
    }

    fn rect(dict: &Dictionary, key: &str) -> Vec<f64> {
        dict.get(key.as_bytes())
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|o| f64::from(o.as_float().unwrap()))
            .collect()
    }

    fn assert_rect_mm(actual: &[f64], expected_mm: [f64; 4]) {
        for (a, e) in actual.iter().zip(expected_mm) {
            assert!((a - mm_to_pt(e)).abs() < 0.01, "{actual:?} vs {expected_mm:?} mm");
        }
    }

    fn page(paper: PaperSpec) -> (Vec<u8>, f64, f64) {
        let artifact = to_pdf(canvas(), &PageOptions {
            paper,
            title: Some("Paris".to_owned()),
        })
        .unwrap();
        let PosterArtifact::Page {
            bytes,
            width_mm,
            height_mm,
            ..
        } = artifact
        else {
            panic!("expected a page");
        };
        (bytes, width_mm, height_mm)
    }

    #[test]
    fn plain_page_is_exact_paper_size() {
        let (bytes, w, h) = page(PaperSpec::default());
        assert!((w - 210.0).abs() < 1e-9 && (h - 297.0).abs() < 1e-9);
        let dict = boxes(&bytes);
        assert_rect_mm(&rect(&dict, "MediaBox"), [0.0, 0.0, 210.0, 297.0]);
        assert!(dict.get(b"TrimBox").is_err());
    }

    #[test]
    fn print_ready_page_has_bleed_trim_and_slug() {
        let paper = PaperSpec {
            print_ready: true,
            ..PaperSpec::default()
        };
        let (bytes, w, h) = page(paper);
        assert!((w - 216.0).abs() < 1e-9 && (h - 303.0).abs() < 1e-9);
        let dict = boxes(&bytes);
        assert_rect_mm(&rect(&dict, "MediaBox"), [0.0, 0.0, 236.0, 323.0]);
        assert_rect_mm(&rect(&dict, "BleedBox"), [10.0, 10.0, 226.0, 313.0]);
        assert_rect_mm(&rect(&dict, "TrimBox"), [13.0, 13.0, 223.0, 310.0]);
    }

    #[test]
    fn landscape_a3_dimensions() {
        let paper = PaperSpec {
            size: PaperSize::A3,
            orientation: Orientation::Landscape,
            ..PaperSpec::default()
        };
        let (bytes, _, _) = page(paper);
        assert_rect_mm(&rect(&boxes(&bytes), "MediaBox"), [0.0, 0.0, 420.0, 297.0]);
    }

    #[test]
    fn page_uses_builtin_fonts_and_alpha_states() {
        let (bytes, _, _) = page(PaperSpec::default());
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let names: Vec<&[u8]> = doc
            .objects
            .values()
            .filter_map(|o| o.as_dict().ok())
            .filter_map(|d| d.get(b"BaseFont").ok())
            .filter_map(|o| o.as_name().ok())
            .collect();
        assert!(names.contains(&b"Helvetica".as_slice()));
        assert!(names.contains(&b"Helvetica-Bold".as_slice()));

        let content = doc.get_page_content(page_id).unwrap();
        let text = String::from_utf8_lossy(&content);
        assert!(text.contains("/GA0 gs"));
        assert!(text.contains("Tj"));
    }

    #[test]
    fn print_ready_content_has_eight_marks() {
        let paper = PaperSpec {
            print_ready: true,
            ..PaperSpec::default()
        };
        let (bytes, _, _) = page(paper);
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        // One stroke per road, one per crop mark.
        let strokes = content.operations.iter().filter(|op| op.operator == "S").count();
        assert_eq!(strokes, 1 + 8);
        assert!(content.operations.iter().any(|op| op.operator == "W"));
    }

    #[test]
    fn export_is_deterministic() {
        let paper = PaperSpec {
            print_ready: true,
            ..PaperSpec::default()
        };
        assert_eq!(page(paper).0, page(paper).0);
    }
}
