//! SVG export serializer.
//!
//! Writes the canvas at its current size using the [`svg`] crate for
//! document construction, XML escaping, and path data formatting. The
//! `viewBox` is in points with `y` downward, so page coordinates are
//! flipped once on the way out.
//!
//! Captions are emitted as `<text>` elements and rendered with whatever
//! sans-serif face the viewer has; they are positioned with the same
//! Helvetica metrics as the PDF output.

use geo::{Coord, LineString};
use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Element, Group, Path, Rectangle, Title};
use svg::node::{Node, Text};

use maposter_core::{
    Canvas, FontWeight, GradientFade, HAlign, Layer, Primitive, RuleItem, TextItem,
};

use crate::PosterArtifact;
use crate::frame::PageFrame;
use crate::text::baseline_offset;

const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";

/// Serialize `canvas` as an SVG document.
#[must_use]
pub fn to_svg(canvas: &Canvas) -> PosterArtifact {
    let frame = PageFrame::for_canvas(canvas, 0.0, 0.0);
    let flip = |p: Coord<f64>| Coord {
        x: p.x,
        y: frame.height - p.y,
    };

    let mut doc = Document::new()
        .set("width", format!("{}pt", frame.width))
        .set("height", format!("{}pt", frame.height))
        .set("viewBox", (0, 0, frame.width, frame.height));
    doc = doc.add(Title::new("maposter"));
    doc = doc.add(
        Rectangle::new()
            .set("width", frame.width)
            .set("height", frame.height)
            .set("fill", canvas.background().to_string()),
    );

    for layer in [
        Layer::Water,
        Layer::Parks,
        Layer::Roads,
        Layer::Fades,
        Layer::Captions,
    ] {
        let mut group = Group::new().set("id", layer_id(layer));
        let mut any = false;
        for op in canvas.ops_in(layer) {
            any = true;
            match &op.primitive {
                Primitive::Area { polygon, color } => {
                    let mut data = Data::new();
                    for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
                        data = ring_data(data, ring, |c| flip(frame.map(canvas, c)));
                    }
                    group.append(
                        Path::new()
                            .set("d", data)
                            .set("fill", color.to_string())
                            .set("fill-rule", "evenodd"),
                    );
                }
                Primitive::Line {
                    line,
                    color,
                    width_pt,
                } => {
                    if line.0.len() < 2 {
                        continue;
                    }
                    let data = line_data(line, |c| flip(frame.map(canvas, c)));
                    group.append(
                        Path::new()
                            .set("d", data)
                            .set("fill", "none")
                            .set("stroke", color.to_string())
                            .set("stroke-width", *width_pt)
                            .set("stroke-linecap", "round")
                            .set("stroke-linejoin", "round"),
                    );
                }
                Primitive::Fade(fade) => fade_rects(&mut group, canvas, &frame, fade),
                Primitive::Text(item) => group.append(text_element(canvas, &frame, item)),
                Primitive::Rule(rule) => group.append(rule_element(canvas, &frame, rule)),
            }
        }
        if any {
            doc = doc.add(group);
        }
    }

    // The svg crate omits the XML declaration, so we prepend it.
    PosterArtifact::Vector {
        svg: format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n"),
    }
}

const fn layer_id(layer: Layer) -> &'static str {
    match layer {
        Layer::Water => "water",
        Layer::Parks => "parks",
        Layer::Roads => "roads",
        Layer::Fades => "fades",
        Layer::Captions => "captions",
    }
}

fn line_data(line: &LineString<f64>, to_svg: impl Fn(Coord<f64>) -> Coord<f64>) -> Data {
    let mut points = line.coords().map(|c| to_svg(*c));
    let mut data = Data::new();
    if let Some(first) = points.next() {
        data = data.move_to((first.x, first.y));
        for p in points {
            data = data.line_to((p.x, p.y));
        }
    }
    data
}

fn ring_data(
    mut data: Data,
    ring: &LineString<f64>,
    to_svg: impl Fn(Coord<f64>) -> Coord<f64>,
) -> Data {
    let mut points = ring.coords().map(|c| to_svg(*c));
    if let Some(first) = points.next() {
        data = data.move_to((first.x, first.y));
        for p in points {
            data = data.line_to((p.x, p.y));
        }
        data = data.close();
    }
    data
}

fn fade_rects(group: &mut Group, canvas: &Canvas, frame: &PageFrame, fade: &GradientFade) {
    for band in fade.bands() {
        let (low, high) = frame.band(canvas, band.y_min, band.y_max);
        group.append(
            Rectangle::new()
                .set("x", low.x)
                .set("y", frame.height - high.y)
                .set("width", high.x - low.x)
                .set("height", high.y - low.y)
                .set("fill", fade.color.to_string())
                .set("fill-opacity", band.alpha),
        );
    }
}

fn text_element(canvas: &Canvas, frame: &PageFrame, item: &TextItem) -> Element {
    let anchor = frame.normalized(canvas, item.anchor);
    let baseline = anchor.y + baseline_offset(item.v_align, item.size_pt);
    let text_anchor = match item.h_align {
        HAlign::Left => "start",
        HAlign::Center => "middle",
        HAlign::Right => "end",
    };
    let weight = match item.weight {
        FontWeight::Regular => "normal",
        FontWeight::Bold => "bold",
    };

    let mut element = Element::new("text");
    element.assign("x", anchor.x);
    element.assign("y", frame.height - baseline);
    element.assign("font-family", FONT_FAMILY);
    element.assign("font-size", item.size_pt);
    element.assign("font-weight", weight);
    element.assign("text-anchor", text_anchor);
    element.assign("fill", item.color.to_string());
    if item.opacity < 1.0 {
        element.assign("fill-opacity", item.opacity);
    }
    element.append(Text::new(item.text.as_str()));
    element
}

fn rule_element(canvas: &Canvas, frame: &PageFrame, rule: &RuleItem) -> Element {
    let from = frame.normalized(canvas, rule.from);
    let to = frame.normalized(canvas, rule.to);
    let mut element = Element::new("line");
    element.assign("x1", from.x);
    element.assign("y1", frame.height - from.y);
    element.assign("x2", to.x);
    element.assign("y2", frame.height - to.y);
    element.assign("stroke", rule.color.to_string());
    element.assign("stroke-width", rule.width_pt);
    element
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use geo::{line_string, polygon};
    use maposter_core::{CanvasSize, Color, MapView, VAlign};

    use super::*;

    fn svg_of(canvas: &Canvas) -> String {
        let PosterArtifact::Vector { svg } = to_svg(canvas) else {
            panic!("expected SVG");
        };
        svg
    }

    fn small_canvas() -> Canvas {
        Canvas::new(
            CanvasSize {
                width_in: 1.0,
                height_in: 2.0,
            },
            Color::rgb(0xF5, 0xED, 0xE4),
            MapView { radius_m: 100.0 },
        )
    }

    #[test]
    fn empty_canvas_is_background_only() {
        let svg = svg_of(&small_canvas());
        assert!(svg.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(svg.contains(r#"viewBox="0 0 72 144""#));
        assert!(svg.contains(r##"fill="#F5EDE4""##));
        assert!(!svg.contains("<path"));
        assert!(!svg.contains("<g"));
    }

    #[test]
    fn layers_are_grouped_in_z_order() {
        let mut canvas = small_canvas();
        canvas.push(
            Layer::Roads,
            Primitive::Line {
                line: line_string![(x: -50.0, y: 0.0), (x: 50.0, y: 0.0)],
                color: Color::BLACK,
                width_pt: 0.8,
            },
        );
        canvas.push(
            Layer::Water,
            Primitive::Area {
                polygon: polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0)],
                color: Color::rgb(0, 0, 255),
            },
        );
        let svg = svg_of(&canvas);
        let water = svg.find(r#"id="water""#).unwrap();
        let roads = svg.find(r#"id="roads""#).unwrap();
        assert!(water < roads);
        assert!(svg.contains(r#"fill-rule="evenodd""#));
        assert!(svg.contains(r#"stroke-linecap="round""#));
        assert!(svg.contains(r#"d="M"#));
        assert!(svg.contains(" z"), "closed water ring: {svg}");
    }

    #[test]
    fn captions_become_text_elements() {
        let mut canvas = small_canvas();
        canvas.push(
            Layer::Captions,
            Primitive::Text(TextItem {
                text: "P  A  R  I  S & co".to_owned(),
                anchor: Coord { x: 0.5, y: 0.5 },
                h_align: HAlign::Center,
                v_align: VAlign::Center,
                size_pt: 12.0,
                weight: FontWeight::Bold,
                color: Color::BLACK,
                opacity: 1.0,
            }),
        );
        let svg = svg_of(&canvas);
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(svg.contains(r#"font-weight="bold""#));
        assert!(svg.contains("&amp; co"));
        assert!(!svg.contains("fill-opacity"));
    }
}
