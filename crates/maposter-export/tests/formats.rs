//! Integration test: serialize one composed poster to every format.

#![allow(clippy::unwrap_used, clippy::panic)]

use maposter_core::caption::{CaptionText, add_captions};
use maposter_core::{
    CanvasSize, HighwayTag, LatLon, MapData, Orientation, PaperSize, PaperSpec, StreetEdge,
    StreetGraph, Theme, compose_layers,
};
use maposter_export::{PageOptions, PosterArtifact, RasterOptions, to_pdf, to_png, to_svg};

const PARIS: LatLon = LatLon::new(48.8566, 2.3522);

fn poster(size: CanvasSize) -> maposter_core::Canvas {
    let mut streets = StreetGraph::new();
    let a = streets.add_node(LatLon::new(PARIS.lat - 0.01, PARIS.lon - 0.01));
    let b = streets.add_node(LatLon::new(PARIS.lat + 0.01, PARIS.lon + 0.01));
    streets.add_edge(a, b, StreetEdge {
        highway: HighwayTag::new("primary"),
        geometry: None,
    });
    let theme = Theme::default();
    let data = MapData {
        streets,
        water: None,
        parks: None,
    };
    let mut canvas = compose_layers(&theme, PARIS, 2000.0, &data, size);
    add_captions(
        &mut canvas,
        &CaptionText {
            city: "Paris".to_owned(),
            country: "France".to_owned(),
            location: PARIS,
        },
        &theme,
    );
    canvas
}

#[test]
fn png_matches_canvas_size_and_background() {
    let artifact = to_png(&poster(CanvasSize::preview(None)), &RasterOptions {
        dpi: 20,
        ..RasterOptions::default()
    })
    .unwrap();
    let PosterArtifact::Raster {
        bytes,
        width_px,
        height_px,
        dpi,
    } = artifact
    else {
        panic!("expected a raster");
    };
    assert_eq!((width_px, height_px, dpi), (240, 320, 20));

    let image = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (240, 320));
    // Middle of the left edge is outside both fades and the road.
    let bg = Theme::default().background;
    let pixel = image.get_pixel(0, 160);
    assert_eq!(pixel.0, [bg.r, bg.g, bg.b]);
}

#[test]
fn pdf_page_for_a3_landscape() {
    let paper = PaperSpec {
        size: PaperSize::A3,
        orientation: Orientation::Landscape,
        ..PaperSpec::default()
    };
    let canvas = poster(CanvasSize::preview(Some(paper.aspect_ratio())));
    let artifact = to_pdf(canvas, &PageOptions {
        paper,
        title: Some("Paris".to_owned()),
    })
    .unwrap();
    assert_eq!(artifact.extension(), "pdf");
    assert!(artifact.as_bytes().starts_with(b"%PDF-1.4"));
    let PosterArtifact::Page {
        width_mm,
        height_mm,
        print_ready,
        ..
    } = artifact
    else {
        panic!("expected a page");
    };
    assert!((width_mm - 420.0).abs() < 1e-9);
    assert!((height_mm - 297.0).abs() < 1e-9);
    assert!(!print_ready);
}

#[test]
fn svg_contains_every_layer_in_use() {
    let artifact = to_svg(&poster(CanvasSize::preview(None)));
    let PosterArtifact::Vector { svg } = artifact else {
        panic!("expected SVG");
    };
    assert!(svg.contains(r#"id="roads""#));
    assert!(svg.contains(r#"id="fades""#));
    assert!(svg.contains(r#"id="captions""#));
    assert!(!svg.contains(r#"id="water""#));
    assert!(svg.contains("P  A  R  I  S"));
}

#[test]
fn every_format_is_deterministic() {
    let canvas = poster(CanvasSize::preview(None));
    let options = RasterOptions {
        dpi: 10,
        ..RasterOptions::default()
    };
    assert_eq!(to_png(&canvas, &options).unwrap(), to_png(&canvas, &options).unwrap());
    assert_eq!(to_svg(&canvas), to_svg(&canvas));
    let page = PageOptions::default();
    assert_eq!(
        to_pdf(canvas.clone(), &page).unwrap(),
        to_pdf(canvas, &page).unwrap()
    );
}
