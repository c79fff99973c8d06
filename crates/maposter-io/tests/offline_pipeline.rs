//! Integration test: canned Nominatim and Overpass responses through the
//! whole pipeline, a theme directory on disk, and a saved PDF.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use maposter_core::{
    FeatureCollection, GeocodeError, GeodataError, GeodataProvider, Geocoder, LatLon, Layer,
    NoopObserver, PaperSpec, PosterRequest, create_poster,
};
use maposter_export::FontSet;
use maposter_io::nominatim::parse_search;
use maposter_io::overpass::{parse_features, parse_street_graph};
use maposter_io::{
    DirThemeStore, OutputFormat, RenderConfig, output_filename, render, save_artifact,
};

const NOMINATIM: &str = r#"[{"lat": "48.8566", "lon": "2.3522", "display_name": "Paris"}]"#;

const STREETS: &str = r#"{"elements": [
    {"type": "way", "id": 1, "nodes": [1, 2],
     "geometry": [{"lat": 48.85, "lon": 2.34}, {"lat": 48.86, "lon": 2.36}],
     "tags": {"highway": "primary"}},
    {"type": "way", "id": 2, "nodes": [2, 3],
     "geometry": [{"lat": 48.86, "lon": 2.36}, {"lat": 48.87, "lon": 2.35}],
     "tags": {"highway": "residential"}}
]}"#;

const WATER: &str = r#"{"elements": [
    {"type": "way", "id": 9,
     "geometry": [{"lat": 48.855, "lon": 2.35}, {"lat": 48.856, "lon": 2.355}],
     "tags": {"waterway": "river"}}
]}"#;

struct Canned;

impl Geocoder for Canned {
    fn locate(&self, city: &str, country: &str) -> Result<LatLon, GeocodeError> {
        parse_search(NOMINATIM, &format!("{city}, {country}"))
    }
}

impl GeodataProvider for Canned {
    fn street_graph(
        &self,
        _center: LatLon,
        _radius_m: u32,
    ) -> Result<maposter_core::StreetGraph, GeodataError> {
        parse_street_graph(STREETS)
    }

    fn water_features(
        &self,
        _center: LatLon,
        _radius_m: u32,
    ) -> Result<FeatureCollection, GeodataError> {
        parse_features(WATER)
    }

    fn park_features(
        &self,
        _center: LatLon,
        _radius_m: u32,
    ) -> Result<FeatureCollection, GeodataError> {
        parse_features(r#"{"elements": [], "remark": "runtime error: timeout"}"#)
    }
}

#[test]
fn canned_responses_render_to_a_saved_pdf() {
    let themes = tempfile::tempdir().unwrap();
    std::fs::write(
        themes.path().join("noir.json"),
        r##"{"name": "Noir", "bg": "#000000", "text": "#FFFFFF"}"##,
    )
    .unwrap();

    let config = RenderConfig {
        format: OutputFormat::Pdf,
        paper: PaperSpec {
            print_ready: true,
            ..PaperSpec::default()
        },
        output_dir: themes.path().join("out"),
        ..RenderConfig::default()
    };
    let request = PosterRequest {
        theme_id: "noir".to_owned(),
        radius_m: 2000,
        aspect_ratio: config.aspect_ratio(),
        ..PosterRequest::new("Paris", "France")
    };

    let poster = create_poster(
        &request,
        &Canned,
        &Canned,
        &DirThemeStore::new(themes.path()),
        &mut NoopObserver,
    )
    .expect("poster should compose");
    assert_eq!(poster.theme.name, "Noir");
    assert_eq!(poster.canvas.ops_in(Layer::Roads).count(), 2);
    assert_eq!(poster.canvas.ops_in(Layer::Water).count(), 1);
    assert_eq!(poster.canvas.ops_in(Layer::Parks).count(), 0);

    let artifact = render(&poster, &config, &FontSet::bundled()).unwrap();
    let stamp = chrono::NaiveDate::from_ymd_opt(2026, 5, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let name = output_filename(&request.city, &request.theme_id, &config, stamp);
    assert_eq!(name, "paris_noir_A4_port_printready.pdf");

    let path = save_artifact(&config.output_dir, &name, &artifact).unwrap();
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}
