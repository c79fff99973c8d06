//! Integration test: compose a Paris poster from canned data with empty
//! water and park layers, then fit it to paper.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use maposter_core::{
    FeatureCollection, GeoLayer, GeocodeError, GeodataError, GeodataProvider, Geocoder,
    HighwayTag, InMemoryThemeStore, LatLon, Layer, PipelineEvent, PosterRequest, Primitive,
    StreetEdge, StreetGraph, ThemeOverrides, apply_to_canvas, create_poster, resolve_dimensions,
};

const PARIS: LatLon = LatLon::new(48.8566, 2.3522);

struct ParisGeocoder;

impl Geocoder for ParisGeocoder {
    fn locate(&self, city: &str, country: &str) -> Result<LatLon, GeocodeError> {
        if city == "Paris" && country == "France" {
            Ok(PARIS)
        } else {
            Err(GeocodeError::NotFound {
                query: format!("{city}, {country}"),
            })
        }
    }
}

/// A small grid of streets around the center, no water, no parks.
struct GridProvider;

impl GeodataProvider for GridProvider {
    fn street_graph(&self, center: LatLon, _radius_m: u32) -> Result<StreetGraph, GeodataError> {
        let mut graph = StreetGraph::new();
        let tags = ["motorway", "primary", "secondary", "tertiary", "residential", "service"];
        let mut previous = graph.add_node(center);
        for (i, tag) in tags.iter().enumerate() {
            let offset = 0.002 * f64::from(u32::try_from(i + 1).unwrap());
            let next = graph.add_node(LatLon::new(center.lat + offset, center.lon - offset));
            graph.add_edge(previous, next, StreetEdge {
                highway: HighwayTag::new(*tag),
                geometry: None,
            });
            previous = next;
        }
        Ok(graph)
    }

    fn water_features(
        &self,
        _center: LatLon,
        _radius_m: u32,
    ) -> Result<FeatureCollection, GeodataError> {
        Ok(FeatureCollection::default())
    }

    fn park_features(
        &self,
        _center: LatLon,
        _radius_m: u32,
    ) -> Result<FeatureCollection, GeodataError> {
        Ok(FeatureCollection::default())
    }
}

#[test]
fn paris_with_empty_optional_layers() {
    let mut events = Vec::new();
    let poster = create_poster(
        &PosterRequest::new("Paris", "France"),
        &ParisGeocoder,
        &GridProvider,
        &InMemoryThemeStore::new(),
        &mut events,
    )
    .expect("poster should compose");

    let canvas = &poster.canvas;
    assert_eq!(canvas.background(), poster.theme.background);
    assert_eq!(canvas.ops_in(Layer::Water).count(), 0);
    assert_eq!(canvas.ops_in(Layer::Parks).count(), 0);
    assert_eq!(canvas.ops_in(Layer::Roads).count(), 6);
    assert_eq!(canvas.ops_in(Layer::Fades).count(), 2);

    let texts: Vec<String> = canvas
        .ops_in(Layer::Captions)
        .filter_map(|op| match &op.primitive {
            Primitive::Text(t) => Some(t.text.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec![
        "P  A  R  I  S".to_owned(),
        "FRANCE".to_owned(),
        "48.86\u{b0}N / 2.35\u{b0}E".to_owned(),
        "\u{a9} OpenStreetMap".to_owned(),
    ]);

    // Paint order never goes back down.
    let z: Vec<u8> = canvas.ops().iter().map(|op| op.layer.z()).collect();
    assert!(z.windows(2).all(|w| w[0] <= w[1]));

    assert!(events.contains(&PipelineEvent::LayerFetched {
        layer: GeoLayer::WaterFeatures,
        count: 0,
    }));
}

#[test]
fn fitting_to_paper_keeps_operations() {
    let mut store = InMemoryThemeStore::new();
    store.insert(
        "noir",
        ThemeOverrides::from_pairs([
            ("name", "Noir"),
            ("background", "#000000"),
            ("text", "#FFFFFF"),
        ]),
    );
    let request = PosterRequest {
        theme_id: "noir".to_owned(),
        aspect_ratio: Some(297.0 / 210.0),
        ..PosterRequest::new("Paris", "France")
    };
    let mut poster = create_poster(
        &request,
        &ParisGeocoder,
        &GridProvider,
        &store,
        &mut maposter_core::NoopObserver,
    )
    .unwrap();
    assert_eq!(poster.theme.name, "Noir");

    let before = poster.canvas.len();
    let (w, h) = resolve_dimensions("A4", "landscape", 3.0, true);
    apply_to_canvas(&mut poster.canvas, w, h);
    assert_eq!(poster.canvas.len(), before);
    assert!((poster.canvas.size().width_in - 303.0 / 25.4).abs() < 1e-12);
    assert!((poster.canvas.size().height_in - 216.0 / 25.4).abs() < 1e-12);
}

#[test]
fn unknown_city_fails_before_fetching() {
    let err = create_poster(
        &PosterRequest::new("Atlantis", "Ocean"),
        &ParisGeocoder,
        &GridProvider,
        &InMemoryThemeStore::new(),
        &mut maposter_core::NoopObserver,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "could not find coordinates for Atlantis, Ocean");
}
