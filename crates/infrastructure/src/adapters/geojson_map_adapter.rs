//! GeoJSON map adapter - Implements MapPort as an in-memory scene
//!
//! Layers are kept in insertion order and can be exported as a GeoJSON
//! `FeatureCollection` using simplestyle property names, so the scene can
//! be opened in any GeoJSON viewer.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use application::ports::{
    LayerId, ListenerId, MapError, MapLayer, MapPort, MapView, TileLayer,
};
use domain::value_objects::GeoLocation;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value, feature::Id};
use serde_json::json;
use tracing::{debug, instrument};

/// Fill opacity of circle layers
const CIRCLE_FILL_OPACITY: f64 = 0.2;

/// Map renderer that records layers and exports them as GeoJSON
#[derive(Debug, Default)]
pub struct GeoJsonMapAdapter {
    containers: HashSet<String>,
    created: Option<(String, MapView)>,
    layers: BTreeMap<LayerId, MapLayer>,
    next_layer: u64,
    listeners: BTreeSet<u64>,
    next_listener: u64,
    size_invalidations: usize,
}

impl GeoJsonMapAdapter {
    /// Create a renderer that can host a map on the given containers
    #[must_use]
    pub fn new<I, S>(containers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            containers: containers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Whether a map instance currently exists
    #[must_use]
    pub const fn is_created(&self) -> bool {
        self.created.is_some()
    }

    /// Camera position the map was created with
    #[must_use]
    pub fn view(&self) -> Option<MapView> {
        self.created.as_ref().map(|(_, view)| *view)
    }

    /// Layers currently on the map, in insertion order
    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &MapLayer)> {
        self.layers.iter().map(|(id, layer)| (*id, layer))
    }

    /// A single layer by handle
    #[must_use]
    pub fn layer(&self, id: LayerId) -> Option<&MapLayer> {
        self.layers.get(&id)
    }

    /// Number of layers of the given kind
    #[must_use]
    pub fn count_kind(&self, kind: &str) -> usize {
        self.layers.values().filter(|l| l.kind() == kind).count()
    }

    /// Number of registered resize listeners
    #[must_use]
    pub fn resize_listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// How often the map size was recomputed
    #[must_use]
    pub const fn size_invalidations(&self) -> usize {
        self.size_invalidations
    }

    /// Export the drawable layers as a feature collection
    ///
    /// The tile layer and camera are written as foreign members `tiles` and
    /// `view` since they have no geometry.
    #[must_use]
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self
            .layers
            .iter()
            .filter_map(|(id, layer)| layer_feature(*id, layer))
            .collect();

        let mut foreign = JsonObject::new();
        if let Some((container, view)) = &self.created {
            foreign.insert(
                "view".to_string(),
                json!({
                    "container": container,
                    "center": position(&view.center),
                    "zoom": view.zoom,
                }),
            );
        }
        if let Some(tiles) = self.layers.values().find_map(|l| match l {
            MapLayer::Tile(tiles) => Some(tiles),
            _ => None,
        }) {
            foreign.insert("tiles".to_string(), tile_json(tiles));
        }

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: (!foreign.is_empty()).then_some(foreign),
        }
    }

    /// Export the scene as pretty-printed GeoJSON text
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_geojson_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_feature_collection())
    }
}

fn position(location: &GeoLocation) -> Vec<f64> {
    location.to_lon_lat().to_vec()
}

fn tile_json(tiles: &TileLayer) -> serde_json::Value {
    json!({
        "url_template": tiles.url_template,
        "attribution": tiles.attribution,
        "max_zoom": tiles.max_zoom,
    })
}

fn layer_feature(id: LayerId, layer: &MapLayer) -> Option<Feature> {
    let mut properties = JsonObject::new();
    properties.insert("kind".to_string(), json!(layer.kind()));

    let geometry = match layer {
        MapLayer::Tile(_) => return None,
        MapLayer::Marker {
            position: at,
            color,
            popup,
        } => {
            properties.insert("marker-color".to_string(), json!(color.hex()));
            properties.insert("color".to_string(), json!(color));
            properties.insert("title".to_string(), json!(popup));
            Value::Point(position(at))
        },
        MapLayer::Polyline {
            points,
            color,
            weight,
            dash_array,
        } => {
            properties.insert("stroke".to_string(), json!(color));
            properties.insert("stroke-width".to_string(), json!(weight));
            if let Some(dash) = dash_array {
                properties.insert("dash-array".to_string(), json!(dash));
            }
            Value::LineString(points.iter().map(position).collect())
        },
        MapLayer::Circle {
            center,
            radius_meters,
            color,
        } => {
            properties.insert("radius_meters".to_string(), json!(radius_meters));
            properties.insert("stroke".to_string(), json!(color));
            properties.insert("fill".to_string(), json!(color));
            properties.insert("fill-opacity".to_string(), json!(CIRCLE_FILL_OPACITY));
            Value::Point(position(center))
        },
    };

    Some(Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: Some(Id::String(id.to_string())),
        properties: Some(properties),
        foreign_members: None,
    })
}

impl MapPort for GeoJsonMapAdapter {
    fn container_exists(&self, container_id: &str) -> bool {
        self.containers.contains(container_id)
    }

    #[instrument(skip(self))]
    fn create_map(&mut self, container_id: &str, view: MapView) -> Result<(), MapError> {
        if !self.container_exists(container_id) {
            return Err(MapError::ContainerMissing(container_id.to_string()));
        }
        if let Some((existing, _)) = &self.created {
            return Err(MapError::AlreadyCreated(existing.clone()));
        }
        self.created = Some((container_id.to_string(), view));
        debug!(container = container_id, "Map created");
        Ok(())
    }

    fn add_layer(&mut self, layer: MapLayer) -> Result<LayerId, MapError> {
        if self.created.is_none() {
            return Err(MapError::NotCreated);
        }
        self.next_layer += 1;
        let id = LayerId::new(self.next_layer);
        debug!(%id, kind = layer.kind(), "Layer added");
        self.layers.insert(id, layer);
        Ok(id)
    }

    fn remove_layer(&mut self, id: LayerId) {
        if self.layers.remove(&id).is_some() {
            debug!(%id, "Layer removed");
        }
    }

    fn invalidate_size(&mut self) {
        self.size_invalidations += 1;
    }

    fn add_resize_listener(&mut self) -> ListenerId {
        self.next_listener += 1;
        self.listeners.insert(self.next_listener);
        ListenerId::new(self.next_listener)
    }

    fn remove_resize_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id.get());
    }

    #[instrument(skip(self))]
    fn destroy_map(&mut self) {
        if let Some((container, _)) = self.created.take() {
            self.layers.clear();
            self.listeners.clear();
            debug!(container = %container, "Map destroyed");
        }
    }
}
