//! Serde model of the JSON instance document.
//!
//! Field names follow the on-disk format:
//!
//! ```json
//! {
//!   "mapa": {
//!     "vertices": [{"id": "HUB", "tipo": "HUB", "x": 0, "y": 0}],
//!     "rutas": [{"p1": "HUB", "p2": "D1",
//!                "peso": {"distancia": 1, "riesgo": 0, "consumo": 1}}],
//!     "no_fly": [{"poligono": [{"x": 0, "y": 0}]}]
//!   }
//! }
//! ```

use geo::Coord;
use serde::{Deserialize, Serialize};
use skyroute_core::{EdgeWeight, Instance, InstanceBuilder, InstanceError, PointKind};

/// Top-level document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceDocument {
    /// The map section.
    pub mapa: MapDocument,
}

/// Waypoints, edges and zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    /// Waypoints.
    pub vertices: Vec<VertexDocument>,
    /// Undirected edges.
    #[serde(default)]
    pub rutas: Vec<EdgeDocument>,
    /// No-fly polygons.
    #[serde(default)]
    pub no_fly: Vec<ZoneDocument>,
}

/// Waypoint role tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexKind {
    /// The hub.
    #[serde(rename = "HUB")]
    Hub,
    /// A delivery point.
    #[serde(rename = "punto_entrega")]
    Delivery,
    /// A recharge point.
    #[serde(rename = "punto_recarga")]
    Recharge,
}

impl From<VertexKind> for PointKind {
    fn from(kind: VertexKind) -> Self {
        match kind {
            VertexKind::Hub => Self::Hub,
            VertexKind::Delivery => Self::Delivery,
            VertexKind::Recharge => Self::Recharge,
        }
    }
}

/// One waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexDocument {
    /// Identifier.
    pub id: String,
    /// Role.
    pub tipo: VertexKind,
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// One undirected edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDocument {
    /// First endpoint.
    pub p1: String,
    /// Second endpoint.
    pub p2: String,
    /// Edge cost.
    pub peso: WeightDocument,
}

/// Edge cost components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightDocument {
    /// Distance.
    pub distancia: f64,
    /// Risk.
    pub riesgo: f64,
    /// Battery consumption.
    pub consumo: f64,
}

/// One no-fly polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDocument {
    /// Vertices in boundary order.
    pub poligono: Vec<PositionDocument>,
}

/// A planar position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionDocument {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl InstanceDocument {
    /// Convert the document into a validated [`Instance`].
    ///
    /// # Errors
    /// Returns [`InstanceError`] when the document breaks an instance rule.
    pub fn into_instance(self) -> Result<Instance, InstanceError> {
        let MapDocument {
            vertices,
            rutas,
            no_fly,
        } = self.mapa;
        let mut builder = InstanceBuilder::new();
        for vertex in vertices {
            builder = builder.point(vertex.id, vertex.tipo.into(), vertex.x, vertex.y);
        }
        for edge in rutas {
            let WeightDocument {
                distancia,
                riesgo,
                consumo,
            } = edge.peso;
            builder = builder.edge(edge.p1, edge.p2, EdgeWeight::new(distancia, riesgo, consumo));
        }
        for zone in no_fly {
            let polygon = zone
                .poligono
                .into_iter()
                .map(|PositionDocument { x, y }| Coord { x, y })
                .collect();
            builder = builder.zone(polygon);
        }
        builder.build()
    }
}
