//! Vector-side queries: layer listing, schema and spatial reference
//! reporting, and feature attribute/geometry/name reads with a shared
//! filter pipeline.

mod attributes;
mod geometry;
mod layers;
pub(crate) mod query;
pub(crate) mod schema;

pub use attributes::{read_attributes, read_names, Feature, FeatureName, FieldValue};
pub use geometry::{read_geometry, Coord, FeatureGeometry, Geometry, GeometryEncoding};
pub use layers::{layer_names, projection_info, ProjectionInfo};
pub use query::{Extent, LayerRef, QueryOptions};
pub use schema::{schema, AttributeField, FieldType};
