//! Stateless, per-call raster and vector queries over [GDAL](https://gdal.org/).
//!
//! This crate exposes GDAL data sources to host numerical environments
//! through independent, read-only calls: each operation opens a transient
//! dataset handle, validates its parameters, performs the read and releases
//! the handle on every exit path. Nothing is cached or shared between
//! calls, which makes concurrent invocation safe as long as the underlying
//! GDAL build supports concurrent independent handles.
//!
//! A source is a connection string: a filesystem path, a URI, or a
//! driver-specific string such as a subdataset name.
//!
//! ## Use
//!
//! ```rust, no_run
//! use gdal_query::{raster_info, read_attributes, LayerRef, QueryOptions};
//!
//! let info = raster_info("data/elevation.tif", false)?;
//! println!("{}x{} pixels, {} band(s)", info.width, info.height, info.band_count);
//!
//! let options = QueryOptions {
//!     limit: Some(10),
//!     ..QueryOptions::default()
//! };
//! for feature in read_attributes("data/roads.gpkg", LayerRef::Index(0), &options)? {
//!     println!("fid {}: {} fields", feature.fid, feature.fields.len());
//! }
//! # Ok::<(), gdal_query::GdalQueryError>(())
//! ```

pub mod driver;
pub mod errors;
mod handle;
mod options;
pub mod raster;
#[cfg(test)]
mod test_utils;
mod utils;
pub mod vector;
pub mod version;

pub use driver::{drivers, identify_driver, DriverInfo};
pub use errors::{GdalQueryError, Result};
pub use raster::{
    gcps, raster_info, read_window, subdatasets, BandBuffer, Gcp, GcpSet, RasterInfo,
    RasterWindow, ResampleAlg, Subdataset,
};
pub use vector::{
    layer_names, projection_info, read_attributes, read_geometry, read_names, schema,
    AttributeField, Coord, Extent, Feature, FeatureGeometry, FeatureName, FieldType, FieldValue,
    Geometry, GeometryEncoding, LayerRef, ProjectionInfo, QueryOptions,
};
pub use version::gdal_version;
