//! Ground control point extraction.

use crate::errors::Result;
use crate::handle::SourceHandle;
use crate::utils::_string;

/// A correspondence between a pixel/line raster position and a georeferenced
/// location.
#[derive(Debug, Clone, PartialEq)]
pub struct Gcp {
    pub id: String,
    pub info: String,
    pub pixel: f64,
    pub line: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// The ground control points of a dataset and their shared projection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GcpSet {
    pub points: Vec<Gcp>,
    /// Projection the GCP coordinates are expressed in; empty when the
    /// dataset carries no GCPs.
    pub projection: String,
}

/// Reads the ground control points of `source`.
///
/// A dataset without GCPs yields an empty set, not an error.
pub fn gcps(source: &str) -> Result<GcpSet> {
    let handle = SourceHandle::open_raster(source)?;
    let count = unsafe { gdal_sys::GDALGetGCPCount(handle.c_dataset()) };
    if count <= 0 {
        return Ok(GcpSet::default());
    }

    let projection = _string(unsafe { gdal_sys::GDALGetGCPProjection(handle.c_dataset()) });
    let c_gcps = unsafe { gdal_sys::GDALGetGCPs(handle.c_dataset()) };
    if c_gcps.is_null() {
        return Ok(GcpSet::default());
    }

    let points = (0..count as usize)
        .map(|idx| {
            let c_gcp = unsafe { &*c_gcps.add(idx) };
            Gcp {
                id: _string(c_gcp.pszId),
                info: _string(c_gcp.pszInfo),
                pixel: c_gcp.dfGCPPixel,
                line: c_gcp.dfGCPLine,
                x: c_gcp.dfGCPX,
                y: c_gcp.dfGCPY,
                z: c_gcp.dfGCPZ,
            }
        })
        .collect();

    Ok(GcpSet { points, projection })
}
