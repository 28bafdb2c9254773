//! Feature geometry reads in the caller's choice of encoding.

use std::ffi::c_int;
use std::ptr;
use std::str::FromStr;

use gdal_sys::{OGRErr, OGRGeometryH, OGRwkbByteOrder};

use crate::errors::{GdalQueryError, Result};
use crate::handle::SourceHandle;
use crate::utils::{_last_cpl_msg, _string};
use crate::vector::query::{BoundLayer, LayerRef, QueryOptions};

/// Output encodings for feature geometry.
///
/// The encoding only changes how geometry is represented; the feature set
/// and its order are exactly those of the other readers under equal
/// [`QueryOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryEncoding {
    /// Well-known binary, little-endian.
    #[default]
    Wkb,
    /// Well-known text.
    Wkt,
    /// Raw coordinate tuples per ring/part.
    Coords,
}

impl GeometryEncoding {
    /// Parses an encoding name; unknown names are `InvalidParameter`.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(match name.to_ascii_lowercase().as_str() {
            "wkb" | "binary" => GeometryEncoding::Wkb,
            "wkt" | "text" => GeometryEncoding::Wkt,
            "coords" | "points" => GeometryEncoding::Coords,
            other => {
                return Err(GdalQueryError::invalid(
                    "GeometryEncoding::from_name",
                    format!("unknown geometry encoding '{other}'"),
                ))
            }
        })
    }
}

impl FromStr for GeometryEncoding {
    type Err = GdalQueryError;

    fn from_str(s: &str) -> Result<Self> {
        GeometryEncoding::from_name(s)
    }
}

/// One vertex; `z` is present only for geometries with a third dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

/// A feature geometry in the encoding the caller selected.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Wkb(Vec<u8>),
    Wkt(String),
    /// Vertex runs per ring/part, in native traversal order.
    Coords(Vec<Vec<Coord>>),
}

/// One feature's identifier and optional geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureGeometry {
    pub fid: i64,
    /// `None` for features without geometry.
    pub geometry: Option<Geometry>,
}

/// Reads feature geometries through the same pipeline as
/// [`read_attributes`](crate::vector::read_attributes), encoding each
/// geometry at the output boundary.
pub fn read_geometry(
    source: &str,
    layer: LayerRef<'_>,
    options: &QueryOptions,
    encoding: GeometryEncoding,
) -> Result<Vec<FeatureGeometry>> {
    options.validate()?;
    let handle = SourceHandle::open_vector(source)?;
    let bound = BoundLayer::bind(&handle, layer, options.sql())?;

    let mut features = Vec::new();
    bound.for_each_feature(options, |raw| {
        let c_geometry = unsafe { gdal_sys::OGR_F_GetGeometryRef(raw.c_feature()) };
        let geometry = if c_geometry.is_null() {
            None
        } else {
            Some(encode_geometry(c_geometry, encoding)?)
        };
        features.push(FeatureGeometry {
            fid: raw.fid(),
            geometry,
        });
        Ok(())
    })?;
    Ok(features)
}

fn encode_geometry(c_geometry: OGRGeometryH, encoding: GeometryEncoding) -> Result<Geometry> {
    match encoding {
        GeometryEncoding::Wkb => export_wkb(c_geometry).map(Geometry::Wkb),
        GeometryEncoding::Wkt => export_wkt(c_geometry).map(Geometry::Wkt),
        GeometryEncoding::Coords => {
            let mut parts = Vec::new();
            collect_parts(c_geometry, &mut parts);
            Ok(Geometry::Coords(parts))
        }
    }
}

fn export_wkb(c_geometry: OGRGeometryH) -> Result<Vec<u8>> {
    let wkb_size = unsafe { gdal_sys::OGR_G_WkbSize(c_geometry) } as usize;
    let mut wkb: Vec<u8> = Vec::with_capacity(wkb_size);
    let rv = unsafe {
        gdal_sys::OGR_G_ExportToWkb(c_geometry, OGRwkbByteOrder::wkbNDR, wkb.as_mut_ptr())
    };
    if rv != OGRErr::OGRERR_NONE {
        return Err(GdalQueryError::IoFailure {
            method_name: "OGR_G_ExportToWkb",
            msg: _last_cpl_msg(),
        });
    }
    // ExportToWkb filled exactly wkb_size bytes of the reserved capacity.
    unsafe { wkb.set_len(wkb_size) };
    Ok(wkb)
}

fn export_wkt(c_geometry: OGRGeometryH) -> Result<String> {
    let mut c_wkt = ptr::null_mut();
    let rv = unsafe { gdal_sys::OGR_G_ExportToWkt(c_geometry, &mut c_wkt) };
    if rv != OGRErr::OGRERR_NONE {
        return Err(GdalQueryError::IoFailure {
            method_name: "OGR_G_ExportToWkt",
            msg: _last_cpl_msg(),
        });
    }
    let wkt = _string(c_wkt);
    unsafe { gdal_sys::VSIFree(c_wkt.cast()) };
    Ok(wkt)
}

/// Walks a geometry depth-first, emitting each leaf ring/part as one vertex
/// run.
fn collect_parts(c_geometry: OGRGeometryH, parts: &mut Vec<Vec<Coord>>) {
    let sub_count = unsafe { gdal_sys::OGR_G_GetGeometryCount(c_geometry) };
    if sub_count > 0 {
        for idx in 0..sub_count {
            let c_sub = unsafe { gdal_sys::OGR_G_GetGeometryRef(c_geometry, idx as c_int) };
            if !c_sub.is_null() {
                collect_parts(c_sub, parts);
            }
        }
        return;
    }

    let point_count = unsafe { gdal_sys::OGR_G_GetPointCount(c_geometry) };
    if point_count <= 0 {
        return;
    }
    let has_z = unsafe { gdal_sys::OGR_G_GetCoordinateDimension(c_geometry) } >= 3;
    let part = (0..point_count)
        .map(|idx| {
            let (mut x, mut y, mut z) = (0.0, 0.0, 0.0);
            unsafe { gdal_sys::OGR_G_GetPoint(c_geometry, idx, &mut x, &mut y, &mut z) };
            Coord {
                x,
                y,
                z: has_z.then_some(z),
            }
        })
        .collect();
    parts.push(part);
}
