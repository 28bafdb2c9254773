//! Layer enumeration and spatial reference reporting.

use std::ptr;

use gdal_sys::{OGRErr, OGRSpatialReferenceH};

use crate::errors::Result;
use crate::handle::SourceHandle;
use crate::utils::_string;
use crate::vector::query::{non_empty, BoundLayer, LayerRef};

/// Lists layer names in native index order, or the virtual layer defined by
/// `sql` when one is given.
pub fn layer_names(source: &str, sql: Option<&str>) -> Result<Vec<String>> {
    let handle = SourceHandle::open_vector(source)?;
    if non_empty(sql).is_some() {
        let bound = BoundLayer::bind(&handle, LayerRef::Index(0), sql)?;
        return Ok(vec![bound.name()]);
    }
    (0..handle.layer_count())
        .map(|idx| {
            let c_layer = handle.layer(idx)?;
            Ok(_string(unsafe { gdal_sys::OGR_L_GetName(c_layer) }))
        })
        .collect()
}

/// A layer's spatial reference system in its common text forms.
///
/// Both fields are `None` when the layer defines no SRS; an individual field
/// is `None` when GDAL cannot express the SRS in that form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectionInfo {
    pub wkt: Option<String>,
    pub proj4: Option<String>,
}

/// Reports the spatial reference of a layer (or of the virtual layer defined
/// by `sql`). A nonexistent layer is `InvalidParameter`.
pub fn projection_info(
    source: &str,
    layer: LayerRef<'_>,
    sql: Option<&str>,
) -> Result<ProjectionInfo> {
    let handle = SourceHandle::open_vector(source)?;
    let bound = BoundLayer::bind(&handle, layer, sql)?;
    let c_srs = bound.spatial_ref();
    if c_srs.is_null() {
        return Ok(ProjectionInfo::default());
    }
    Ok(ProjectionInfo {
        wkt: export_srs(c_srs, ExportForm::Wkt),
        proj4: export_srs(c_srs, ExportForm::Proj4),
    })
}

enum ExportForm {
    Wkt,
    Proj4,
}

fn export_srs(c_srs: OGRSpatialReferenceH, form: ExportForm) -> Option<String> {
    let mut c_text = ptr::null_mut();
    let rv = unsafe {
        match form {
            ExportForm::Wkt => gdal_sys::OSRExportToWkt(c_srs, &mut c_text),
            ExportForm::Proj4 => gdal_sys::OSRExportToProj4(c_srs, &mut c_text),
        }
    };
    if rv != OGRErr::OGRERR_NONE || c_text.is_null() {
        unsafe { gdal_sys::CPLErrorReset() };
        if !c_text.is_null() {
            unsafe { gdal_sys::VSIFree(c_text.cast()) };
        }
        return None;
    }
    let text = _string(c_text);
    unsafe { gdal_sys::VSIFree(c_text.cast()) };
    (!text.is_empty()).then_some(text)
}
