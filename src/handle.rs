use std::ffi::c_int;
use std::sync::Once;

use gdal_sys::{CPLErr, GDALDatasetH, GDALRasterBandH, OGRLayerH};
use tracing::debug;

use crate::errors::{GdalQueryError, Result};
use crate::options::GdalOpenFlags;
use crate::utils::{_c_string, _last_cpl_msg, _string, _string_array};

static START: Once = Once::new();

pub(crate) fn _register_drivers() {
    unsafe {
        START.call_once(|| {
            gdal_sys::GDALAllRegister();
        });
    }
}

/// A transient dataset handle.
///
/// Ownership is scoped to exactly one query: the handle is opened at call
/// entry and closed when it goes out of scope, on success and on every error
/// path alike. It is crate-private so it can never outlive the call that
/// opened it, and nothing is shared or cached between calls.
pub(crate) struct SourceHandle {
    c_dataset: GDALDatasetH,
}

impl SourceHandle {
    /// Open a raster source read-only; failure is an `IoFailure`.
    pub(crate) fn open_raster(source: &str) -> Result<Self> {
        Self::open_with(
            source,
            GdalOpenFlags::GDAL_OF_RASTER | GdalOpenFlags::GDAL_OF_VERBOSE_ERROR,
        )
    }

    /// Open a vector source read-only; failure is an `IoFailure`.
    pub(crate) fn open_vector(source: &str) -> Result<Self> {
        Self::open_with(
            source,
            GdalOpenFlags::GDAL_OF_VECTOR | GdalOpenFlags::GDAL_OF_VERBOSE_ERROR,
        )
    }

    /// Open a source of any kind just far enough to inspect its driver.
    ///
    /// An open failure here means no driver claimed the source, so it maps to
    /// `UnsupportedSource` rather than `IoFailure`.
    pub(crate) fn probe(source: &str) -> Result<Self> {
        Self::open_with(
            source,
            GdalOpenFlags::GDAL_OF_ALL | GdalOpenFlags::GDAL_OF_VERBOSE_ERROR,
        )
        .map_err(|err| match err {
            GdalQueryError::IoFailure { msg, .. } => GdalQueryError::UnsupportedSource {
                source: source.to_owned(),
                msg,
            },
            other => other,
        })
    }

    fn open_with(source: &str, flags: GdalOpenFlags) -> Result<Self> {
        _register_drivers();
        let c_source = _c_string(source)?;
        debug!(source, flags = ?flags, "opening GDAL source");
        let c_dataset = unsafe {
            gdal_sys::GDALOpenEx(
                c_source.as_ptr(),
                flags.bits(),
                std::ptr::null(),
                std::ptr::null(),
                std::ptr::null(),
            )
        };
        if c_dataset.is_null() {
            return Err(GdalQueryError::IoFailure {
                method_name: "GDALOpenEx",
                msg: _last_cpl_msg(),
            });
        }
        Ok(SourceHandle { c_dataset })
    }

    pub(crate) fn c_dataset(&self) -> GDALDatasetH {
        self.c_dataset
    }

    pub(crate) fn raster_size(&self) -> (usize, usize) {
        let size_x = unsafe { gdal_sys::GDALGetRasterXSize(self.c_dataset) } as usize;
        let size_y = unsafe { gdal_sys::GDALGetRasterYSize(self.c_dataset) } as usize;
        (size_x, size_y)
    }

    pub(crate) fn raster_count(&self) -> usize {
        (unsafe { gdal_sys::GDALGetRasterCount(self.c_dataset) }) as usize
    }

    /// Affine geotransform; GDAL's documented default when the dataset does
    /// not define one.
    pub(crate) fn geo_transform(&self) -> [f64; 6] {
        let mut transformation = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let rv =
            unsafe { gdal_sys::GDALGetGeoTransform(self.c_dataset, transformation.as_mut_ptr()) };
        if rv != CPLErr::CE_None {
            unsafe { gdal_sys::CPLErrorReset() };
            return [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        }
        transformation
    }

    pub(crate) fn projection(&self) -> String {
        _string(unsafe { gdal_sys::GDALGetProjectionRef(self.c_dataset) })
    }

    pub(crate) fn driver_short_name(&self) -> String {
        unsafe {
            let c_driver = gdal_sys::GDALGetDatasetDriver(self.c_dataset);
            _string(gdal_sys::GDALGetDriverShortName(c_driver))
        }
    }

    /// Fetch a band by 1-based index. Callers validate the index against
    /// `raster_count` first; a null band here is a native failure.
    pub(crate) fn rasterband(&self, band: usize) -> Result<GDALRasterBandH> {
        let c_band = unsafe { gdal_sys::GDALGetRasterBand(self.c_dataset, band as c_int) };
        if c_band.is_null() {
            return Err(GdalQueryError::IoFailure {
                method_name: "GDALGetRasterBand",
                msg: _last_cpl_msg(),
            });
        }
        Ok(c_band)
    }

    pub(crate) fn metadata_domain(&self, domain: &str) -> Result<Vec<String>> {
        let c_domain = _c_string(domain)?;
        let c_list = unsafe { gdal_sys::GDALGetMetadata(self.c_dataset, c_domain.as_ptr()) };
        Ok(_string_array(c_list))
    }

    pub(crate) fn layer_count(&self) -> usize {
        (unsafe { gdal_sys::GDALDatasetGetLayerCount(self.c_dataset) }) as usize
    }

    pub(crate) fn layer(&self, idx: usize) -> Result<OGRLayerH> {
        let c_layer = unsafe { gdal_sys::GDALDatasetGetLayer(self.c_dataset, idx as c_int) };
        if c_layer.is_null() {
            return Err(GdalQueryError::invalid(
                "GDALDatasetGetLayer",
                format!("no layer at index {idx}"),
            ));
        }
        Ok(c_layer)
    }

    pub(crate) fn layer_by_name(&self, name: &str) -> Result<OGRLayerH> {
        let c_name = _c_string(name)?;
        let c_layer =
            unsafe { gdal_sys::GDALDatasetGetLayerByName(self.c_dataset, c_name.as_ptr()) };
        if c_layer.is_null() {
            return Err(GdalQueryError::invalid(
                "GDALDatasetGetLayerByName",
                format!("no layer named '{name}'"),
            ));
        }
        Ok(c_layer)
    }

    /// Execute a SQL statement, yielding the virtual result layer.
    ///
    /// The layer must be handed back through
    /// `GDALDatasetReleaseResultSet` before the handle closes.
    pub(crate) fn execute_sql(&self, sql: &str) -> Result<OGRLayerH> {
        let c_sql = _c_string(sql)?;
        debug!(sql, "executing SQL statement");
        unsafe { gdal_sys::CPLErrorReset() };
        let c_layer = unsafe {
            gdal_sys::GDALDatasetExecuteSQL(
                self.c_dataset,
                c_sql.as_ptr(),
                std::ptr::null_mut(),
                std::ptr::null(),
            )
        };
        let cpl_err = unsafe { gdal_sys::CPLGetLastErrorType() };
        if cpl_err != CPLErr::CE_None {
            if !c_layer.is_null() {
                unsafe { gdal_sys::GDALDatasetReleaseResultSet(self.c_dataset, c_layer) };
            }
            return Err(GdalQueryError::QueryFailure {
                msg: _last_cpl_msg(),
            });
        }
        if c_layer.is_null() {
            // Statements such as DDL succeed without a result set; a read
            // query that produces none is unusable here.
            return Err(GdalQueryError::QueryFailure {
                msg: format!("statement produced no result set: '{sql}'"),
            });
        }
        Ok(c_layer)
    }
}

impl Drop for SourceHandle {
    fn drop(&mut self) {
        unsafe {
            gdal_sys::GDALClose(self.c_dataset);
        }
    }
}
