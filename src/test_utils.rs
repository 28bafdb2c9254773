//! Test fixtures, materialised per-test into temporary directories.
//!
//! Rasters are written through the GTiff driver with raw `gdal-sys` calls;
//! the public API of this crate is read-only, so tests create their inputs
//! below it. Vector fixtures are plain GeoJSON text.

use std::ffi::{c_int, c_void, CString};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use gdal_sys::{CPLErr, GDALDataType, GDALRWFlag};

use crate::handle::_register_drivers;

/// A temporary directory holding one fixture file; both are removed on drop.
pub struct TempFixture {
    _temp_dir: tempfile::TempDir,
    temp_path: PathBuf,
}

impl TempFixture {
    fn empty(name: &str) -> Self {
        let _temp_dir = tempfile::tempdir().unwrap();
        let temp_path = _temp_dir.path().join(name);
        Self {
            _temp_dir,
            temp_path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// The fixture path as a source string.
    pub fn source(&self) -> &str {
        self.temp_path.to_str().unwrap()
    }
}

/// A 4×4 single-band byte GTiff with row-major values 0..15, nodata 255 and
/// geotransform `[0, 1, 0, 4, 0, -1]`.
pub fn byte_raster_4x4() -> TempFixture {
    let values: Vec<f64> = (0..16).map(f64::from).collect();
    create_gtiff(4, 4, &[values])
}

/// A 4×4 two-band byte GTiff: band 1 holds 0..15, band 2 holds 100..115.
pub fn two_band_raster() -> TempFixture {
    let band1: Vec<f64> = (0..16).map(f64::from).collect();
    let band2: Vec<f64> = (100..116).map(f64::from).collect();
    create_gtiff(4, 4, &[band1, band2])
}

fn create_gtiff(width: usize, height: usize, bands: &[Vec<f64>]) -> TempFixture {
    _register_drivers();
    let fixture = TempFixture::empty("fixture.tif");
    let c_path = CString::new(fixture.source()).unwrap();
    let c_driver_name = CString::new("GTiff").unwrap();

    unsafe {
        let c_driver = gdal_sys::GDALGetDriverByName(c_driver_name.as_ptr());
        assert!(!c_driver.is_null(), "GTiff driver unavailable");
        let c_dataset = gdal_sys::GDALCreate(
            c_driver,
            c_path.as_ptr(),
            width as c_int,
            height as c_int,
            bands.len() as c_int,
            GDALDataType::GDT_Byte,
            std::ptr::null_mut(),
        );
        assert!(!c_dataset.is_null(), "failed to create fixture raster");

        let mut geo_transform = [0.0, 1.0, 0.0, height as f64, 0.0, -1.0];
        assert_eq!(
            gdal_sys::GDALSetGeoTransform(c_dataset, geo_transform.as_mut_ptr()),
            CPLErr::CE_None
        );

        for (band_idx, values) in bands.iter().enumerate() {
            assert_eq!(values.len(), width * height);
            let c_band = gdal_sys::GDALGetRasterBand(c_dataset, (band_idx + 1) as c_int);
            assert!(!c_band.is_null());
            assert_eq!(
                gdal_sys::GDALSetRasterNoDataValue(c_band, 255.0),
                CPLErr::CE_None
            );
            let rv = gdal_sys::GDALRasterIO(
                c_band,
                GDALRWFlag::GF_Write,
                0,
                0,
                width as c_int,
                height as c_int,
                values.as_ptr() as *mut c_void,
                width as c_int,
                height as c_int,
                GDALDataType::GDT_Float64,
                0,
                0,
            );
            assert_eq!(rv, CPLErr::CE_None);
        }

        gdal_sys::GDALClose(c_dataset);
    }
    fixture
}

/// A GeoJSON layer named `sites` with three point features:
///
/// | fid | name  | value | visits | note | geometry      |
/// |-----|-------|-------|--------|------|---------------|
/// | 1   | alpha | 1.5   | 10     | "x"  | POINT (0 0)   |
/// | 2   | beta  | 2.5   | 20     | null | POINT (10 10) |
/// | 3   | gamma | 3.5   | 30     | "y"  | POINT (20 20) |
pub fn points_geojson() -> TempFixture {
    let fixture = TempFixture::empty("sites.geojson");
    let contents = r#"{
"type": "FeatureCollection",
"name": "sites",
"features": [
{ "type": "Feature", "id": 1, "properties": { "name": "alpha", "value": 1.5, "visits": 10, "note": "x" }, "geometry": { "type": "Point", "coordinates": [ 0.0, 0.0 ] } },
{ "type": "Feature", "id": 2, "properties": { "name": "beta", "value": 2.5, "visits": 20, "note": null }, "geometry": { "type": "Point", "coordinates": [ 10.0, 10.0 ] } },
{ "type": "Feature", "id": 3, "properties": { "name": "gamma", "value": 3.5, "visits": 30, "note": "y" }, "geometry": { "type": "Point", "coordinates": [ 20.0, 20.0 ] } }
]
}
"#;
    std::fs::write(fixture.path(), contents).unwrap();
    fixture
}

/// Scoped value for temporarily suppressing thread-local GDAL log messages.
///
/// Useful for tests that expect GDAL errors and want to keep the output log
/// clean of distracting yet expected error messages.
pub struct SuppressGdalErrorLog {
    // Make !Sync and !Send, and force use of `new`.
    _private: PhantomData<*mut c_void>,
}

impl SuppressGdalErrorLog {
    pub fn new() -> Self {
        unsafe { gdal_sys::CPLPushErrorHandler(Some(gdal_sys::CPLQuietErrorHandler)) };
        SuppressGdalErrorLog {
            _private: PhantomData,
        }
    }
}

impl Drop for SuppressGdalErrorLog {
    fn drop(&mut self) {
        unsafe { gdal_sys::CPLPopErrorHandler() };
    }
}
