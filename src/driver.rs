//! Driver enumeration and source resolution.

use std::ffi::CString;

use gdal_sys::GDALDriverH;

use crate::errors::Result;
use crate::handle::{SourceHandle, _register_drivers};
use crate::utils::_string;

/// A registered GDAL driver and its capability flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverInfo {
    pub short_name: String,
    pub long_name: String,
    pub raster: bool,
    pub vector: bool,
    pub create: bool,
    pub copy: bool,
    pub virtual_io: bool,
}

/// Enumerates every registered driver with its capability flags.
pub fn drivers() -> Vec<DriverInfo> {
    _register_drivers();
    let count = unsafe { gdal_sys::GDALGetDriverCount() };
    (0..count)
        .filter_map(|idx| {
            let c_driver = unsafe { gdal_sys::GDALGetDriver(idx) };
            if c_driver.is_null() {
                return None;
            }
            Some(DriverInfo {
                short_name: _string(unsafe { gdal_sys::GDALGetDriverShortName(c_driver) }),
                long_name: _string(unsafe { gdal_sys::GDALGetDriverLongName(c_driver) }),
                raster: driver_has_capability(c_driver, "DCAP_RASTER"),
                vector: driver_has_capability(c_driver, "DCAP_VECTOR"),
                create: driver_has_capability(c_driver, "DCAP_CREATE"),
                copy: driver_has_capability(c_driver, "DCAP_CREATECOPY"),
                virtual_io: driver_has_capability(c_driver, "DCAP_VIRTUALIO"),
            })
        })
        .collect()
}

/// Resolves `source` to the short name of the driver that recognises it.
///
/// The source is opened read-only just far enough to query its driver and is
/// closed again before returning. Fails with
/// [`UnsupportedSource`](crate::errors::GdalQueryError::UnsupportedSource)
/// when no driver claims the source.
pub fn identify_driver(source: &str) -> Result<String> {
    let handle = SourceHandle::probe(source)?;
    Ok(handle.driver_short_name())
}

fn driver_has_capability(c_driver: GDALDriverH, capability: &str) -> bool {
    let c_capability =
        CString::new(capability).expect("capability keys are fixed NUL-free strings");
    let c_domain = CString::new("").unwrap();
    let c_item = unsafe {
        gdal_sys::GDALGetMetadataItem(c_driver, c_capability.as_ptr(), c_domain.as_ptr())
    };
    !c_item.is_null() && _string(c_item) == "YES"
}
