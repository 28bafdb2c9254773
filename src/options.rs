use std::ffi::c_uint;

use bitflags::bitflags;

// These are skipped by bindgen and manually kept in sync with gdal.h.
bitflags! {
    /// Extended open flags passed to `GDALOpenEx` in the `nOpenFlags`
    /// argument.
    ///
    /// Only the read-only subset is carried; this layer never opens a source
    /// for update, and `GDAL_OF_SHARED` is excluded because shared handles
    /// would break per-call ownership.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct GdalOpenFlags: c_uint {
        /// Open in read-only mode (default).
        const GDAL_OF_READONLY = 0x00;
        /// Allow raster and vector drivers to be used.
        const GDAL_OF_ALL = 0x00;
        /// Allow raster drivers to be used.
        const GDAL_OF_RASTER = 0x02;
        /// Allow vector drivers to be used.
        const GDAL_OF_VECTOR = 0x04;
        /// Emit an error message in case of a failed open.
        const GDAL_OF_VERBOSE_ERROR = 0x40;
    }
}

impl Default for GdalOpenFlags {
    fn default() -> GdalOpenFlags {
        GdalOpenFlags::GDAL_OF_READONLY
    }
}
