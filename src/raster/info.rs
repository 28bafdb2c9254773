use gdal_sys::CPLErr;

use crate::errors::Result;
use crate::handle::SourceHandle;
use crate::utils::_last_io_err;

/// Dataset-level raster metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterInfo {
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
    /// Affine geotransform coefficients:
    ///
    /// x-coordinate of the top-left corner pixel (x-offset),
    /// width of a pixel (x-resolution),
    /// row rotation (typically zero),
    /// y-coordinate of the top-left corner pixel,
    /// column rotation (typically zero),
    /// height of a pixel (y-resolution, typically negative).
    pub geo_transform: [f64; 6],
    /// Projection in WKT form; empty when the dataset defines none.
    pub projection: String,
    /// Short name of the driver that opened the dataset.
    pub driver: String,
    /// Per-band nodata value, indexed by band order.
    pub nodata: Vec<Option<f64>>,
    /// Per-band exact (min, max), present only when requested.
    pub min_max: Option<Vec<(f64, f64)>>,
}

/// Reports raster metadata for `source`.
///
/// With `compute_min_max` set, every band is scanned for its exact minimum
/// and maximum. That is an O(pixels) pass over the whole dataset; callers
/// opt in knowingly.
pub fn raster_info(source: &str, compute_min_max: bool) -> Result<RasterInfo> {
    let handle = SourceHandle::open_raster(source)?;
    let (width, height) = handle.raster_size();
    let band_count = handle.raster_count();

    let mut nodata = Vec::with_capacity(band_count);
    for band in 1..=band_count {
        let c_band = handle.rasterband(band)?;
        let mut pb_success = 1;
        let value = unsafe { gdal_sys::GDALGetRasterNoDataValue(c_band, &mut pb_success) };
        nodata.push((pb_success == 1).then_some(value));
    }

    let min_max = if compute_min_max {
        let mut ranges = Vec::with_capacity(band_count);
        for band in 1..=band_count {
            let c_band = handle.rasterband(band)?;
            let (mut min, mut max, mut mean, mut std_dev) = (0.0, 0.0, 0.0, 0.0);
            let rv = unsafe {
                gdal_sys::GDALGetRasterStatistics(
                    c_band, 0, // exact, not approximate
                    1, // force the scan
                    &mut min, &mut max, &mut mean, &mut std_dev,
                )
            };
            if rv != CPLErr::CE_None {
                return Err(_last_io_err("GDALGetRasterStatistics"));
            }
            ranges.push((min, max));
        }
        Some(ranges)
    } else {
        None
    };

    Ok(RasterInfo {
        width,
        height,
        band_count,
        geo_transform: handle.geo_transform(),
        projection: handle.projection(),
        driver: handle.driver_short_name(),
        nodata,
        min_max,
    })
}
