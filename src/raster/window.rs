//! Windowed raster reads with resampling.

use std::ffi::{c_int, c_void};
use std::str::FromStr;

use gdal_sys::{
    CPLErr, GDALDataType, GDALRIOResampleAlg, GDALRWFlag, GDALRasterBandH, GDALRasterIOExtraArg,
};
use tracing::debug;

use crate::errors::{GdalQueryError, Result};
use crate::handle::SourceHandle;
use crate::utils::_last_io_err;

/// A pixel window over a raster band.
///
/// The source offset may be negative and the source rectangle may extend
/// past the dataset edge; out-of-bounds output cells are filled with the
/// band's nodata value (0.0 when the band defines none) instead of failing.
/// When the output size differs from the source size the configured
/// resampling algorithm is applied on that dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterWindow {
    pub x_off: isize,
    pub y_off: isize,
    pub width: usize,
    pub height: usize,
    pub out_width: usize,
    pub out_height: usize,
}

impl RasterWindow {
    /// A window read at its native size.
    pub fn new(x_off: isize, y_off: isize, width: usize, height: usize) -> Self {
        RasterWindow {
            x_off,
            y_off,
            width,
            height,
            out_width: width,
            out_height: height,
        }
    }

    /// Requests a resampled output size.
    pub fn with_output(mut self, out_width: usize, out_height: usize) -> Self {
        self.out_width = out_width;
        self.out_height = out_height;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GdalQueryError::invalid(
                "read_window",
                "window size must be positive",
            ));
        }
        if self.out_width == 0 || self.out_height == 0 {
            return Err(GdalQueryError::invalid(
                "read_window",
                "output size must be positive",
            ));
        }
        Ok(())
    }
}

/// Resampling algorithms selectable for windowed reads.
///
/// The full set is recognised by name; the aggregate algorithms from
/// `Min` onward exist only for overview generation in GDAL and are rejected
/// with `InvalidParameter` when requested for a windowed read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResampleAlg {
    #[default]
    NearestNeighbour,
    Bilinear,
    Cubic,
    CubicSpline,
    Lanczos,
    Average,
    Mode,
    Min,
    Max,
    Median,
    FirstQuartile,
    ThirdQuartile,
    Sum,
    RootMeanSquare,
}

impl ResampleAlg {
    /// Parses an algorithm name. The empty string selects the default
    /// (nearest neighbour); unknown names are `InvalidParameter`.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(match name.to_ascii_lowercase().as_str() {
            "" | "nearest" | "nearestneighbour" => ResampleAlg::NearestNeighbour,
            "bilinear" => ResampleAlg::Bilinear,
            "cubic" => ResampleAlg::Cubic,
            "cubicspline" | "cubic-spline" => ResampleAlg::CubicSpline,
            "lanczos" => ResampleAlg::Lanczos,
            "average" => ResampleAlg::Average,
            "mode" => ResampleAlg::Mode,
            "min" => ResampleAlg::Min,
            "max" => ResampleAlg::Max,
            "med" | "median" => ResampleAlg::Median,
            "q1" | "first-quartile" => ResampleAlg::FirstQuartile,
            "q3" | "third-quartile" => ResampleAlg::ThirdQuartile,
            "sum" => ResampleAlg::Sum,
            "rms" | "root-mean-square" => ResampleAlg::RootMeanSquare,
            other => {
                return Err(GdalQueryError::invalid(
                    "ResampleAlg::from_name",
                    format!("unknown resample algorithm '{other}'"),
                ))
            }
        })
    }

    fn to_gdal(self) -> Result<GDALRIOResampleAlg::Type> {
        Ok(match self {
            ResampleAlg::NearestNeighbour => GDALRIOResampleAlg::GRIORA_NearestNeighbour,
            ResampleAlg::Bilinear => GDALRIOResampleAlg::GRIORA_Bilinear,
            ResampleAlg::Cubic => GDALRIOResampleAlg::GRIORA_Cubic,
            ResampleAlg::CubicSpline => GDALRIOResampleAlg::GRIORA_CubicSpline,
            ResampleAlg::Lanczos => GDALRIOResampleAlg::GRIORA_Lanczos,
            ResampleAlg::Average => GDALRIOResampleAlg::GRIORA_Average,
            ResampleAlg::Mode => GDALRIOResampleAlg::GRIORA_Mode,
            other => {
                return Err(GdalQueryError::invalid(
                    "read_window",
                    format!("resample algorithm {other:?} is not available for windowed reads"),
                ))
            }
        })
    }
}

impl FromStr for ResampleAlg {
    type Err = GdalQueryError;

    fn from_str(s: &str) -> Result<Self> {
        ResampleAlg::from_name(s)
    }
}

/// One band's worth of window data.
///
/// Values are widened to `f64` regardless of the band's storage type; the
/// layout is row-major with `shape = (out_width, out_height)`.
#[derive(Debug, Clone, PartialEq)]
pub struct BandBuffer {
    /// 1-based band index this buffer was read from.
    pub band: usize,
    pub shape: (usize, usize),
    pub data: Vec<f64>,
}

/// Reads `window` from each of `bands` (1-based indices) in request order.
///
/// All band indices are validated against the band count before any pixel is
/// read; one bad index fails the whole call with `InvalidParameter` and no
/// partial result.
pub fn read_window(
    source: &str,
    window: &RasterWindow,
    bands: &[usize],
    resample: ResampleAlg,
) -> Result<Vec<BandBuffer>> {
    window.validate()?;
    let e_resample_alg = resample.to_gdal()?;
    if bands.is_empty() {
        return Err(GdalQueryError::invalid(
            "read_window",
            "at least one band index is required",
        ));
    }

    let handle = SourceHandle::open_raster(source)?;
    let band_count = handle.raster_count();
    for &band in bands {
        if band < 1 || band > band_count {
            return Err(GdalQueryError::invalid(
                "read_window",
                format!("band index {band} out of range 1..={band_count}"),
            ));
        }
    }

    debug!(
        source,
        ?window,
        ?bands,
        ?resample,
        "reading raster window"
    );
    let full_size = handle.raster_size();
    bands
        .iter()
        .map(|&band| {
            let c_band = handle.rasterband(band)?;
            let mut pb_success = 1;
            let nodata = unsafe { gdal_sys::GDALGetRasterNoDataValue(c_band, &mut pb_success) };
            let fill = if pb_success == 1 { nodata } else { 0.0 };
            let data = read_band_window(c_band, full_size, window, e_resample_alg, fill)?;
            Ok(BandBuffer {
                band,
                shape: (window.out_width, window.out_height),
                data,
            })
        })
        .collect()
}

/// Reads one band's window, clamping against the dataset bounds and filling
/// clipped output cells with `fill`.
fn read_band_window(
    c_band: GDALRasterBandH,
    full_size: (usize, usize),
    window: &RasterWindow,
    e_resample_alg: GDALRIOResampleAlg::Type,
    fill: f64,
) -> Result<Vec<f64>> {
    let (out_w, out_h) = (window.out_width, window.out_height);
    let (x0, y0) = (window.x_off as i64, window.y_off as i64);
    let (w, h) = (window.width as i64, window.height as i64);
    let (full_w, full_h) = (full_size.0 as i64, full_size.1 as i64);

    let cx0 = x0.max(0);
    let cy0 = y0.max(0);
    let cx1 = (x0 + w).min(full_w);
    let cy1 = (y0 + h).min(full_h);

    if cx0 >= cx1 || cy0 >= cy1 {
        // Entirely outside the dataset.
        return Ok(vec![fill; out_w * out_h]);
    }

    if (cx0, cy0, cx1, cy1) == (x0, y0, x0 + w, y0 + h) {
        let mut data = vec![0.0f64; out_w * out_h];
        rasterio_read(c_band, (cx0, cy0), (w, h), &mut data, (out_w, out_h), e_resample_alg)?;
        return Ok(data);
    }

    // Partially outside: read the clipped source region into the matching
    // output sub-rectangle and surround it with the fill value.
    let sx = out_w as f64 / w as f64;
    let sy = out_h as f64 / h as f64;
    let ox0 = (((cx0 - x0) as f64) * sx).floor() as usize;
    let oy0 = (((cy0 - y0) as f64) * sy).floor() as usize;
    let ow = ((((cx1 - cx0) as f64) * sx).round() as usize).clamp(1, out_w - ox0);
    let oh = ((((cy1 - cy0) as f64) * sy).round() as usize).clamp(1, out_h - oy0);

    let mut sub = vec![0.0f64; ow * oh];
    rasterio_read(
        c_band,
        (cx0, cy0),
        (cx1 - cx0, cy1 - cy0),
        &mut sub,
        (ow, oh),
        e_resample_alg,
    )?;

    let mut data = vec![fill; out_w * out_h];
    for row in 0..oh {
        let dst_start = (oy0 + row) * out_w + ox0;
        data[dst_start..dst_start + ow].copy_from_slice(&sub[row * ow..(row + 1) * ow]);
    }
    Ok(data)
}

fn rasterio_read(
    c_band: GDALRasterBandH,
    offset: (i64, i64),
    size: (i64, i64),
    buffer: &mut [f64],
    buffer_size: (usize, usize),
    e_resample_alg: GDALRIOResampleAlg::Type,
) -> Result<()> {
    debug_assert_eq!(buffer.len(), buffer_size.0 * buffer_size.1);
    let mut extra_arg = GDALRasterIOExtraArg {
        // RASTERIO_EXTRA_ARG_CURRENT_VERSION is a C macro (value 1) that gdal-sys
        // does not re-export (its bindgen allowlist covers functions only).
        nVersion: 1 as c_int,
        eResampleAlg: e_resample_alg,
        pfnProgress: None,
        pProgressData: std::ptr::null_mut(),
        bFloatingPointWindowValidity: 0,
        dfXOff: 0.0,
        dfYOff: 0.0,
        dfXSize: 0.0,
        dfYSize: 0.0,
    };

    let rv = unsafe {
        gdal_sys::GDALRasterIOEx(
            c_band,
            GDALRWFlag::GF_Read,
            offset.0 as c_int,
            offset.1 as c_int,
            size.0 as c_int,
            size.1 as c_int,
            buffer.as_mut_ptr() as *mut c_void,
            buffer_size.0 as c_int,
            buffer_size.1 as c_int,
            GDALDataType::GDT_Float64,
            0,
            0,
            &mut extra_arg,
        )
    };
    if rv != CPLErr::CE_None {
        return Err(_last_io_err("GDALRasterIOEx"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{read_window, RasterWindow, ResampleAlg};
    use crate::errors::GdalQueryError;
    use crate::test_utils::{byte_raster_4x4, two_band_raster};

    #[test]
    fn test_resample_names() {
        assert_eq!(
            ResampleAlg::from_name("").unwrap(),
            ResampleAlg::NearestNeighbour
        );
        assert_eq!(
            ResampleAlg::from_name("CubicSpline").unwrap(),
            ResampleAlg::CubicSpline
        );
        assert_eq!(ResampleAlg::from_name("med").unwrap(), ResampleAlg::Median);
        assert!(matches!(
            ResampleAlg::from_name("gauss"),
            Err(GdalQueryError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_full_extent_read() {
        let fixture = byte_raster_4x4();
        let buffers = read_window(
            fixture.source(),
            &RasterWindow::new(0, 0, 4, 4),
            &[1],
            ResampleAlg::NearestNeighbour,
        )
        .unwrap();
        assert_eq!(buffers.len(), 1);
        assert_eq!(buffers[0].band, 1);
        assert_eq!(buffers[0].shape, (4, 4));
        let expected: Vec<f64> = (0..16).map(f64::from).collect();
        assert_eq!(buffers[0].data, expected);
    }

    #[test]
    fn test_inner_window() {
        let fixture = byte_raster_4x4();
        let buffers = read_window(
            fixture.source(),
            &RasterWindow::new(1, 1, 2, 2),
            &[1],
            ResampleAlg::NearestNeighbour,
        )
        .unwrap();
        assert_eq!(buffers[0].data, vec![5.0, 6.0, 9.0, 10.0]);
    }

    #[test]
    fn test_nearest_upsample() {
        let fixture = byte_raster_4x4();
        let buffers = read_window(
            fixture.source(),
            &RasterWindow::new(0, 0, 2, 2).with_output(4, 4),
            &[1],
            ResampleAlg::NearestNeighbour,
        )
        .unwrap();
        assert_eq!(
            buffers[0].data,
            vec![
                0.0, 0.0, 1.0, 1.0, //
                0.0, 0.0, 1.0, 1.0, //
                4.0, 4.0, 5.0, 5.0, //
                4.0, 4.0, 5.0, 5.0, //
            ]
        );
    }

    #[test]
    fn test_window_straddling_edge_is_nodata_filled() {
        let fixture = byte_raster_4x4();
        let buffers = read_window(
            fixture.source(),
            &RasterWindow::new(-1, -1, 3, 3),
            &[1],
            ResampleAlg::NearestNeighbour,
        )
        .unwrap();
        assert_eq!(
            buffers[0].data,
            vec![
                255.0, 255.0, 255.0, //
                255.0, 0.0, 1.0, //
                255.0, 4.0, 5.0, //
            ]
        );
    }

    #[test]
    fn test_window_fully_outside() {
        let fixture = byte_raster_4x4();
        let buffers = read_window(
            fixture.source(),
            &RasterWindow::new(10, 10, 2, 2),
            &[1],
            ResampleAlg::NearestNeighbour,
        )
        .unwrap();
        assert_eq!(buffers[0].data, vec![255.0; 4]);
    }

    #[test]
    fn test_band_order_preserved() {
        let fixture = two_band_raster();
        let buffers = read_window(
            fixture.source(),
            &RasterWindow::new(0, 0, 1, 1),
            &[2, 1],
            ResampleAlg::NearestNeighbour,
        )
        .unwrap();
        assert_eq!(buffers[0].band, 2);
        assert_eq!(buffers[0].data, vec![100.0]);
        assert_eq!(buffers[1].band, 1);
        assert_eq!(buffers[1].data, vec![0.0]);
    }

    #[test]
    fn test_invalid_band_fails_whole_call() {
        let fixture = byte_raster_4x4();
        let err = read_window(
            fixture.source(),
            &RasterWindow::new(0, 0, 4, 4),
            &[1, 2],
            ResampleAlg::NearestNeighbour,
        )
        .unwrap_err();
        assert!(matches!(err, GdalQueryError::InvalidParameter { .. }));

        let err = read_window(
            fixture.source(),
            &RasterWindow::new(0, 0, 4, 4),
            &[0],
            ResampleAlg::NearestNeighbour,
        )
        .unwrap_err();
        assert!(matches!(err, GdalQueryError::InvalidParameter { .. }));
    }

    #[test]
    fn test_overview_only_algorithm_rejected() {
        let fixture = byte_raster_4x4();
        let err = read_window(
            fixture.source(),
            &RasterWindow::new(0, 0, 4, 4).with_output(2, 2),
            &[1],
            ResampleAlg::Median,
        )
        .unwrap_err();
        assert!(matches!(err, GdalQueryError::InvalidParameter { .. }));
    }

    #[test]
    fn test_repeated_reads_are_identical() {
        let fixture = byte_raster_4x4();
        let window = RasterWindow::new(0, 0, 4, 4).with_output(3, 3);
        let first = read_window(fixture.source(), &window, &[1], ResampleAlg::Bilinear).unwrap();
        let second = read_window(fixture.source(), &window, &[1], ResampleAlg::Bilinear).unwrap();
        assert_eq!(first, second);
    }
}
