//! Raster-side queries: dataset metadata, ground control points,
//! subdataset enumeration and windowed pixel reads.

mod gcp;
mod info;
mod subdatasets;
mod window;

pub use gcp::{gcps, Gcp, GcpSet};
pub use info::{raster_info, RasterInfo};
pub use subdatasets::{subdatasets, Subdataset};
pub use window::{read_window, BandBuffer, RasterWindow, ResampleAlg};
