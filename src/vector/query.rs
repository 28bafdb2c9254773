//! Layer binding and the shared feature-query pipeline.

use gdal_sys::{OGRFeatureDefnH, OGRFeatureH, OGRLayerH, OGRSpatialReferenceH};

use crate::errors::{GdalQueryError, Result};
use crate::handle::SourceHandle;
use crate::utils::_string;

/// Options shared by every feature-returning query.
///
/// Filters apply in a fixed order: the SQL statement (which replaces the
/// base layer with a virtual result layer), then the spatial extent filter,
/// then `skip`, then `limit`. A `skip` past the end of the result set yields
/// an empty result, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// SQL statement defining a virtual layer in place of the stored layer.
    pub sql: Option<String>,
    /// Maximum number of features to return.
    pub limit: Option<usize>,
    /// Number of leading features to drop after filtering.
    pub skip: Option<usize>,
    /// Bounding-box filter; features are kept when their geometry's
    /// bounding region intersects it.
    pub extent: Option<Extent>,
}

impl QueryOptions {
    pub fn new() -> Self {
        QueryOptions::default()
    }

    pub(crate) fn sql(&self) -> Option<&str> {
        non_empty(self.sql.as_deref())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(extent) = &self.extent {
            extent.validate()?;
        }
        Ok(())
    }
}

/// An axis-aligned bounding box, ordered `(xmin, ymin, xmax, ymax)`.
///
/// The component order is fixed; malformed boxes are rejected rather than
/// reordered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Extent {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let components = [self.xmin, self.ymin, self.xmax, self.ymax];
        if components.iter().any(|c| !c.is_finite()) {
            return Err(GdalQueryError::invalid(
                "Extent::validate",
                "extent components must be finite",
            ));
        }
        if self.xmin > self.xmax || self.ymin > self.ymax {
            return Err(GdalQueryError::invalid(
                "Extent::validate",
                format!(
                    "malformed extent: ({}, {}, {}, {}) requires xmin <= xmax and ymin <= ymax",
                    self.xmin, self.ymin, self.xmax, self.ymax
                ),
            ));
        }
        Ok(())
    }
}

/// Selects the stored layer a query runs against.
///
/// Ignored when the query carries a SQL statement, which defines its own
/// virtual layer.
#[derive(Debug, Clone, Copy)]
pub enum LayerRef<'a> {
    /// 0-based native layer index.
    Index(usize),
    Name(&'a str),
}

impl From<usize> for LayerRef<'static> {
    fn from(idx: usize) -> Self {
        LayerRef::Index(idx)
    }
}

impl<'a> From<&'a str> for LayerRef<'a> {
    fn from(name: &'a str) -> Self {
        LayerRef::Name(name)
    }
}

pub(crate) fn non_empty(sql: Option<&str>) -> Option<&str> {
    sql.map(str::trim).filter(|s| !s.is_empty())
}

/// A layer resolved for the duration of one query: either a stored layer or
/// a SQL result set that must be released before the dataset closes.
pub(crate) struct BoundLayer<'a> {
    handle: &'a SourceHandle,
    c_layer: OGRLayerH,
    from_sql: bool,
}

impl<'a> BoundLayer<'a> {
    pub(crate) fn bind(
        handle: &'a SourceHandle,
        layer: LayerRef<'_>,
        sql: Option<&str>,
    ) -> Result<Self> {
        if let Some(statement) = non_empty(sql) {
            let c_layer = handle.execute_sql(statement)?;
            return Ok(BoundLayer {
                handle,
                c_layer,
                from_sql: true,
            });
        }
        let c_layer = match layer {
            LayerRef::Index(idx) => handle.layer(idx)?,
            LayerRef::Name(name) => handle.layer_by_name(name)?,
        };
        Ok(BoundLayer {
            handle,
            c_layer,
            from_sql: false,
        })
    }

    pub(crate) fn name(&self) -> String {
        _string(unsafe { gdal_sys::OGR_L_GetName(self.c_layer) })
    }

    pub(crate) fn defn(&self) -> OGRFeatureDefnH {
        unsafe { gdal_sys::OGR_L_GetLayerDefn(self.c_layer) }
    }

    /// Layer SRS handle, owned by the layer. Null when undefined.
    pub(crate) fn spatial_ref(&self) -> OGRSpatialReferenceH {
        unsafe { gdal_sys::OGR_L_GetSpatialRef(self.c_layer) }
    }

    /// Runs the filter pipeline and hands every surviving feature to `f` in
    /// native read order. All feature readers share this path, so identical
    /// options always traverse identical feature sequences.
    pub(crate) fn for_each_feature<F>(&self, options: &QueryOptions, mut f: F) -> Result<()>
    where
        F: FnMut(&RawFeature) -> Result<()>,
    {
        if let Some(extent) = &options.extent {
            unsafe {
                gdal_sys::OGR_L_SetSpatialFilterRect(
                    self.c_layer,
                    extent.xmin,
                    extent.ymin,
                    extent.xmax,
                    extent.ymax,
                )
            };
        }

        let skip = options.skip.unwrap_or(0);
        unsafe { gdal_sys::OGR_L_ResetReading(self.c_layer) };

        let mut remaining_skip = skip;
        let mut taken = 0usize;
        loop {
            if let Some(limit) = options.limit {
                if taken >= limit {
                    break;
                }
            }
            let c_feature = unsafe { gdal_sys::OGR_L_GetNextFeature(self.c_layer) };
            if c_feature.is_null() {
                break;
            }
            let feature = RawFeature { c_feature };
            if remaining_skip > 0 {
                remaining_skip -= 1;
                continue;
            }
            f(&feature)?;
            taken += 1;
        }
        Ok(())
    }
}

impl Drop for BoundLayer<'_> {
    fn drop(&mut self) {
        if self.from_sql {
            unsafe {
                gdal_sys::GDALDatasetReleaseResultSet(self.handle.c_dataset(), self.c_layer)
            };
        }
    }
}

/// One feature during pipeline traversal; destroyed when dropped.
pub(crate) struct RawFeature {
    c_feature: OGRFeatureH,
}

impl RawFeature {
    pub(crate) fn c_feature(&self) -> OGRFeatureH {
        self.c_feature
    }

    pub(crate) fn fid(&self) -> i64 {
        unsafe { gdal_sys::OGR_F_GetFID(self.c_feature) }
    }
}

impl Drop for RawFeature {
    fn drop(&mut self) {
        unsafe { gdal_sys::OGR_F_Destroy(self.c_feature) };
    }
}
