//! Attribute schema reporting.

use std::ffi::c_int;

use gdal_sys::{OGRFeatureDefnH, OGRFieldType};

use crate::errors::Result;
use crate::handle::SourceHandle;
use crate::utils::_string;
use crate::vector::query::{BoundLayer, LayerRef};

/// Declared attribute types, a closed set the host environment can marshal.
///
/// Every native OGR field type coerces to exactly one of these: integers of
/// any width to `Integer`, date, time and datetime to `DateTime`, and list,
/// wide-string and any unrecognised types to `String` through OGR's string
/// rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Integer,
    Real,
    String,
    DateTime,
    Binary,
}

impl FieldType {
    pub(crate) fn from_ogr(field_type: OGRFieldType::Type) -> FieldType {
        match field_type {
            OGRFieldType::OFTInteger | OGRFieldType::OFTInteger64 => FieldType::Integer,
            OGRFieldType::OFTReal => FieldType::Real,
            OGRFieldType::OFTDate | OGRFieldType::OFTTime | OGRFieldType::OFTDateTime => {
                FieldType::DateTime
            }
            OGRFieldType::OFTBinary => FieldType::Binary,
            _ => FieldType::String,
        }
    }

    /// Stable lowercase name for host-side marshalling.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Real => "real",
            FieldType::String => "string",
            FieldType::DateTime => "datetime",
            FieldType::Binary => "binary",
        }
    }
}

/// One attribute field of a layer schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeField {
    pub name: String,
    pub field_type: FieldType,
}

/// Reports the attribute schema of a layer (or of the virtual layer defined
/// by `sql`), in native schema order.
///
/// Only field definitions are touched; no feature values are materialised.
pub fn schema(source: &str, layer: LayerRef<'_>, sql: Option<&str>) -> Result<Vec<AttributeField>> {
    let handle = SourceHandle::open_vector(source)?;
    let bound = BoundLayer::bind(&handle, layer, sql)?;
    Ok(defn_fields(bound.defn()))
}

pub(crate) fn defn_fields(c_defn: OGRFeatureDefnH) -> Vec<AttributeField> {
    let count = unsafe { gdal_sys::OGR_FD_GetFieldCount(c_defn) };
    (0..count)
        .map(|idx| {
            let c_field_defn = unsafe { gdal_sys::OGR_FD_GetFieldDefn(c_defn, idx as c_int) };
            AttributeField {
                name: _string(unsafe { gdal_sys::OGR_Fld_GetNameRef(c_field_defn) }),
                field_type: FieldType::from_ogr(unsafe {
                    gdal_sys::OGR_Fld_GetType(c_field_defn)
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{schema, FieldType};
    use crate::test_utils::points_geojson;
    use crate::vector::query::LayerRef;

    #[test]
    fn test_schema_order_and_types() {
        let fixture = points_geojson();
        let fields = schema(fixture.source(), LayerRef::Index(0), None).unwrap();
        let reported: Vec<(&str, FieldType)> = fields
            .iter()
            .map(|f| (f.name.as_str(), f.field_type))
            .collect();
        assert_eq!(
            reported,
            vec![
                ("name", FieldType::String),
                ("value", FieldType::Real),
                ("visits", FieldType::Integer),
                ("note", FieldType::String),
            ]
        );
    }

    #[test]
    fn test_sql_projection_controls_field_order() {
        let fixture = points_geojson();
        let fields = schema(
            fixture.source(),
            LayerRef::Index(0),
            Some("SELECT visits, name FROM sites"),
        )
        .unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["visits", "name"]);
    }

    #[test]
    fn test_layer_by_name() {
        let fixture = points_geojson();
        let fields = schema(fixture.source(), LayerRef::Name("sites"), None).unwrap();
        assert_eq!(fields.len(), 4);
    }
}
