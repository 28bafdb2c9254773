//! Feature attribute and display-name reads.

use std::ffi::c_int;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use gdal_sys::{OGRFeatureH, OGRFieldType};

use crate::errors::{GdalQueryError, Result};
use crate::handle::SourceHandle;
use crate::utils::_string;
use crate::vector::query::{BoundLayer, LayerRef, QueryOptions};
use crate::vector::schema::defn_fields;

/// A typed attribute value.
///
/// The variants track the declared [`FieldType`](crate::vector::FieldType)
/// set; date-only and time-only native fields keep their precision instead
/// of being padded into a full timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Real(f64),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(DateTime<FixedOffset>),
    Binary(Vec<u8>),
}

/// One feature's identifier and attribute values, in schema order.
///
/// Unset and null fields are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub fid: i64,
    pub fields: Vec<(String, Option<FieldValue>)>,
}

/// One feature's identifier and display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureName {
    pub fid: i64,
    pub name: String,
}

/// Reads attribute records from a layer, applying the
/// [`QueryOptions`] pipeline (SQL, extent filter, skip, limit) in that fixed
/// order.
pub fn read_attributes(
    source: &str,
    layer: LayerRef<'_>,
    options: &QueryOptions,
) -> Result<Vec<Feature>> {
    options.validate()?;
    let handle = SourceHandle::open_vector(source)?;
    let bound = BoundLayer::bind(&handle, layer, options.sql())?;

    let schema = defn_fields(bound.defn());
    let mut features = Vec::new();
    bound.for_each_feature(options, |raw| {
        let c_feature = raw.c_feature();
        let fields = schema
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let value = field_value(c_feature, idx as c_int)?;
                Ok((field.name.clone(), value))
            })
            .collect::<Result<Vec<_>>>()?;
        features.push(Feature {
            fid: raw.fid(),
            fields,
        });
        Ok(())
    })?;
    Ok(features)
}

/// Reads feature identifiers and display names through the same pipeline as
/// [`read_attributes`].
///
/// The display name comes from the layer's name field (the first field
/// called `name`, matched case-insensitively); layers without one fall back
/// to the stringified feature identifier.
pub fn read_names(
    source: &str,
    layer: LayerRef<'_>,
    options: &QueryOptions,
) -> Result<Vec<FeatureName>> {
    options.validate()?;
    let handle = SourceHandle::open_vector(source)?;
    let bound = BoundLayer::bind(&handle, layer, options.sql())?;

    let name_field = defn_fields(bound.defn())
        .iter()
        .position(|field| field.name.eq_ignore_ascii_case("name"));

    let mut names = Vec::new();
    bound.for_each_feature(options, |raw| {
        let fid = raw.fid();
        let name = name_field
            .and_then(|idx| {
                let idx = idx as c_int;
                let set = unsafe {
                    gdal_sys::OGR_F_IsFieldSetAndNotNull(raw.c_feature(), idx)
                } != 0;
                set.then(|| {
                    _string(unsafe { gdal_sys::OGR_F_GetFieldAsString(raw.c_feature(), idx) })
                })
            })
            .unwrap_or_else(|| fid.to_string());
        names.push(FeatureName { fid, name });
        Ok(())
    })?;
    Ok(names)
}

/// Reads one field value, coercing the native type per the declared-type
/// table. Returns `None` for unset or null fields.
fn field_value(c_feature: OGRFeatureH, field_idx: c_int) -> Result<Option<FieldValue>> {
    let is_set =
        unsafe { gdal_sys::OGR_F_IsFieldSetAndNotNull(c_feature, field_idx) } != 0;
    if !is_set {
        return Ok(None);
    }

    let c_field_defn = unsafe { gdal_sys::OGR_F_GetFieldDefnRef(c_feature, field_idx) };
    let field_type = unsafe { gdal_sys::OGR_Fld_GetType(c_field_defn) };
    let value = match field_type {
        OGRFieldType::OFTInteger | OGRFieldType::OFTInteger64 => FieldValue::Integer(unsafe {
            gdal_sys::OGR_F_GetFieldAsInteger64(c_feature, field_idx)
        }),
        OGRFieldType::OFTReal => {
            FieldValue::Real(unsafe { gdal_sys::OGR_F_GetFieldAsDouble(c_feature, field_idx) })
        }
        OGRFieldType::OFTDate | OGRFieldType::OFTTime | OGRFieldType::OFTDateTime => {
            field_as_datetime(c_feature, field_idx, field_type)?
        }
        OGRFieldType::OFTBinary => {
            let mut n_bytes: c_int = 0;
            let c_bytes =
                unsafe { gdal_sys::OGR_F_GetFieldAsBinary(c_feature, field_idx, &mut n_bytes) };
            let bytes = if c_bytes.is_null() || n_bytes <= 0 {
                Vec::new()
            } else {
                unsafe { std::slice::from_raw_parts(c_bytes, n_bytes as usize) }.to_vec()
            };
            FieldValue::Binary(bytes)
        }
        // Strings, lists and anything newer coerce through OGR's string
        // rendering.
        _ => FieldValue::String(_string(unsafe {
            gdal_sys::OGR_F_GetFieldAsString(c_feature, field_idx)
        })),
    };
    Ok(Some(value))
}

fn field_as_datetime(
    c_feature: OGRFeatureH,
    field_idx: c_int,
    field_type: OGRFieldType::Type,
) -> Result<FieldValue> {
    let mut year: c_int = 0;
    let mut month: c_int = 0;
    let mut day: c_int = 0;
    let mut hour: c_int = 0;
    let mut minute: c_int = 0;
    let mut second: f32 = 0.0;
    let mut tzflag: c_int = 0;

    let rv = unsafe {
        gdal_sys::OGR_F_GetFieldAsDateTimeEx(
            c_feature,
            field_idx,
            &mut year,
            &mut month,
            &mut day,
            &mut hour,
            &mut minute,
            &mut second,
            &mut tzflag,
        )
    };
    if rv == 0 {
        return Err(GdalQueryError::IoFailure {
            method_name: "OGR_F_GetFieldAsDateTimeEx",
            msg: "field could not be read as a date/time".to_owned(),
        });
    }

    let whole_seconds = second.trunc() as u32;
    let nanos = (second.fract() * 1_000_000_000.0) as u32;

    let date = || {
        NaiveDate::from_ymd_opt(year, month as u32, day as u32).ok_or_else(|| {
            GdalQueryError::IoFailure {
                method_name: "OGR_F_GetFieldAsDateTimeEx",
                msg: format!("field holds invalid date {year:04}-{month:02}-{day:02}"),
            }
        })
    };
    let time = || {
        NaiveTime::from_hms_nano_opt(hour as u32, minute as u32, whole_seconds, nanos).ok_or_else(
            || GdalQueryError::IoFailure {
                method_name: "OGR_F_GetFieldAsDateTimeEx",
                msg: format!("field holds invalid time {hour:02}:{minute:02}:{second}"),
            },
        )
    };

    Ok(match field_type {
        OGRFieldType::OFTDate => FieldValue::Date(date()?),
        OGRFieldType::OFTTime => FieldValue::Time(time()?),
        _ => {
            // TZFlag: 0 unknown, 1 local, 100 UTC, then 15-minute increments.
            let tz_offset_secs = if tzflag <= 1 || tzflag == 100 {
                0
            } else {
                (tzflag - 100) * 15 * 60
            };
            let offset = FixedOffset::east_opt(tz_offset_secs).ok_or_else(|| {
                GdalQueryError::IoFailure {
                    method_name: "OGR_F_GetFieldAsDateTimeEx",
                    msg: format!("field holds invalid timezone flag {tzflag}"),
                }
            })?;
            let datetime = offset
                .from_local_datetime(&date()?.and_time(time()?))
                .single()
                .ok_or_else(|| GdalQueryError::IoFailure {
                    method_name: "OGR_F_GetFieldAsDateTimeEx",
                    msg: "field holds an unrepresentable datetime".to_owned(),
                })?;
            FieldValue::DateTime(datetime)
        }
    })
}
