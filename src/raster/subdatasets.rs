//! Subdataset enumeration for container formats.

use std::collections::BTreeMap;

use crate::errors::Result;
use crate::handle::SourceHandle;

/// One named sub-resource inside a container source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subdataset {
    /// Connection string that opens the subdataset directly.
    pub name: String,
    pub description: String,
}

/// Lists the subdatasets of `source` in declaration order.
///
/// Formats without a subdataset concept yield an empty list.
pub fn subdatasets(source: &str) -> Result<Vec<Subdataset>> {
    let handle = SourceHandle::open_raster(source)?;
    let entries = handle.metadata_domain("SUBDATASETS")?;

    // Entries come as SUBDATASET_<n>_NAME=... / SUBDATASET_<n>_DESC=...
    // pairs; group them by <n> so reordered metadata still pairs up.
    let mut grouped: BTreeMap<usize, (String, String)> = BTreeMap::new();
    for entry in entries {
        let Some(rest) = entry.strip_prefix("SUBDATASET_") else {
            continue;
        };
        let Some((index, keyed_value)) = rest.split_once('_') else {
            continue;
        };
        let Ok(index) = index.parse::<usize>() else {
            continue;
        };
        let Some((key, value)) = keyed_value.split_once('=') else {
            continue;
        };
        let slot = grouped.entry(index).or_default();
        match key {
            "NAME" => slot.0 = value.to_owned(),
            "DESC" => slot.1 = value.to_owned(),
            _ => {}
        }
    }

    Ok(grouped
        .into_values()
        .map(|(name, description)| Subdataset { name, description })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::subdatasets;
    use crate::test_utils::byte_raster_4x4;

    #[test]
    fn test_format_without_subdatasets() {
        let fixture = byte_raster_4x4();
        assert!(subdatasets(fixture.source()).unwrap().is_empty());
    }
}
