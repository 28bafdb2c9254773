use gdal_query::{drivers, gdal_version};

#[test]
fn test_version_string() {
    let version = gdal_version();
    assert!(version.starts_with("GDAL"));
}

#[test]
fn test_driver_listing() {
    let all = drivers();
    assert!(!all.is_empty());

    let gtiff = all.iter().find(|d| d.short_name == "GTiff").unwrap();
    assert_eq!(gtiff.long_name, "GeoTIFF");
    assert!(gtiff.raster);
    assert!(!gtiff.vector);
}
