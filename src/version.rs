//! GDAL version inspection.

use std::ffi::CString;

use crate::utils::_string;

/// Calls `GDALVersionInfo`, expecting `key` as one of the following values:
///
/// "VERSION_NUM", "RELEASE_DATE", "RELEASE_NAME", "--version", "LICENSE",
/// "BUILD_INFO".
pub fn version_info(key: &str) -> String {
    let c_key = CString::new(key.as_bytes()).unwrap();
    _string(unsafe { gdal_sys::GDALVersionInfo(c_key.as_ptr()) })
}

/// One-line version message, e.g. "GDAL 3.8.4, released 2024/02/08".
pub fn gdal_version() -> String {
    version_info("--version")
}

#[cfg(test)]
mod tests {
    use super::{gdal_version, version_info};

    #[test]
    fn test_version_info() {
        let release_date = version_info("RELEASE_DATE");
        let release_name = version_info("RELEASE_NAME");
        let version_text = gdal_version();

        let mut date_iter = release_date.chars();
        let expected_text: String = format!(
            "GDAL {}, released {}/{}/{}",
            release_name,
            date_iter.by_ref().take(4).collect::<String>(),
            date_iter.by_ref().take(2).collect::<String>(),
            date_iter.by_ref().take(2).collect::<String>(),
        );

        assert_eq!(version_text, expected_text);
    }
}
