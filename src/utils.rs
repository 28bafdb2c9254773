use std::ffi::{c_char, CStr, CString};

use crate::errors::{GdalQueryError, Result};

pub fn _string(raw_ptr: *const c_char) -> String {
    if raw_ptr.is_null() {
        return String::new();
    }
    let c_str = unsafe { CStr::from_ptr(raw_ptr) };
    c_str.to_string_lossy().into_owned()
}

/// Converts a null-terminated `char **` list into owned strings.
pub fn _string_array(raw_ptr: *mut *mut c_char) -> Vec<String> {
    let mut ret_val: Vec<String> = vec![];
    if raw_ptr.is_null() {
        return ret_val;
    }
    let mut i = 0;
    unsafe {
        loop {
            let next = raw_ptr.add(i).read();
            if next.is_null() {
                break;
            }
            ret_val.push(_string(next));
            i += 1;
        }
    }
    ret_val
}

/// Drains the thread-local GDAL error state into a message.
pub fn _last_cpl_msg() -> String {
    let last_err_msg = _string(unsafe { gdal_sys::CPLGetLastErrorMsg() });
    unsafe { gdal_sys::CPLErrorReset() };
    last_err_msg
}

pub fn _last_io_err(method_name: &'static str) -> GdalQueryError {
    GdalQueryError::IoFailure {
        method_name,
        msg: _last_cpl_msg(),
    }
}

pub fn _c_string(value: &str) -> Result<CString> {
    CString::new(value).map_err(Into::into)
}
