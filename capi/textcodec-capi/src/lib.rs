use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;
use std::slice;
use std::sync::Mutex;

use textcodec::{TextCodec, TextCodecConfig};

const TEXTCODEC_ABI_NUMBER: u32 = 1;

// Message of the last failed call, shared by every instance.
static LAST_ERROR: Mutex<Option<String>> = Mutex::new(None);

fn set_last_error(err_msg: &str) {
    if let Ok(mut last_error) = LAST_ERROR.lock() {
        *last_error = Some(err_msg.to_string());
    }
}

fn get_last_error() -> Option<String> {
    LAST_ERROR.lock().ok().and_then(|e| e.clone())
}

/// Returns the C ABI version number.
/// This value changes ONLY when the C ABI is broken.
#[no_mangle]
pub extern "C" fn textcodec_abi_number() -> u32 {
    TEXTCODEC_ABI_NUMBER
}

/// Returns the library version string (UTF-8, null-terminated).
///
/// The returned pointer is valid for the lifetime of the program.
#[no_mangle]
pub extern "C" fn textcodec_version_string() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr() as *const c_char
}

/// Creates a codec with the default configuration and the built-in word list.
/// Free it with `textcodec_delete`.
#[no_mangle]
pub extern "C" fn textcodec_new() -> *mut TextCodec {
    Box::into_raw(Box::new(TextCodec::new()))
}

/// Creates a codec seeded from a packed word list.
///
/// `dict` may be NULL (with `dict_len == 0`) to use the built-in list. Returns NULL
/// and records the reason in the last error when the parameters are invalid.
///
/// # Safety
/// `dict` must point to `dict_len` readable bytes for the duration of the call.
#[no_mangle]
pub extern "C" fn textcodec_new_with_dictionary(
    dict: *const u8,
    dict_len: usize,
    log_hash_size: u32,
    dict_size: u32,
    escape1: u8,
    escape2: u8,
) -> *mut TextCodec {
    let config = TextCodecConfig::default()
        .with_log_hash_size(log_hash_size)
        .with_dict_size(dict_size as usize)
        .with_escapes(escape1, escape2);

    let result = if dict.is_null() {
        TextCodec::with_config(config)
    } else {
        let blob = unsafe { slice::from_raw_parts(dict, dict_len) };
        TextCodec::with_dictionary(blob, config)
    };

    match result {
        Ok(codec) => Box::into_raw(Box::new(codec)),
        Err(err) => {
            set_last_error(&err.to_string());
            ptr::null_mut()
        }
    }
}

/// Destroys a codec created by `textcodec_new*`. NULL is ignored.
#[no_mangle]
pub extern "C" fn textcodec_delete(instance: *mut TextCodec) {
    if !instance.is_null() {
        unsafe {
            let _ = Box::from_raw(instance);
        }
    }
}

type Direction = fn(&mut TextCodec, &[u8], &mut [u8]) -> textcodec::Result<usize>;

fn run_transform(
    instance: *mut TextCodec,
    src: *const u8,
    src_len: usize,
    dst: *mut u8,
    dst_capacity: usize,
    out_len: *mut usize,
    direction: Direction,
) -> bool {
    if instance.is_null() || (src.is_null() && src_len > 0) || (dst.is_null() && dst_capacity > 0) {
        set_last_error("Invalid argument: NULL pointer");
        return false;
    }
    let codec = unsafe { &mut *instance };
    let src: &[u8] = if src_len == 0 {
        &[]
    } else {
        unsafe { slice::from_raw_parts(src, src_len) }
    };
    let dst: &mut [u8] = if dst_capacity == 0 {
        &mut []
    } else {
        unsafe { slice::from_raw_parts_mut(dst, dst_capacity) }
    };

    match direction(codec, src, dst) {
        Ok(n) => {
            if !out_len.is_null() {
                unsafe { *out_len = n };
            }
            true
        }
        Err(err) => {
            set_last_error(&err.to_string());
            false
        }
    }
}

/// Encodes `src_len` bytes of `src` into `dst`.
///
/// Returns false when the block does not shrink, `dst` is too small, or an
/// argument is invalid; the caller then keeps the original bytes. On success the
/// encoded length is written to `out_len` (if not NULL).
///
/// # Safety
/// `src` and `dst` must be valid for `src_len` and `dst_capacity` bytes and must
/// not overlap. `instance` must not be used from two threads at once.
#[no_mangle]
pub extern "C" fn textcodec_forward(
    instance: *mut TextCodec,
    src: *const u8,
    src_len: usize,
    dst: *mut u8,
    dst_capacity: usize,
    out_len: *mut usize,
) -> bool {
    run_transform(instance, src, src_len, dst, dst_capacity, out_len, TextCodec::forward)
}

/// Decodes `src_len` bytes of `src` into `dst`.
///
/// Returns false on a corrupt or mismatched stream, or when `dst` is too small.
///
/// # Safety
/// Same contract as `textcodec_forward`.
#[no_mangle]
pub extern "C" fn textcodec_inverse(
    instance: *mut TextCodec,
    src: *const u8,
    src_len: usize,
    dst: *mut u8,
    dst_capacity: usize,
    out_len: *mut usize,
) -> bool {
    run_transform(instance, src, src_len, dst, dst_capacity, out_len, TextCodec::inverse)
}

/// Destination size that is always enough for `textcodec_forward`.
#[no_mangle]
pub extern "C" fn textcodec_max_encoded_length(instance: *const TextCodec, src_len: usize) -> usize {
    if instance.is_null() {
        return src_len;
    }
    let codec = unsafe { &*instance };
    codec.max_encoded_len(src_len)
}

/// Returns the message of the last failed call.
///
/// Always returns a heap-allocated NUL-terminated string ("No error" when there is
/// none). Free it with `textcodec_free_string`.
#[no_mangle]
pub extern "C" fn textcodec_last_error() -> *mut c_char {
    let msg: String = match get_last_error() {
        Some(err) if !err.is_empty() => err,
        _ => "No error".to_string(),
    };

    // Never panic across FFI boundary
    CString::new(msg)
        .or_else(|_| CString::new("No error"))
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut())
}

#[no_mangle]
pub extern "C" fn textcodec_clear_last_error() {
    if let Ok(mut last_error) = LAST_ERROR.lock() {
        *last_error = None;
    }
}

/// Frees a string returned by this library. NULL is ignored.
#[no_mangle]
pub extern "C" fn textcodec_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    fn read_and_free(ptr: *mut c_char) -> String {
        unsafe {
            if ptr.is_null() {
                "[null]".to_string()
            } else {
                let msg = CStr::from_ptr(ptr).to_string_lossy().into_owned();
                textcodec_free_string(ptr);
                msg
            }
        }
    }

    #[test]
    fn test_forward_inverse_through_c_api() {
        let codec = textcodec_new();
        let src = b"the house and the garden and the house";
        let mut enc = vec![0u8; textcodec_max_encoded_length(codec, src.len())];
        let mut enc_len = 0usize;
        assert!(textcodec_forward(codec, src.as_ptr(), src.len(), enc.as_mut_ptr(), enc.len(), &mut enc_len));
        assert!(enc_len < src.len());

        let mut dec = vec![0u8; src.len()];
        let mut dec_len = 0usize;
        assert!(textcodec_inverse(codec, enc.as_ptr(), enc_len, dec.as_mut_ptr(), dec.len(), &mut dec_len));
        assert_eq!(&dec[..dec_len], src);
        textcodec_delete(codec);
    }

    #[test]
    fn test_custom_dictionary() {
        let dict = b"aa bb cc dd ee the ff gg hh ii jj kk cat\n";
        let codec = textcodec_new_with_dictionary(dict.as_ptr(), dict.len(), 16, 32768, b'@', b'^');
        assert!(!codec.is_null());
        let src = b"the cat sat on the mat";
        let mut enc = vec![0u8; src.len()];
        let mut enc_len = 0usize;
        assert!(textcodec_forward(codec, src.as_ptr(), src.len(), enc.as_mut_ptr(), enc.len(), &mut enc_len));
        assert_eq!(&enc[..enc_len], b"@\x05 @\x0c sat on @\x05 mat");
        textcodec_delete(codec);
    }

    #[test]
    fn test_failures_set_last_error() {
        let codec = textcodec_new_with_dictionary(ptr::null(), 0, 16, 32768, b'@', b'@');
        assert!(codec.is_null());
        assert!(read_and_free(textcodec_last_error()).contains("escape"));

        let codec = textcodec_new();
        let src = b"zq xv";
        let mut enc = [0u8; 5];
        assert!(!textcodec_forward(codec, src.as_ptr(), src.len(), enc.as_mut_ptr(), enc.len(), ptr::null_mut()));
        assert!(!textcodec_forward(ptr::null_mut(), src.as_ptr(), src.len(), enc.as_mut_ptr(), enc.len(), ptr::null_mut()));
        textcodec_delete(codec);
    }

    #[test]
    fn test_abi_and_version() {
        assert_eq!(textcodec_abi_number(), 1);
        let ver = unsafe { CStr::from_ptr(textcodec_version_string()) }.to_str().unwrap();
        assert!(!ver.is_empty());
    }
}
