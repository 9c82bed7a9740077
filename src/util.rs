use libc::strerror;

/// Current wall clock in milliseconds, used for stream id generation.
pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

#[cfg(target_os = "linux")]
pub fn error() -> i32 {
    unsafe { *libc::__errno_location() }
}

#[cfg(target_os = "macos")]
pub fn error() -> i32 {
    unsafe { *libc::__error() }
}

pub fn error_str() -> String {
    unsafe {
        let msg = strerror(error());
        std::ffi::CStr::from_ptr(msg).to_string_lossy().into_owned()
    }
}

pub fn yes_no_to_bool(s: &str) -> Result<bool, String> {
    match &s.to_ascii_lowercase()[..] {
        "yes" => Ok(true),
        "no" => Ok(false),
        _ => Err("argument must be 'yes' or 'no'".to_string()),
    }
}

/// Render a score the way the reply framing wants it: integral scores
/// print without a fractional part, everything else round-trips.
pub fn format_double(d: f64) -> String {
    if d.is_finite() && d == d.trunc() && d.abs() < 1e17 {
        format!("{}", d as i64)
    } else {
        format!("{}", d)
    }
}
