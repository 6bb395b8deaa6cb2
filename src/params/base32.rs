use data_encoding::BASE32;

/// Most `=` characters appended while trying to decode a token
pub const MAX_EXTRA_PADDING: usize = 6;

/// Decode a base32 token whose `=` padding was stripped by the generator
///
/// Tries 0 through [`MAX_EXTRA_PADDING`] extra padding characters and
/// returns the first successful decode.
///
/// # Example
/// ```
/// use tracesift::params::base32_decode;
///
/// assert_eq!(base32_decode("MZXW6").as_deref(), Some("foo"));
/// assert_eq!(base32_decode("M"), None);
/// ```
pub fn base32_decode(token: &str) -> Option<String> {
    let mut padded = String::with_capacity(token.len() + MAX_EXTRA_PADDING);
    padded.push_str(token);

    for extra in 0..=MAX_EXTRA_PADDING {
        if extra > 0 {
            padded.push('=');
        }
        let Ok(bytes) = BASE32.decode(padded.as_bytes()) else {
            continue;
        };
        return match String::from_utf8(bytes) {
            Ok(decoded) => Some(decoded),
            Err(_) => {
                tracing::error!("Base32 string is not valid UTF-8: {}", token);
                None
            }
        };
    }

    tracing::error!("Failed to decode base32 string: {}", token);
    None
}
