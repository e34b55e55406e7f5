//! Small string helpers shared by capture, extraction and output

/// Decodes UTF-8, silently dropping invalid byte sequences.
///
/// Phishing kits routinely serve mislabelled encodings, so a capture is kept
/// even when parts of it are not valid UTF-8.
pub fn decode_utf8_dropping_invalid(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());

    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                if let Ok(valid) = std::str::from_utf8(valid) {
                    out.push_str(valid);
                }
                match e.error_len() {
                    Some(len) => bytes = &rest[len..],
                    // Truncated sequence at end of input
                    None => return out,
                }
            }
        }
    }
}

/// Returns at most `max_chars` characters of `s`.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Masks a secret for display, keeping a short prefix for recognition.
pub fn mask_secret(secret: &str) -> String {
    let prefix = truncate_chars(secret, 4);
    if prefix.len() == secret.len() {
        "****".to_string()
    } else {
        format!("{}****", prefix)
    }
}
