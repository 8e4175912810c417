//! Sanitizing error messages before they are stored on a bulk task.
//!
//! Collector errors can carry raw server text (WHOIS banners, HTTP bodies), so
//! control characters are stripped and the length is capped.

/// Removes control characters (0x00-0x1F except tab/newline/CR).
pub fn sanitize_error_message(message: &str) -> String {
    message
        .chars()
        .filter(|c| {
            let code = *c as u32;
            code >= 0x20 || code == 0x09 || code == 0x0A || code == 0x0D
        })
        .collect()
}

/// Sanitizes and truncates an error message to `MAX_ERROR_MESSAGE_LENGTH`.
///
/// Truncation happens on a char boundary and appends the original length.
pub fn sanitize_and_truncate_error_message(message: &str) -> String {
    let sanitized = sanitize_error_message(message);
    let max = crate::config::MAX_ERROR_MESSAGE_LENGTH;

    if sanitized.len() <= max {
        return sanitized;
    }

    // Leave room for the truncation suffix
    let mut end = max.saturating_sub(50);
    while !sanitized.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}... (truncated, original length: {} chars)",
        &sanitized[..end],
        sanitized.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_error_message_removes_control_chars() {
        let input = "Error\x00message\x01with\x02control\x03chars";
        assert_eq!(sanitize_error_message(input), "Errormessagewithcontrolchars");
    }

    #[test]
    fn test_sanitize_error_message_preserves_whitespace_and_unicode() {
        let input = "Line one\n\tindented: 测试 🚀";
        assert_eq!(sanitize_error_message(input), input);
    }

    #[test]
    fn test_short_message_is_not_truncated() {
        assert_eq!(
            sanitize_and_truncate_error_message("connection refused"),
            "connection refused"
        );
    }

    #[test]
    fn test_long_message_is_truncated() {
        let long = "x".repeat(crate::config::MAX_ERROR_MESSAGE_LENGTH + 100);
        let out = sanitize_and_truncate_error_message(&long);
        assert!(out.len() < long.len());
        assert!(out.contains("truncated, original length: 2100 chars"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let long = "é".repeat(crate::config::MAX_ERROR_MESSAGE_LENGTH);
        let out = sanitize_and_truncate_error_message(&long);
        assert!(out.contains("truncated"));
    }
}
