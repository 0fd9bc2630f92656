use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncates `s` to at most `max_width` display columns, ending with `...`
/// when anything was cut. Never splits a multi-byte character.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(1);

        if current_width + char_width + 3 > max_width {
            break;
        }

        result.push(c);
        current_width += char_width;
    }

    result.push_str("...");
    result
}
