use percent_encoding::percent_decode_str;

pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// Looks up `name` in a `document.cookie` style string.
///
/// Entries are split on `;` and trimmed; the first entry starting with
/// `name=` wins. Everything after that prefix is the value, so values that
/// themselves contain `=` survive intact. The value is percent-decoded
/// (`+` stays a literal plus).
pub fn get_cookie(cookie_string: &str, name: &str) -> Option<String> {
    if cookie_string.is_empty() {
        return None;
    }

    cookie_string
        .split(';')
        .map(str::trim)
        .find_map(|entry| entry.strip_prefix(name)?.strip_prefix('='))
        .map(decode_value)
}

fn decode_value(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
#[path = "tests/cookies_tests.rs"]
mod tests;
