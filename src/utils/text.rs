/// Shorten `s` to roughly `length` characters, cutting at the last `delim`.
///
/// Strings already within `length` characters come back unchanged. Otherwise
/// the first `length + delim.len()` characters are taken, cut at the last
/// occurrence of `delim` (if any), and `appendix` is added when something
/// remains.
#[must_use]
pub fn smart_trim(s: &str, length: usize, delim: &str, appendix: &str) -> String {
    if s.chars().count() <= length {
        return s.to_string();
    }

    let window = length + delim.chars().count();
    let mut trimmed: String = s.chars().take(window).collect();

    if let Some(idx) = trimmed.rfind(delim) {
        trimmed.truncate(idx);
    }

    if !trimmed.is_empty() {
        trimmed.push_str(appendix);
    }

    trimmed
}

/// First `n` characters of `s`, respecting char boundaries.
#[must_use]
pub fn take_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Remove HTML tags and decode the handful of entities rich-text editors emit.
///
/// Whitespace runs collapse to a single space. A tag left open at the end
/// (e.g. from a truncated body) is dropped.
#[must_use]
pub fn strip_html(input: &str) -> String {
    let mut text = String::with_capacity(input.len());
    let mut in_tag = false;

    for c in input.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smart_trim_short_input_unchanged() {
        assert_eq!(smart_trim("short body", 320, " ", " ..."), "short body");
    }

    #[test]
    fn test_smart_trim_cuts_at_word() {
        assert_eq!(smart_trim("hello wonderful world", 12, " ", " ..."), "hello ...");
        assert_eq!(
            smart_trim("hello wonderful world", 16, " ", " ..."),
            "hello wonderful ..."
        );
    }

    #[test]
    fn test_smart_trim_window_includes_delim_length() {
        // window is 6 chars: "hello " -> cut at the trailing space
        assert_eq!(smart_trim("hello world", 5, " ", "..."), "hello...");
    }

    #[test]
    fn test_smart_trim_without_delim_keeps_window() {
        assert_eq!(smart_trim("abcdefghij", 4, " ", "~"), "abcde~");
    }

    #[test]
    fn test_smart_trim_empty_result_gets_no_appendix() {
        assert_eq!(smart_trim(" abcdef", 2, " ", " ..."), "");
    }

    #[test]
    fn test_smart_trim_multibyte() {
        let s = "é".repeat(10);
        assert_eq!(smart_trim(&s, 3, " ", ""), "éééé");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<p>Le <strong>marché</strong> de&nbsp;Moroni</p>"),
            "Le marché de Moroni"
        );
        assert_eq!(strip_html("a &amp; b <em"), "a & b");
    }

    #[test]
    fn test_take_chars() {
        assert_eq!(take_chars("ndzuwani", 3), "ndz");
        assert_eq!(take_chars("ab", 5), "ab");
    }
}
