use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Pad `s` with spaces on the right until it fills `cells` terminal cells.
/// Strings already at least that wide are returned unchanged.
pub fn pad_to_width(s: &str, cells: usize) -> String {
    let width = display_width(s);
    if width >= cells {
        return s.to_string();
    }
    format!("{}{}", s, " ".repeat(cells - width))
}
