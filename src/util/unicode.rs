use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells. Tabs count as 4 cells.
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(grapheme_display_width).sum()
}

/// Truncate a string to fit within `max_cells` terminal cells, appending `…` if truncated.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1; // reserve 1 cell for '…'
    let mut width = 0;
    let mut result = String::new();
    for grapheme in s.graphemes(true) {
        let gw = grapheme_display_width(grapheme);
        if width + gw > budget {
            break;
        }
        width += gw;
        result.push_str(grapheme);
    }
    result.push('\u{2026}');
    result
}

/// Left-align `s` in a column of `cells`, truncating when it does not fit
pub fn pad_to_width(s: &str, cells: usize) -> String {
    let text = truncate_to_width(s, cells);
    let used = display_width(&text);
    format!("{}{}", text, " ".repeat(cells.saturating_sub(used)))
}

/// Display width of a grapheme cluster.
fn grapheme_display_width(g: &str) -> usize {
    if g == "\t" {
        return 4;
    }
    UnicodeWidthStr::width(g)
}
