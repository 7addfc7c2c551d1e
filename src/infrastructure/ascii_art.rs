//! Large five-row digits for the countdown display.

use crate::application::format_clock;

/// Rows per glyph.
pub const GLYPH_HEIGHT: usize = 5;

fn glyph(c: char) -> Option<[&'static str; GLYPH_HEIGHT]> {
    let rows = match c {
        '0' => [" ███ ", "█   █", "█   █", "█   █", " ███ "],
        '1' => ["  █  ", " ██  ", "  █  ", "  █  ", " ███ "],
        '2' => [" ███ ", "█   █", "   █ ", "  █  ", "█████"],
        '3' => [" ███ ", "█   █", "  ██ ", "█   █", " ███ "],
        '4' => ["█   █", "█   █", "█████", "    █", "    █"],
        '5' => ["█████", "█    ", "████ ", "    █", "████ "],
        '6' => [" ███ ", "█    ", "████ ", "█   █", " ███ "],
        '7' => ["█████", "    █", "   █ ", "  █  ", " █   "],
        '8' => [" ███ ", "█   █", " ███ ", "█   █", " ███ "],
        '9' => [" ███ ", "█   █", " ████", "    █", " ███ "],
        ':' => ["     ", "  █  ", "     ", "  █  ", "     "],
        ' ' => ["     ", "     ", "     ", "     ", "     "],
        _ => return None,
    };
    Some(rows)
}

/// Render `text` as big glyphs, one string per row. Unknown characters are skipped.
#[must_use]
pub fn render(text: &str) -> Vec<String> {
    let mut lines = vec![String::new(); GLYPH_HEIGHT];
    for rows in text.chars().filter_map(glyph) {
        for (line, row) in lines.iter_mut().zip(rows) {
            line.push_str(row);
            line.push(' ');
        }
    }
    lines
}

/// Render seconds as `MM:SS`.
#[must_use]
pub fn clock_face(seconds: u64) -> Vec<String> {
    render(&format_clock(seconds))
}
