//! Greedy line wrapping with a fixed average glyph width.

/// Average glyph advance as a fraction of the font size.
pub const AVERAGE_GLYPH_WIDTH: f32 = 0.5;

/// Number of characters that fit in `width` points, at least one.
pub fn chars_per_line(width: f32, font_size: f32) -> usize {
    let advance = font_size * AVERAGE_GLYPH_WIDTH;
    if !(advance > 0.0) || !width.is_finite() {
        return 1;
    }
    ((width / advance).floor() as usize).max(1)
}

/// Split `text` into lines no wider than `width`.
///
/// Words are kept whole when they fit on a line and cut otherwise. Every
/// `\n` starts a new line; an empty input gives no lines.
pub fn wrap_text(text: &str, width: f32, font_size: f32) -> Vec<String> {
    let limit = chars_per_line(width, font_size);
    let mut lines = Vec::new();
    if text.is_empty() {
        return lines;
    }

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut line = String::new();
        let mut line_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            let gap = usize::from(line_len > 0);
            if line_len + gap + word.len() <= limit {
                if gap == 1 {
                    line.push(' ');
                }
                line.extend(word.iter());
                line_len += gap + word.len();
                continue;
            }

            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
            }
            while word.len() > limit {
                let rest = word.split_off(limit);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            line.extend(word.iter());
            line_len = word.len();
        }

        lines.push(line);
    }
    lines
}
