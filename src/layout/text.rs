/// Approximate advance of `ch` in ems for a proportional sans-serif face.
pub(super) fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' | 'i' | 'j' | 'l' | 'I' | '.' | ',' | ':' | ';' | '|' | '!' | '\'' => 0.28,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '{' | '}' | '-' | '/' => 0.36,
        'm' | 'w' => 0.84,
        'M' | 'W' | '@' | '%' => 0.92,
        'A'..='Z' => 0.68,
        '0'..='9' => 0.58,
        'a'..='z' => 0.55,
        _ if ch.is_ascii() => 0.58,
        // CJK and other wide glyphs.
        _ => 1.0,
    }
}

pub(super) fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

pub(super) fn split_lines(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace("\\n", "\n");
    normalized
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect()
}

/// Greedy word wrap. Words wider than `max_width` are broken by character.
pub(super) fn wrap_line(line: &str, max_width: f32, font_size: f32) -> Vec<String> {
    if text_width(line, font_size) <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if text_width(&candidate, font_size) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if text_width(word, font_size) <= max_width {
            current.push_str(word);
        } else {
            let mut pieces = break_word(word, max_width, font_size);
            if let Some(last) = pieces.pop() {
                lines.extend(pieces);
                current = last;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn break_word(word: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        current.push(ch);
        if text_width(&current, font_size) > max_width && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Wraps `text` into lines that fit `max_width`, keeping explicit breaks.
pub(super) fn wrap_text(text: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for line in split_lines(text) {
        if line.is_empty() {
            lines.push(line);
            continue;
        }
        lines.extend(wrap_line(&line, max_width.max(font_size), font_size));
    }
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_handles_escaped_breaks() {
        assert_eq!(split_lines("a\\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("  hello  \r\n  world  "), vec!["hello", "world"]);
    }

    #[test]
    fn char_width_factor_returns_positive_values() {
        for ch in ['a', 'Z', ' ', '0', '@', '\u{4e2d}'] {
            assert!(char_width_factor(ch) > 0.0, "char {:?} has zero width", ch);
        }
    }

    #[test]
    fn text_width_scales_with_font_size() {
        let w10 = text_width("Milestone", 10.0);
        let w20 = text_width("Milestone", 20.0);
        assert!((w20 - w10 * 2.0).abs() < 0.01);
    }

    #[test]
    fn wrap_line_does_not_wrap_short_text() {
        assert_eq!(wrap_line("short", 1000.0, 10.0).len(), 1);
    }

    #[test]
    fn wrap_line_splits_long_text() {
        let result = wrap_line("this is a rather long note that should be wrapped", 80.0, 10.0);
        assert!(result.len() > 1, "expected wrapping, got {:?}", result);
        for line in &result {
            assert!(text_width(line, 10.0) <= 80.0, "{line:?} too wide");
        }
    }

    #[test]
    fn long_words_are_broken() {
        let result = wrap_line("Supercalifragilisticexpialidocious", 40.0, 10.0);
        assert!(result.len() > 1);
        assert_eq!(result.concat(), "Supercalifragilisticexpialidocious");
    }

    #[test]
    fn wrap_text_keeps_paragraph_breaks_and_drops_trailing_blank() {
        let lines = wrap_text("first\n\nsecond\n", 500.0, 10.0);
        assert_eq!(lines, vec!["first", "", "second"]);
    }
}
