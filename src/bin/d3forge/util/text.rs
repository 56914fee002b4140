/// Greedy word wrap; words longer than `width` get a line of their own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }

    lines
}

pub fn truncate(s: &str, max_len: usize) -> String {
    match max_len {
        0 => String::new(),
        _ if s.chars().count() <= max_len => s.to_string(),
        _ => {
            let mut out: String = s.chars().take(max_len - 1).collect();
            out.push('…');
            out
        }
    }
}

/// Fixed-point rendering of an optional value, `-` when absent.
pub fn optional(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", precision, v))
}
