//! Selector list helpers.

/// Split a selector list on top-level commas.
///
/// Commas inside strings, parentheses (`:is(a, b)`), attribute brackets and
/// after a backslash escape do not split. Parts are trimmed; empty parts are
/// dropped.
pub fn split_selector_list(selector: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in selector.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        if c == '\\' {
            current.push(c);
            escaped = true;
            continue;
        }
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                push_part(&mut parts, &current);
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    push_part(&mut parts, &current);
    parts
}

fn push_part(parts: &mut Vec<String>, part: &str) {
    let trimmed = part.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
}

/// Drop repeated selectors from a list, keeping first occurrences.
pub fn unique_selectors(parts: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    parts.into_iter().filter(|part| seen.insert(part.clone())).collect()
}
