//! Helpers for pulling structured payloads out of free-form model output

/// Strip markdown code fences from an LLM response.
pub fn strip_markdown_fences(response: &str) -> &str {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        // Find the end of the opening fence (```json or ```)
        let after_fence = if let Some(newline_pos) = trimmed.find('\n') {
            &trimmed[newline_pos + 1..]
        } else {
            trimmed
                .strip_prefix("```json")
                .or_else(|| trimmed.strip_prefix("```"))
                .unwrap_or(trimmed)
        };

        if let Some(close_pos) = after_fence.rfind("```") {
            after_fence[..close_pos].trim()
        } else {
            after_fence.trim()
        }
    } else {
        trimmed
    }
}

/// Extract the balanced JSON structure starting at byte offset `start_pos`.
fn extract_balanced_at(content: &str, start_pos: usize) -> Option<&str> {
    let json_content = content.get(start_pos..)?;
    let start_char = json_content.chars().next()?;
    let end_char = match start_char {
        '{' => '}',
        '[' => ']',
        _ => return None,
    };

    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in json_content.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            c if c == start_char => depth += 1,
            c if c == end_char => {
                depth -= 1;
                if depth == 0 {
                    return Some(&json_content[..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

fn is_valid_json(s: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(s).is_ok()
}

/// Extract the first valid JSON value from an LLM response.
///
/// Handles markdown fences, chatty prefixes and trailing explanations, and
/// skips bracketed prose that is not valid JSON.
pub fn extract_json(response: &str) -> Option<&str> {
    let content = strip_markdown_fences(response);

    let candidates: Vec<usize> = content.match_indices(['{', '[']).map(|(i, _)| i).collect();

    for pos in candidates {
        if let Some(json) = extract_balanced_at(content, pos) {
            if is_valid_json(json) {
                return Some(json);
            }
        }
    }

    None
}

/// Extract the first valid JSON array from an LLM response.
pub fn extract_json_array(response: &str) -> Option<&str> {
    let content = strip_markdown_fences(response);

    content
        .match_indices('[')
        .filter_map(|(pos, _)| extract_balanced_at(content, pos))
        .find(|json| is_valid_json(json))
}
