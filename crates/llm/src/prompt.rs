//! Prompt template rendering

/// Substitute `{name}` placeholders in `template` with the bound values.
///
/// The template is scanned once, so braces inside a substituted value are
/// copied verbatim. Placeholders without a binding are left untouched.
pub fn format_prompt(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let binding = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match binding {
            Some((value, close)) => {
                result.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_prompt() {
        let template = "Review {target_software} patch:\n{patch}";
        let vars = [("target_software", "Firefox"), ("patch", "+ x")];
        let result = format_prompt(template, &vars);
        assert_eq!(result, "Review Firefox patch:\n+ x");
    }

    #[test]
    fn test_unbound_placeholders_are_kept() {
        assert_eq!(format_prompt("{a} {b}", &[("a", "1")]), "1 {b}");
    }

    #[test]
    fn test_placeholders_inside_values_are_not_expanded() {
        let vars = [
            ("comments", "Use {patch} in the template"),
            ("patch", "+ DIFF BODY"),
        ];
        assert_eq!(
            format_prompt("C=<{comments}> P=<{patch}>", &vars),
            "C=<Use {patch} in the template> P=<+ DIFF BODY>"
        );
    }

    #[test]
    fn test_literal_braces_survive() {
        let template = "Answer {\"match\": N} for {name}, or {";
        assert_eq!(
            format_prompt(template, &[("name", "x")]),
            "Answer {\"match\": N} for x, or {"
        );
    }
}
