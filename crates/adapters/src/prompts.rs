//! Prompt templates for generation and judging

pub const GENERATION: &str = include_str!("../assets/prompts/generation.txt");

pub const JUDGE: &str = include_str!("../assets/prompts/judge.txt");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_declare_their_placeholders() {
        assert!(GENERATION.contains("{target_software}"));
        assert!(GENERATION.contains("{patch}"));
        assert!(JUDGE.contains("{old_comments}"));
        assert!(JUDGE.contains("{new_comment}"));
    }
}
