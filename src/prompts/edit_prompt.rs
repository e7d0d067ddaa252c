//! Instructions for modifying the current pattern script

/// Generates the instruction block for edits of `current_code`
///
/// The current code is embedded in a fenced block so the reply can be
/// compared against it.
///
/// # Examples
///
/// ```
/// use audial::prompts::edit_prompt::generate_edit_prompt;
///
/// let prompt = generate_edit_prompt("setcpm(90)\n$: s(\"bd\")");
/// assert!(prompt.contains("EDIT"));
/// assert!(prompt.contains("setcpm(90)"));
/// ```
pub fn generate_edit_prompt(current_code: &str) -> String {
    format!(
        r#"You are in EDIT mode. Modify the CURRENT CODE to satisfy the request below.

RULES FOR EDITS:
- Keep everything the request does not ask you to change
- Change one element at a time: a voice, an effect value, a pattern
- Return the whole script, not a fragment or a diff
- If the request cannot be met without breaking the rules, make the
  closest valid change

CURRENT CODE:
```
{}
```"#,
        current_code.trim_end()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_prompt_embeds_code() {
        let prompt = generate_edit_prompt("setcpm(100)\n\n");
        assert!(prompt.contains("EDIT"));
        assert!(prompt.contains("```\nsetcpm(100)\n```"));
        assert!(prompt.contains("whole script"));
    }
}
