//! Question personalization

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

static YOUR_CHILD: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?i)your child").expect("static pattern compiles")
});

/// Replace every case-insensitive "your child" with the child's name
///
/// A blank name leaves the prompt untouched.
#[must_use]
pub fn personalize(prompt: &str, child_name: &str) -> String {
    let name = child_name.trim();
    if name.is_empty() {
        return prompt.to_string();
    }
    YOUR_CHILD.replace_all(prompt, NoExpand(name)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_all_occurrences_case_insensitively() {
        assert_eq!(
            personalize("Your child is trying... your child's toys", "Maya"),
            "Maya is trying... Maya's toys"
        );
    }

    #[test]
    fn blank_name_is_noop() {
        assert_eq!(personalize("your child", "  "), "your child");
    }

    #[test]
    fn name_is_inserted_literally() {
        assert_eq!(personalize("your child", "$1 Bob"), "$1 Bob");
    }
}
