//! A single section-labeled question from the question bank.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Bold heading shown in front of the question (e.g. "SIP Trunk & ISP - General").
    pub section: String,
    pub text: String,
}

impl Question {
    pub fn new(section: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            text: text.into(),
        }
    }
}

/// Renders as `**<section>** - <text>`.
impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "**{}** - {}", self.section, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_bold_section_prefix() {
        let q = Question::new("Area Types", "What area types are included?");
        assert_eq!(q.to_string(), "**Area Types** - What area types are included?");
    }
}
