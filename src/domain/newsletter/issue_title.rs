use chrono::NaiveDate;
use std::fmt;
use std::fmt::{Display, Formatter};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueTitle(String);

impl IssueTitle {
    pub fn parse(s: String) -> Result<Self, String> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err("Invalid newsletter title: cannot be empty.".to_string());
        }

        let grapheme_count = trimmed.graphemes(true).count();

        // Ghost caps post titles at 255; leave room for the date suffix.
        if grapheme_count > 200 {
            return Err(
                "Invalid newsletter title: cannot be longer than 200 characters.".to_string(),
            );
        }

        let has_non_numeric = trimmed
            .chars()
            .any(|c| !c.is_numeric() && !c.is_whitespace());
        if !has_non_numeric {
            return Err("Invalid newsletter title: cannot contain only numbers.".to_string());
        }

        Ok(Self(trimmed.to_string()))
    }

    /// `"{prefix} - October 16, 2026"`
    pub fn for_date(prefix: &str, date: NaiveDate) -> Result<Self, String> {
        Self::parse(format!("{} - {}", prefix.trim(), date.format("%B %-d, %Y")))
    }
}

impl AsRef<str> for IssueTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for IssueTitle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
