use std::fmt;

use crate::model::{NewTask, UserId};

/// Turn raw entry text into a draft ready for creation. Titles are trimmed and
/// must not be blank.
pub fn compose_draft(user_id: UserId, raw: &str) -> Result<NewTask, CaptureError> {
    let title = normalize_title(raw).ok_or(CaptureError::EmptyTitle)?;
    Ok(NewTask {
        user_id,
        title,
        completed: false,
    })
}

/// Trimmed title, or `None` when nothing but whitespace remains.
pub fn normalize_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    EmptyTitle,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::EmptyTitle => write!(f, "Task title cannot be empty"),
        }
    }
}

impl std::error::Error for CaptureError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t \n")]
    fn blank_input_is_rejected(#[case] raw: &str) {
        assert_eq!(compose_draft(3, raw), Err(CaptureError::EmptyTitle));
    }

    #[test]
    fn draft_is_trimmed_and_active() {
        let draft = compose_draft(3, "  Buy milk ").unwrap();
        assert_eq!(draft.title, "Buy milk");
        assert_eq!(draft.user_id, 3);
        assert!(!draft.completed);
    }
}
