//! Question selection for the QA tab.
//!
//! The page offers four fixed suggestions next to a free-text box. A submission carries the
//! suggestions marked pressed plus whatever was typed, and is resolved into exactly one
//! [`QuestionSelection`].

use serde::{Deserialize, Serialize};

/// Fixed suggested questions, in the order they are declared on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedQuestion {
    /// "What are the key findings?"
    KeyFindings,
    /// "Is the chest X-ray normal?"
    NormalStudy,
    /// "Is there evidence of pneumonia?"
    Pneumonia,
    /// "Are there signs of heart enlargement?"
    HeartEnlargement,
}

impl SuggestedQuestion {
    /// Every suggestion in declared order.
    pub const ALL: [SuggestedQuestion; 4] = [
        SuggestedQuestion::KeyFindings,
        SuggestedQuestion::NormalStudy,
        SuggestedQuestion::Pneumonia,
        SuggestedQuestion::HeartEnlargement,
    ];

    /// Button caption.
    pub fn label(self) -> &'static str {
        match self {
            Self::KeyFindings => "What are the key findings?",
            Self::NormalStudy => "Is the chest X-ray normal?",
            Self::Pneumonia => "Is there evidence of pneumonia?",
            Self::HeartEnlargement => "Are there signs of heart enlargement?",
        }
    }

    /// Question sent to the model when the button is pressed.
    pub fn question(self) -> &'static str {
        match self {
            Self::KeyFindings => "What are the key findings in this chest X-ray report?",
            Self::NormalStudy => "Is the chest X-ray normal?",
            Self::Pneumonia => "Is there evidence of pneumonia in this report?",
            Self::HeartEnlargement => "Are there signs of heart enlargement?",
        }
    }
}

/// The question a single QA submission resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionSelection {
    /// One of the fixed suggestions.
    Suggestion(SuggestedQuestion),
    /// Text typed by the user.
    FreeText(String),
}

impl QuestionSelection {
    /// Resolve a submission.
    ///
    /// A pressed suggestion always takes precedence over typed text. When several are pressed,
    /// the first in declared order wins and the rest are ignored.
    pub fn resolve<I>(pressed: I, typed: Option<&str>) -> Self
    where
        I: IntoIterator<Item = SuggestedQuestion>,
    {
        match pressed.into_iter().min() {
            Some(suggestion) => Self::Suggestion(suggestion),
            None => Self::FreeText(typed.unwrap_or_default().to_string()),
        }
    }

    /// Question text to answer.
    pub fn question(&self) -> &str {
        match self {
            Self::Suggestion(suggestion) => suggestion.question(),
            Self::FreeText(text) => text,
        }
    }
}
