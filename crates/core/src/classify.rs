//! Slide type classification from slide titles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of architecture slide, inferred from its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideType {
    /// "Current State" architecture.
    CurrentState,
    /// "Target State" / future architecture.
    TargetState,
    /// Implementation timeline.
    Timeline,
    /// Vision / north star / goals.
    Vision,
    /// Any other architecture diagram.
    Generic,
}

impl SlideType {
    /// Human-readable label, used in prompts and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            SlideType::CurrentState => "Current State Architecture",
            SlideType::TargetState => "Target State Architecture",
            SlideType::Timeline => "Implementation Timeline",
            SlideType::Vision => "Vision/Goals",
            SlideType::Generic => "Architecture Diagram",
        }
    }
}

impl fmt::Display for SlideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a slide title into a [`SlideType`].
///
/// Case-insensitive substring match against an ordered rule list; the
/// first matching rule wins and unmatched titles fall through to
/// [`SlideType::Generic`]. Pure and total.
pub fn classify(title: &str) -> SlideType {
    let title = title.to_lowercase();

    if title.contains("current") {
        SlideType::CurrentState
    } else if title.contains("target") || title.contains("future") {
        SlideType::TargetState
    } else if title.contains("timeline") {
        SlideType::Timeline
    } else if title.contains("north star") || title.contains("vision") {
        SlideType::Vision
    } else {
        SlideType::Generic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_keywords() {
        assert_eq!(classify("Current State Architecture"), SlideType::CurrentState);
        assert_eq!(classify("Target Architecture"), SlideType::TargetState);
        assert_eq!(classify("Future State"), SlideType::TargetState);
        assert_eq!(classify("Implementation Timeline"), SlideType::Timeline);
        assert_eq!(classify("North Star"), SlideType::Vision);
        assert_eq!(classify("Our Vision"), SlideType::Vision);
        assert_eq!(classify("System Landscape"), SlideType::Generic);
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(classify("CURRENT STATE"), SlideType::CurrentState);
        assert_eq!(classify("tArGeT"), SlideType::TargetState);
    }

    #[test]
    fn test_first_rule_wins() {
        // "current" is checked before "target".
        assert_eq!(
            classify("Current vs Target Comparison"),
            SlideType::CurrentState
        );
    }

    #[test]
    fn test_empty_title_is_generic() {
        assert_eq!(classify(""), SlideType::Generic);
    }
}
