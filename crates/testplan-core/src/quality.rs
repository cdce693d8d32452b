//! Description quality heuristics.
//!
//! Flags descriptions that are missing, too short, or lack acceptance
//! criteria / testing language, so the caller can warn before generation.

use crate::config::ContextPolicy;
use serde::{Deserialize, Serialize};

const MIN_CHARS: usize = 50;
const MIN_WORDS: usize = 10;

/// Quality flags and human-readable warnings for one description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionAnalysis {
    pub has_description: bool,
    pub is_weak: bool,
    pub warnings: Vec<String>,
    pub char_count: usize,
    pub word_count: usize,
}

/// Analyzes an extracted plain-text description.
pub fn analyze_description(description: &str, policy: &ContextPolicy) -> DescriptionAnalysis {
    let clean = description.trim();
    if clean.is_empty() {
        return DescriptionAnalysis {
            has_description: false,
            is_weak: true,
            warnings: vec!["No description provided in the issue".to_string()],
            char_count: 0,
            word_count: 0,
        };
    }

    let char_count = clean.chars().count();
    let word_count = clean.split_whitespace().count();
    let mut warnings = Vec::new();
    let mut is_weak = false;

    if char_count < MIN_CHARS {
        warnings.push(format!(
            "Description is very short ({char_count} characters). \
             More detail may be needed for comprehensive test planning."
        ));
        is_weak = true;
    } else if word_count < MIN_WORDS {
        warnings.push(format!(
            "Description contains only {word_count} words. Consider providing more context."
        ));
        is_weak = true;
    }

    let lower = clean.to_lowercase();
    if char_count > MIN_CHARS {
        if !contains_any(&lower, &policy.acceptance_keywords) {
            warnings.push(
                "No explicit acceptance criteria (AC) detected. \
                 You may need to provide testing context manually."
                    .to_string(),
            );
        }
        if !contains_any(&lower, &policy.testing_keywords) {
            warnings.push(
                "No testing or validation keywords found. \
                 Consider what behaviors need verification."
                    .to_string(),
            );
        }
    }

    DescriptionAnalysis {
        has_description: true,
        is_weak: is_weak || !warnings.is_empty(),
        warnings,
        char_count,
        word_count,
    }
}

/// Case-insensitive substring match; `haystack` must already be lowercase.
pub(crate) fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|keyword| haystack.contains(&keyword.to_lowercase()))
}
