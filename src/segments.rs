//! Market segment classification.
//!
//! The "intended usage" column is free text (`"Server; Workstation"`,
//! `"Mobile, Embedded"`). Classification rules are kept as data so they can be
//! tested and revised without touching the table code.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parsing::common::split_segments;

/// Bumped whenever a rule pattern changes.
pub const SEGMENT_RULES_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SegmentCategory {
    ComputeCluster,
    Local,
    Embedded,
}

/// One classification rule: the category, the synthetic row label, and the
/// case-insensitive pattern matched anywhere in the usage text.
#[derive(Debug, Clone, Copy)]
pub struct SegmentRule {
    pub category: SegmentCategory,
    pub label: &'static str,
    pub pattern: &'static str,
}

pub const SEGMENT_RULES: [SegmentRule; 3] = [
    SegmentRule {
        category: SegmentCategory::ComputeCluster,
        label: "default compute cluster",
        pattern: "compute cluster|server|workstation|hpc|supercomputer|artificial intelligence|commercial|military|industrial",
    },
    SegmentRule {
        category: SegmentCategory::Local,
        label: "default local",
        pattern: "local|desktop|mobile|enthusiast",
    },
    SegmentRule {
        category: SegmentCategory::Embedded,
        label: "default embedded",
        pattern: "embedded",
    },
];

/// Label of the group that covers every processor regardless of segment.
pub const CATCH_ALL_LABEL: &str = "default";

static COMPILED_RULES: Lazy<Vec<(SegmentCategory, Regex)>> = Lazy::new(|| {
    SEGMENT_RULES
        .iter()
        .map(|rule| {
            let re = Regex::new(&format!("(?i){}", rule.pattern)).unwrap();
            (rule.category, re)
        })
        .collect()
});

impl SegmentCategory {
    pub fn rule(self) -> &'static SegmentRule {
        match self {
            Self::ComputeCluster => &SEGMENT_RULES[0],
            Self::Local => &SEGMENT_RULES[1],
            Self::Embedded => &SEGMENT_RULES[2],
        }
    }

    pub fn label(self) -> &'static str {
        self.rule().label
    }

    pub fn all() -> impl Iterator<Item = SegmentCategory> {
        SEGMENT_RULES.iter().map(|r| r.category)
    }

    /// Whether the pattern for this category occurs anywhere in `text`.
    pub fn matches(self, text: &str) -> bool {
        COMPILED_RULES
            .iter()
            .find(|(category, _)| *category == self)
            .is_some_and(|(_, re)| re.is_match(text))
    }
}

impl fmt::Display for SegmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// All categories whose pattern occurs in `text`, in rule order.
pub fn classify(text: &str) -> Vec<SegmentCategory> {
    COMPILED_RULES
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(category, _)| *category)
        .collect()
}

/// The individual segments of `text` that match `category`, trimmed.
pub fn matching_segments(text: &str, category: SegmentCategory) -> Vec<&str> {
    split_segments(text)
        .filter(|segment| category.matches(segment))
        .collect()
}
