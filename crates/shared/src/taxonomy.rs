use crate::domain::RiskLevel;

pub const PLACEHOLDER: &str = "-";

const PROCESSING_STATUS: &[&str] = &["New", "In Progress", "Processed", "Failed"];
const RISK_LEVEL: &[&str] = &["None", "Low", "Medium", "High", "Crisis"];
const PROCESSING_RESULT: &[&str] = &["Pending", "Potential Lead", "Not Relevant", "Needs Review"];
const CATEGORY: &[&str] = &["Mental Health", "Addiction", "General Wellbeing", "Other"];
const SUBTYPE: &[&str] = &[
    "Depression",
    "Anxiety",
    "Substance Use",
    "Alcohol",
    "Trauma",
    "Other",
];
const RELEVANCE: &[&str] = &["None", "Low", "Medium", "High"];
const URGENCY: &[&str] = &["None", "Low", "Medium", "High", "Immediate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeAxis {
    ProcessingStatus,
    RiskLevel,
    ProcessingResult,
    Category,
    Subtype,
    Relevance,
    Urgency,
}

impl CodeAxis {
    pub const ALL: &'static [CodeAxis] = &[
        CodeAxis::ProcessingStatus,
        CodeAxis::RiskLevel,
        CodeAxis::ProcessingResult,
        CodeAxis::Category,
        CodeAxis::Subtype,
        CodeAxis::Relevance,
        CodeAxis::Urgency,
    ];

    pub const fn labels(self) -> &'static [&'static str] {
        match self {
            CodeAxis::ProcessingStatus => PROCESSING_STATUS,
            CodeAxis::RiskLevel => RISK_LEVEL,
            CodeAxis::ProcessingResult => PROCESSING_RESULT,
            CodeAxis::Category => CATEGORY,
            CodeAxis::Subtype => SUBTYPE,
            CodeAxis::Relevance => RELEVANCE,
            CodeAxis::Urgency => URGENCY,
        }
    }

    /// Label for `code`, or [`PLACEHOLDER`] when the code is absent or
    /// unknown to this client.
    pub fn label(self, code: Option<i64>) -> &'static str {
        code.and_then(|code| usize::try_from(code).ok())
            .and_then(|index| self.labels().get(index).copied())
            .unwrap_or(PLACEHOLDER)
    }

    /// Reverse lookup, case-insensitive.
    pub fn code(self, label: &str) -> Option<i64> {
        let label = label.trim();
        self.labels()
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(label))
            .and_then(|index| i64::try_from(index).ok())
    }
}

pub fn processing_status_label(code: Option<i64>) -> &'static str {
    CodeAxis::ProcessingStatus.label(code)
}

pub fn risk_level_label(code: Option<i64>) -> &'static str {
    CodeAxis::RiskLevel.label(code)
}

pub fn processing_result_label(code: Option<i64>) -> &'static str {
    CodeAxis::ProcessingResult.label(code)
}

pub fn category_label(code: Option<i64>) -> &'static str {
    CodeAxis::Category.label(code)
}

pub fn subtype_label(code: Option<i64>) -> &'static str {
    CodeAxis::Subtype.label(code)
}

pub fn relevance_label(code: Option<i64>) -> &'static str {
    CodeAxis::Relevance.label(code)
}

pub fn urgency_label(code: Option<i64>) -> &'static str {
    CodeAxis::Urgency.label(code)
}

/// Server risk code for a local risk level.
pub fn risk_code(level: RiskLevel) -> i64 {
    match level {
        RiskLevel::Low => 1,
        RiskLevel::Medium => 2,
        RiskLevel::High => 3,
        RiskLevel::Crisis => 4,
    }
}

/// Local risk level for a server risk code. Code 0 ("None") has no local
/// counterpart.
pub fn risk_level_from_code(code: i64) -> Option<RiskLevel> {
    match code {
        1 => Some(RiskLevel::Low),
        2 => Some(RiskLevel::Medium),
        3 => Some(RiskLevel::High),
        4 => Some(RiskLevel::Crisis),
        _ => None,
    }
}
