pub mod extract;
pub mod prompts;
pub mod reconcile;
pub mod scoring;
pub mod stats;

/// Kinds of questionnaire analysis the analyze endpoint can run. Unknown
/// names fall back to the general analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    ImmediateMood,
    MoodPatterns,
    ActivityImpact,
    ProgressTracking,
    General,
}

impl AnalysisKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "immediate-mood" => Self::ImmediateMood,
            "mood-patterns" => Self::MoodPatterns,
            "activity-impact" => Self::ActivityImpact,
            "progress-tracking" => Self::ProgressTracking,
            _ => Self::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImmediateMood => "immediate-mood",
            Self::MoodPatterns => "mood-patterns",
            Self::ActivityImpact => "activity-impact",
            Self::ProgressTracking => "progress-tracking",
            Self::General => "general",
        }
    }
}

/// Char-safe truncation for log lines and error bodies.
pub(crate) fn text_preview(text: &str, limit: usize) -> String {
    let mut preview: String = text.chars().take(limit).collect();
    if preview.len() < text.len() {
        preview.push_str("...");
    }
    preview
}
