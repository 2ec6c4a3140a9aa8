//! Grading results and qualitative bands.

use serde::{Deserialize, Serialize};

/// Grading result from the grading provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingOutcome {
    pub marks_obtained: u32,
    pub total_marks: u32,
    pub feedback: String,
}

/// Grading report surfaced to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingReport {
    pub marks_obtained: u32,
    pub total_marks: u32,
    pub ai_feedback: String,
}

impl GradingReport {
    pub fn percentage(&self) -> f64 {
        if self.total_marks == 0 {
            return 0.0;
        }
        (self.marks_obtained as f64 / self.total_marks as f64) * 100.0
    }
}

/// Qualitative performance band derived from the percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeBand {
    Excellent,
    VeryGood,
    Good,
    Satisfactory,
    NeedsImprovement,
    Unsatisfactory,
}

impl GradeBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            Self::Excellent
        } else if percentage >= 80.0 {
            Self::VeryGood
        } else if percentage >= 70.0 {
            Self::Good
        } else if percentage >= 60.0 {
            Self::Satisfactory
        } else if percentage >= 50.0 {
            Self::NeedsImprovement
        } else {
            Self::Unsatisfactory
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::VeryGood => "Very Good",
            Self::Good => "Good",
            Self::Satisfactory => "Satisfactory",
            Self::NeedsImprovement => "Needs Improvement",
            Self::Unsatisfactory => "Unsatisfactory",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Excellent => "\u{1F3C6}",
            Self::VeryGood => "\u{1F389}",
            Self::Good => "\u{2705}",
            Self::Satisfactory => "\u{1F44D}",
            Self::NeedsImprovement => "\u{26A0}\u{FE0F}",
            Self::Unsatisfactory => "\u{274C}",
        }
    }
}
