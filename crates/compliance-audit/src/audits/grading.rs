use serde::{Deserialize, Serialize};

/// Qualitative compliance grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Excellent,
    Good,
    Regular,
    NeedsImprovement,
}

impl Tier {
    /// Boundaries belong to the higher band: 80 is Excellent, 60 is Good, 40 is Regular.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            Self::Excellent
        } else if percentage >= 60.0 {
            Self::Good
        } else if percentage >= 40.0 {
            Self::Regular
        } else {
            Self::NeedsImprovement
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Regular => "Regular",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

/// Risk classification reported alongside the tier. Same cut points, separate scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage < 40.0 {
            Self::Critical
        } else if percentage < 60.0 {
            Self::High
        } else if percentage < 80.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grade {
    pub tier: Tier,
    pub risk: RiskLevel,
}

pub fn grade(percentage: f64) -> Grade {
    Grade {
        tier: Tier::from_percentage(percentage),
        risk: RiskLevel::from_percentage(percentage),
    }
}
