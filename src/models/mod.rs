// Data models for discovery sessions

pub mod session;

pub use session::{AnswerPatch, AnswerRecord, Metadata, MetadataPatch, Session};

use serde::{Deserialize, Serialize};

/// Completion status of a question
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Open,
    Answered,
}

impl AnswerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerStatus::Open => "open",
            AnswerStatus::Answered => "answered",
        }
    }

    /// Status implied by findings text alone (used by legacy migration)
    pub fn from_findings(findings: &str) -> Self {
        if findings.trim().is_empty() {
            AnswerStatus::Open
        } else {
            AnswerStatus::Answered
        }
    }
}

impl Default for AnswerStatus {
    fn default() -> Self {
        AnswerStatus::Open
    }
}

impl std::fmt::Display for AnswerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AnswerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(AnswerStatus::Open),
            "answered" => Ok(AnswerStatus::Answered),
            _ => Err(format!(
                "Unknown status: '{}'. Expected one of: open, answered",
                s
            )),
        }
    }
}

/// How a finding was obtained
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    Interview,
    Observation,
    Survey,
    Workshop,
    DataAnalysis,
    DocumentReview,
    PrototypeTesting,
    Experiment,
}

impl DiscoveryMethod {
    /// Returns the full method vocabulary
    pub fn all() -> &'static [DiscoveryMethod] {
        &[
            DiscoveryMethod::Interview,
            DiscoveryMethod::Observation,
            DiscoveryMethod::Survey,
            DiscoveryMethod::Workshop,
            DiscoveryMethod::DataAnalysis,
            DiscoveryMethod::DocumentReview,
            DiscoveryMethod::PrototypeTesting,
            DiscoveryMethod::Experiment,
        ]
    }

    /// Returns the wire tag of this method
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryMethod::Interview => "interview",
            DiscoveryMethod::Observation => "observation",
            DiscoveryMethod::Survey => "survey",
            DiscoveryMethod::Workshop => "workshop",
            DiscoveryMethod::DataAnalysis => "data_analysis",
            DiscoveryMethod::DocumentReview => "document_review",
            DiscoveryMethod::PrototypeTesting => "prototype_testing",
            DiscoveryMethod::Experiment => "experiment",
        }
    }

    /// Human-readable label
    pub fn display_name(&self) -> &'static str {
        match self {
            DiscoveryMethod::Interview => "Interviews",
            DiscoveryMethod::Observation => "Observation",
            DiscoveryMethod::Survey => "Surveys",
            DiscoveryMethod::Workshop => "Workshops",
            DiscoveryMethod::DataAnalysis => "Data Analysis",
            DiscoveryMethod::DocumentReview => "Document Review",
            DiscoveryMethod::PrototypeTesting => "Prototype Testing",
            DiscoveryMethod::Experiment => "Experiments",
        }
    }
}

impl std::fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DiscoveryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        DiscoveryMethod::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| format!("Unknown discovery method: '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_findings() {
        assert_eq!(AnswerStatus::from_findings(""), AnswerStatus::Open);
        assert_eq!(AnswerStatus::from_findings("   \n"), AnswerStatus::Open);
        assert_eq!(
            AnswerStatus::from_findings("Users churn after onboarding"),
            AnswerStatus::Answered
        );
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("answered".parse::<AnswerStatus>(), Ok(AnswerStatus::Answered));
        assert_eq!("OPEN".parse::<AnswerStatus>(), Ok(AnswerStatus::Open));
        assert!("partial".parse::<AnswerStatus>().is_err());
    }

    #[test]
    fn test_method_tags_round_trip_through_str() {
        for method in DiscoveryMethod::all() {
            assert_eq!(method.as_str().parse::<DiscoveryMethod>(), Ok(*method));
        }
    }

    #[test]
    fn test_method_parse_is_lenient_about_separators() {
        assert_eq!(
            "Data Analysis".parse::<DiscoveryMethod>(),
            Ok(DiscoveryMethod::DataAnalysis)
        );
        assert_eq!(
            "document-review".parse::<DiscoveryMethod>(),
            Ok(DiscoveryMethod::DocumentReview)
        );
        assert!("telepathy".parse::<DiscoveryMethod>().is_err());
    }

    #[test]
    fn test_method_serde_tag() {
        let json = serde_json::to_string(&DiscoveryMethod::DataAnalysis).unwrap();
        assert_eq!(json, "\"data_analysis\"");
    }
}
