//! Heuristic lookup tables
//!
//! Every keyword-based inference in the engine is driven by one of the static
//! tables below, so the heuristics can be reviewed and tested on their own.

use std::collections::BTreeSet;

use crate::models::DiscoveryMethod;

/// Keyword (lowercase substring) -> discovery method
pub const METHOD_KEYWORDS: &[(&str, DiscoveryMethod)] = &[
    ("interview", DiscoveryMethod::Interview),
    ("spoke with", DiscoveryMethod::Interview),
    ("conversation", DiscoveryMethod::Interview),
    ("observ", DiscoveryMethod::Observation),
    ("shadowing", DiscoveryMethod::Observation),
    ("site visit", DiscoveryMethod::Observation),
    ("survey", DiscoveryMethod::Survey),
    ("questionnaire", DiscoveryMethod::Survey),
    ("workshop", DiscoveryMethod::Workshop),
    ("brainstorm", DiscoveryMethod::Workshop),
    ("analytics", DiscoveryMethod::DataAnalysis),
    ("data analysis", DiscoveryMethod::DataAnalysis),
    ("dashboard", DiscoveryMethod::DataAnalysis),
    ("baseline data", DiscoveryMethod::DataAnalysis),
    ("document review", DiscoveryMethod::DocumentReview),
    ("documentation", DiscoveryMethod::DocumentReview),
    ("support tickets", DiscoveryMethod::DocumentReview),
    ("prototype", DiscoveryMethod::PrototypeTesting),
    ("usability test", DiscoveryMethod::PrototypeTesting),
    ("experiment", DiscoveryMethod::Experiment),
    ("a/b test", DiscoveryMethod::Experiment),
];

/// Lexical signal (lowercase substring) -> maturity weight
pub const MATURITY_SIGNALS: &[(&str, u32)] = &[
    ("assumption", 6),
    ("hypothes", 6),
    ("validate", 6),
    ("experiment", 5),
    ("a/b test", 5),
    ("prototype", 4),
    ("metric", 4),
    ("baseline", 3),
    ("evidence", 3),
    ("learning", 2),
];

/// A technique the summary can recommend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TechniqueEntry {
    pub method: DiscoveryMethod,
    pub name: &'static str,
    /// Benefit sentence; `{client}` is replaced by the client name
    pub benefit: &'static str,
}

/// Techniques in recommendation priority order (highest first)
pub const TECHNIQUE_PRIORITY: &[TechniqueEntry] = &[
    TechniqueEntry {
        method: DiscoveryMethod::Interview,
        name: "Customer Interviews",
        benefit: "Structured conversations would give {client} first-hand evidence of the problems customers actually face.",
    },
    TechniqueEntry {
        method: DiscoveryMethod::PrototypeTesting,
        name: "Prototype Testing",
        benefit: "Putting low-fidelity prototypes in front of users would let {client} test riskiest assumptions before committing engineering effort.",
    },
    TechniqueEntry {
        method: DiscoveryMethod::Observation,
        name: "Contextual Observation",
        benefit: "Watching users in their real environment would reveal workarounds {client} cannot learn from interviews alone.",
    },
    TechniqueEntry {
        method: DiscoveryMethod::DataAnalysis,
        name: "Data Analysis",
        benefit: "Analysing existing usage data would give {client} baselines to measure outcomes against.",
    },
    TechniqueEntry {
        method: DiscoveryMethod::Experiment,
        name: "Experiments & A/B Tests",
        benefit: "Small controlled experiments would let {client} validate hypotheses with real behaviour instead of opinions.",
    },
    TechniqueEntry {
        method: DiscoveryMethod::Survey,
        name: "Surveys",
        benefit: "A short survey would help {client} check whether interview findings hold across a larger population.",
    },
    TechniqueEntry {
        method: DiscoveryMethod::Workshop,
        name: "Collaborative Workshops",
        benefit: "A facilitated workshop would align the {client} team on goals, risks and success measures.",
    },
    TechniqueEntry {
        method: DiscoveryMethod::DocumentReview,
        name: "Document Review",
        benefit: "Reviewing existing research, support tickets and strategy documents would help {client} avoid rediscovering what is already known.",
    },
];

/// All methods whose keywords appear in `text` (case-insensitive)
pub fn detect_methods(text: &str) -> BTreeSet<DiscoveryMethod> {
    let lower = text.to_lowercase();
    METHOD_KEYWORDS
        .iter()
        .filter(|(keyword, _)| lower.contains(keyword))
        .map(|(_, method)| *method)
        .collect()
}

/// Signals present in `text`, each reported once
pub fn detect_signals(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    MATURITY_SIGNALS
        .iter()
        .filter(|(signal, _)| lower.contains(signal))
        .map(|(signal, _)| *signal)
        .collect()
}

/// Weight of a signal from `MATURITY_SIGNALS`
pub fn signal_weight(signal: &str) -> u32 {
    MATURITY_SIGNALS
        .iter()
        .find(|(s, _)| *s == signal)
        .map(|(_, weight)| *weight)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_methods_case_insensitive() {
        let methods = detect_methods("Ran a SURVEY after three customer Interviews");
        assert!(methods.contains(&DiscoveryMethod::Survey));
        assert!(methods.contains(&DiscoveryMethod::Interview));
        assert_eq!(methods.len(), 2);
    }

    #[test]
    fn test_detect_methods_none() {
        assert!(detect_methods("Nothing to see here").is_empty());
    }

    #[test]
    fn test_detect_signals_reports_each_once() {
        let signals = detect_signals("Assumption one. Another assumption. We will validate.");
        assert_eq!(signals, vec!["assumption", "validate"]);
    }

    #[test]
    fn test_signal_weight_lookup() {
        assert_eq!(signal_weight("hypothes"), 6);
        assert_eq!(signal_weight("unknown"), 0);
    }

    #[test]
    fn test_every_method_has_a_technique() {
        for method in DiscoveryMethod::all() {
            assert!(
                TECHNIQUE_PRIORITY.iter().any(|t| t.method == *method),
                "missing {:?}",
                method
            );
        }
        assert_eq!(TECHNIQUE_PRIORITY.len(), DiscoveryMethod::all().len());
    }

    #[test]
    fn test_every_benefit_mentions_client() {
        for technique in TECHNIQUE_PRIORITY {
            assert!(technique.benefit.contains("{client}"), "{}", technique.name);
        }
    }
}
