// Discovery maturity classification

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::signals::{detect_signals, signal_weight};
use crate::catalog::Catalog;
use crate::models::{DiscoveryMethod, Session};

/// Points awarded for full coverage
const COVERAGE_POINTS: f64 = 50.0;
/// Points per distinct discovery method in use
const POINTS_PER_METHOD: u32 = 5;
/// Cap on lexical signal points
const MAX_SIGNAL_POINTS: u32 = 30;

const ADVANCED_THRESHOLD: u32 = 60;
const INTERMEDIATE_THRESHOLD: u32 = 25;

/// Qualitative maturity of a team's discovery practice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaturityLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl MaturityLevel {
    pub fn display_name(&self) -> &'static str {
        match self {
            MaturityLevel::Beginner => "Beginner",
            MaturityLevel::Intermediate => "Intermediate",
            MaturityLevel::Advanced => "Advanced",
        }
    }

    /// Canonical description shown in the summary
    pub fn description(&self) -> &'static str {
        match self {
            MaturityLevel::Beginner => {
                "Discovery is just getting started. Most decisions still rest on opinion, and findings come from a narrow set of sources."
            }
            MaturityLevel::Intermediate => {
                "The team gathers evidence from several sources and is beginning to name its assumptions, but validation is not yet routine."
            }
            MaturityLevel::Advanced => {
                "Discovery is a habit. The team tests hypotheses with varied methods and uses evidence to steer what it builds."
            }
        }
    }

    fn from_score(score: u32) -> Self {
        if score >= ADVANCED_THRESHOLD {
            MaturityLevel::Advanced
        } else if score >= INTERMEDIATE_THRESHOLD {
            MaturityLevel::Intermediate
        } else {
            MaturityLevel::Beginner
        }
    }
}

impl std::fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Score breakdown behind a maturity level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaturityAssessment {
    pub level: MaturityLevel,
    pub score: u32,
    pub coverage_points: u32,
    pub method_points: u32,
    pub signal_points: u32,
    pub signals: Vec<String>,
}

/// Method diversity points. Interview-only usage earns nothing.
fn method_points(methods: &BTreeSet<DiscoveryMethod>) -> u32 {
    let interview_only = methods.len() == 1 && methods.contains(&DiscoveryMethod::Interview);
    if interview_only {
        return 0;
    }
    methods.len() as u32 * POINTS_PER_METHOD
}

/// Full score breakdown for `session`
pub fn assess_maturity(catalog: &Catalog, session: &Session) -> MaturityAssessment {
    let coverage_points = if catalog.is_empty() {
        0
    } else {
        let answered = catalog
            .questions()
            .iter()
            .filter(|q| session.answer(&q.id).map_or(false, |r| r.is_answered()))
            .count();
        (COVERAGE_POINTS * answered as f64 / catalog.len() as f64).floor() as u32
    };

    let method_points = method_points(&session.methods_used());

    let findings: Vec<&str> = session
        .answers_in_order(catalog)
        .map(|(_, record)| record.findings.as_str())
        .collect();
    let signals = detect_signals(&findings.join("\n"));
    let signal_points = signals
        .iter()
        .map(|s| signal_weight(s))
        .sum::<u32>()
        .min(MAX_SIGNAL_POINTS);

    let score = coverage_points + method_points + signal_points;

    MaturityAssessment {
        level: MaturityLevel::from_score(score),
        score,
        coverage_points,
        method_points,
        signal_points,
        signals: signals.into_iter().map(String::from).collect(),
    }
}

/// Maturity level of `session`
pub fn compute_maturity(catalog: &Catalog, session: &Session) -> MaturityLevel {
    assess_maturity(catalog, session).level
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerStatus;

    fn answer(session: &mut Session, id: &str, findings: &str, methods: &[DiscoveryMethod]) {
        let record = session.answer_mut(id).unwrap();
        record.status = AnswerStatus::Answered;
        record.findings = findings.to_string();
        record.discovery_methods.extend(methods.iter().copied());
    }

    #[test]
    fn test_empty_session_is_beginner() {
        let catalog = Catalog::standard();
        let session = Session::new(&catalog);

        let assessment = assess_maturity(&catalog, &session);
        assert_eq!(assessment.level, MaturityLevel::Beginner);
        assert_eq!(assessment.score, 0);
    }

    #[test]
    fn test_empty_catalog_does_not_panic() {
        let catalog = Catalog::empty();
        let session = Session::new(&catalog);
        assert_eq!(compute_maturity(&catalog, &session), MaturityLevel::Beginner);
    }

    #[test]
    fn test_interview_only_scores_no_diversity() {
        let mut methods = BTreeSet::new();
        assert_eq!(method_points(&methods), 0);

        methods.insert(DiscoveryMethod::Interview);
        assert_eq!(method_points(&methods), 0);

        methods.insert(DiscoveryMethod::Survey);
        assert_eq!(method_points(&methods), 10);
    }

    #[test]
    fn test_signals_raise_score() {
        let catalog = Catalog::standard();
        let mut plain = Session::new(&catalog);
        answer(&mut plain, "q1", "We build invoices.", &[]);

        let mut rich = plain.clone();
        answer(
            &mut rich,
            "q1",
            "Key assumption: users trust extraction. We will validate the hypothesis.",
            &[],
        );

        let plain_score = assess_maturity(&catalog, &plain).score;
        let rich = assess_maturity(&catalog, &rich);
        assert!(rich.score > plain_score);
        assert_eq!(rich.signals, vec!["assumption", "hypothes", "validate"]);
    }

    #[test]
    fn test_signal_points_are_capped() {
        let catalog = Catalog::standard();
        let mut session = Session::new(&catalog);
        answer(
            &mut session,
            "q21",
            "assumption hypothesis validate experiment a/b test prototype metric baseline evidence learning",
            &[],
        );

        let assessment = assess_maturity(&catalog, &session);
        assert_eq!(assessment.signal_points, MAX_SIGNAL_POINTS);
    }

    #[test]
    fn test_monotone_in_coverage_and_methods() {
        let catalog = Catalog::standard();
        let mut session = Session::new(&catalog);
        let mut previous = compute_maturity(&catalog, &session);

        for (i, question) in catalog.questions().iter().enumerate() {
            let method = DiscoveryMethod::all()[i % DiscoveryMethod::all().len()];
            answer(&mut session, &question.id, "", &[method]);

            let level = compute_maturity(&catalog, &session);
            assert!(level >= previous, "level dropped at {}", question.id);
            previous = level;
        }

        assert_eq!(previous, MaturityLevel::Advanced);
    }

    #[test]
    fn test_is_deterministic() {
        let catalog = Catalog::standard();
        let mut session = Session::new(&catalog);
        answer(&mut session, "q5", "Baseline metric agreed", &[DiscoveryMethod::Workshop]);

        assert_eq!(
            assess_maturity(&catalog, &session),
            assess_maturity(&catalog, &session)
        );
    }

    #[test]
    fn test_level_descriptions_are_distinct() {
        let levels = [
            MaturityLevel::Beginner,
            MaturityLevel::Intermediate,
            MaturityLevel::Advanced,
        ];
        for a in &levels {
            for b in &levels {
                if a != b {
                    assert_ne!(a.description(), b.description());
                }
            }
        }
    }
}
