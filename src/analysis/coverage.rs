// Coverage statistics for a discovery session

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::models::Session;

/// Derived completion statistics; always recomputed, never stored as truth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub total_questions: usize,
    pub answered_questions: usize,
    /// 0-100, rounded to 2 decimals
    pub coverage_percentage: f64,
    /// Phase -> 0-100 percentage, for every phase in the catalog
    pub phase_completion: BTreeMap<u8, f64>,
}

impl CoverageReport {
    pub fn open_questions(&self) -> usize {
        self.total_questions - self.answered_questions
    }

    pub fn is_complete(&self) -> bool {
        self.total_questions > 0 && self.answered_questions == self.total_questions
    }
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of `part` in `total`; 0 when `total` is 0
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(100.0 * part as f64 / total as f64)
}

/// Compute coverage of `session` against `catalog`
pub fn compute_coverage(catalog: &Catalog, session: &Session) -> CoverageReport {
    let mut answered_questions = 0;
    let mut per_phase: BTreeMap<u8, (usize, usize)> = BTreeMap::new();

    for question in catalog.questions() {
        let answered = session
            .answer(&question.id)
            .map_or(false, |record| record.is_answered());

        let entry = per_phase.entry(question.phase).or_insert((0, 0));
        entry.1 += 1;
        if answered {
            entry.0 += 1;
            answered_questions += 1;
        }
    }

    let phase_completion = per_phase
        .into_iter()
        .map(|(phase, (answered, total))| (phase, percentage(answered, total)))
        .collect();

    CoverageReport {
        total_questions: catalog.len(),
        answered_questions,
        coverage_percentage: percentage(answered_questions, catalog.len()),
        phase_completion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerStatus;

    fn answer(session: &mut Session, id: &str) {
        session.answer_mut(id).unwrap().status = AnswerStatus::Answered;
    }

    #[test]
    fn test_empty_catalog_has_zero_coverage() {
        let catalog = Catalog::empty();
        let session = Session::new(&catalog);

        let report = compute_coverage(&catalog, &session);

        assert_eq!(report.total_questions, 0);
        assert_eq!(report.answered_questions, 0);
        assert_eq!(report.coverage_percentage, 0.0);
        assert!(report.phase_completion.is_empty());
        assert!(!report.is_complete());
    }

    #[test]
    fn test_fresh_session_has_every_phase_at_zero() {
        let catalog = Catalog::standard();
        let session = Session::new(&catalog);

        let report = compute_coverage(&catalog, &session);

        assert_eq!(report.total_questions, 32);
        assert_eq!(report.coverage_percentage, 0.0);
        assert_eq!(report.phase_completion.len(), 5);
        assert!(report.phase_completion.values().all(|p| *p == 0.0));
    }

    #[test]
    fn test_coverage_rounds_to_two_decimals() {
        let catalog = Catalog::standard();
        let mut session = Session::new(&catalog);
        answer(&mut session, "q1");

        let report = compute_coverage(&catalog, &session);

        // 1 / 32 = 3.125%
        assert_eq!(report.coverage_percentage, 3.13);
        // phase 1 has 4 questions
        assert_eq!(report.phase_completion[&1], 25.0);
        assert_eq!(report.open_questions(), 31);
    }

    #[test]
    fn test_phase_completion_thirds() {
        let catalog = Catalog::standard();
        let mut session = Session::new(&catalog);
        // phase 2 is q5-q8, q27, q28
        answer(&mut session, "q5");
        answer(&mut session, "q7");

        let report = compute_coverage(&catalog, &session);
        assert_eq!(report.phase_completion[&2], 33.33);
    }

    #[test]
    fn test_findings_without_status_do_not_count() {
        let catalog = Catalog::standard();
        let mut session = Session::new(&catalog);
        session.answer_mut("q2").unwrap().findings = "Some notes".to_string();

        let report = compute_coverage(&catalog, &session);
        assert_eq!(report.answered_questions, 0);
    }

    #[test]
    fn test_full_coverage() {
        let catalog = Catalog::standard();
        let mut session = Session::new(&catalog);
        for q in catalog.questions() {
            answer(&mut session, &q.id);
        }

        let report = compute_coverage(&catalog, &session);
        assert_eq!(report.coverage_percentage, 100.0);
        assert!(report.is_complete());
    }

    #[test]
    fn test_percentage_helper() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(3, 3), 100.0);
    }
}
