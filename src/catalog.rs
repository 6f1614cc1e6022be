//! Question catalog
//!
//! The fixed, ordered discovery questionnaire. A `Catalog` is a plain value so
//! that tests and alternative questionnaires can build their own.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single questionnaire entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDefinition {
    /// Stable key (e.g. "q1")
    pub id: String,
    /// Discovery phase, 1-based
    pub phase: u8,
    /// Prompt shown to the coach
    pub prompt: String,
}

/// Ordered set of question definitions plus phase titles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    questions: Vec<QuestionDefinition>,
    phase_titles: BTreeMap<u8, String>,
}

/// Phase titles of the standard questionnaire
const STANDARD_PHASES: &[(u8, &str)] = &[
    (1, "Foundation & Context"),
    (2, "Success & Outcomes"),
    (3, "Users & Market"),
    (4, "Team Dynamics"),
    (5, "Assumptions & Risks"),
];

/// The standard LEA questionnaire, in catalog order
const STANDARD_QUESTIONS: &[(&str, u8, &str)] = &[
    ("q1", 1, "Why does this product exist?"),
    ("q2", 1, "Who experiences the problem?"),
    ("q3", 1, "What is the current way people solve this problem?"),
    ("q4", 1, "What triggered this initiative now?"),
    ("q5", 2, "What would good look like in three months?"),
    ("q6", 2, "What outcomes matter most to the business?"),
    ("q7", 2, "How will we know this worked?"),
    ("q8", 2, "What would make this initiative a failure?"),
    ("q9", 3, "Who are the primary and secondary users?"),
    ("q10", 3, "What jobs are users trying to get done?"),
    ("q11", 3, "What alternatives or competitors do users consider?"),
    ("q12", 3, "What do we know about how users buy or adopt tools like this?"),
    ("q13", 4, "What is the team's appetite for challenge and change?"),
    ("q14", 4, "How are product decisions made today?"),
    ("q15", 4, "Which skills or roles are missing from the team?"),
    ("q16", 4, "How does the team handle disagreement?"),
    ("q17", 5, "What must be true for this product to succeed?"),
    ("q18", 5, "What are the biggest delivery risks?"),
    ("q19", 5, "What technical constraints limit the solution?"),
    ("q20", 5, "What regulatory or compliance constraints apply?"),
    ("q21", 5, "Which assumptions have not been tested yet?"),
    ("q22", 5, "What evidence would change the current plan?"),
    ("q23", 5, "What dependencies on other teams exist?"),
    ("q24", 5, "What is the cost of being wrong?"),
    ("q25", 3, "Which user segments are underserved today?"),
    ("q26", 3, "What user research already exists?"),
    ("q27", 2, "Which metrics have a baseline today?"),
    ("q28", 2, "Who needs to see progress, and how often?"),
    ("q29", 4, "How does the team share what it learns?"),
    ("q30", 4, "How much autonomy does the team have over scope?"),
    ("q31", 4, "How are experiments prioritised against delivery work?"),
    ("q32", 4, "How often does the team interact directly with customers?"),
];

impl Catalog {
    /// Build a catalog from explicit definitions
    pub fn new(questions: Vec<QuestionDefinition>, phase_titles: BTreeMap<u8, String>) -> Self {
        Self {
            questions,
            phase_titles,
        }
    }

    /// The standard 32-question, 5-phase LEA questionnaire
    pub fn standard() -> Self {
        let questions = STANDARD_QUESTIONS
            .iter()
            .map(|(id, phase, prompt)| QuestionDefinition {
                id: id.to_string(),
                phase: *phase,
                prompt: prompt.to_string(),
            })
            .collect();

        let phase_titles = STANDARD_PHASES
            .iter()
            .map(|(phase, title)| (*phase, title.to_string()))
            .collect();

        Self::new(questions, phase_titles)
    }

    /// A catalog with no questions
    pub fn empty() -> Self {
        Self::new(Vec::new(), BTreeMap::new())
    }

    /// Questions in catalog order
    pub fn questions(&self) -> &[QuestionDefinition] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, question_id: &str) -> Option<&QuestionDefinition> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.get(question_id).is_some()
    }

    /// Distinct phases present in the catalog, ascending
    pub fn phases(&self) -> Vec<u8> {
        let mut phases: Vec<u8> = self.questions.iter().map(|q| q.phase).collect();
        phases.sort_unstable();
        phases.dedup();
        phases
    }

    /// Questions belonging to one phase, in catalog order
    pub fn questions_in_phase(&self, phase: u8) -> impl Iterator<Item = &QuestionDefinition> {
        self.questions.iter().filter(move |q| q.phase == phase)
    }

    /// Display title for a phase, falling back to "Phase N"
    pub fn phase_title(&self, phase: u8) -> String {
        self.phase_titles
            .get(&phase)
            .cloned()
            .unwrap_or_else(|| format!("Phase {}", phase))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
