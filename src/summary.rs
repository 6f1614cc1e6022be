//! Discovery summary generation
//!
//! `generate_summary` composes the narrative report shown to the client:
//! findings and gaps grouped by phase, technique recommendations for methods
//! the team has not used yet, and a maturity assessment. It is a pure
//! function of the session, so generating twice yields identical output.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analysis::{
    assess_maturity, compute_coverage, recommended_techniques, CoverageReport, MaturityAssessment,
};
use crate::catalog::Catalog;
use crate::models::{AnswerRecord, DiscoveryMethod, Session};

/// Placeholder replaced by the client name in technique benefits
const CLIENT_PLACEHOLDER: &str = "{client}";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionEntry {
    pub question_id: String,
    pub prompt: String,
    /// Empty for coverage gaps
    pub findings: String,
}

/// Entries of one phase
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSection {
    pub phase: u8,
    pub title: String,
    pub entries: Vec<QuestionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub method: DiscoveryMethod,
    pub technique: String,
    pub benefit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDocument {
    pub client_name: String,
    pub coach_name: String,
    pub engagement_date: Option<NaiveDate>,
    pub coverage: CoverageReport,
    pub key_findings: Vec<PhaseSection>,
    pub coverage_gaps: Vec<PhaseSection>,
    pub recommendations: Vec<Recommendation>,
    pub maturity: MaturityAssessment,
    pub maturity_description: String,
}

fn display_id(question_id: &str) -> String {
    question_id.to_uppercase()
}

/// Group catalog questions by phase, keeping those `pick` returns an entry for
fn phase_sections<F>(catalog: &Catalog, session: &Session, pick: F) -> Vec<PhaseSection>
where
    F: Fn(&AnswerRecord) -> Option<String>,
{
    catalog
        .phases()
        .into_iter()
        .filter_map(|phase| {
            let entries: Vec<QuestionEntry> = catalog
                .questions_in_phase(phase)
                .filter_map(|q| {
                    let record = session.answer(&q.id)?;
                    pick(record).map(|findings| QuestionEntry {
                        question_id: q.id.clone(),
                        prompt: q.prompt.clone(),
                        findings,
                    })
                })
                .collect();

            if entries.is_empty() {
                None
            } else {
                Some(PhaseSection {
                    phase,
                    title: catalog.phase_title(phase),
                    entries,
                })
            }
        })
        .collect()
}

/// Compose the summary report for `session`
pub fn generate_summary(catalog: &Catalog, session: &Session) -> SummaryDocument {
    let metadata = session.metadata();
    let client = metadata.client_display_name();

    let key_findings = phase_sections(catalog, session, |record| {
        (record.is_answered() && record.has_findings()).then(|| record.findings.trim().to_string())
    });
    let coverage_gaps = phase_sections(catalog, session, |record| {
        (!record.is_answered()).then(String::new)
    });

    let recommendations = recommended_techniques(session)
        .into_iter()
        .map(|t| Recommendation {
            method: t.method,
            technique: t.name.to_string(),
            benefit: t.benefit.replace(CLIENT_PLACEHOLDER, client),
        })
        .collect();

    let maturity = assess_maturity(catalog, session);

    SummaryDocument {
        client_name: client.to_string(),
        coach_name: metadata.coach_name.trim().to_string(),
        engagement_date: metadata.engagement_date,
        coverage: compute_coverage(catalog, session),
        key_findings,
        coverage_gaps,
        recommendations,
        maturity_description: maturity.level.description().to_string(),
        maturity,
    }
}

impl SummaryDocument {
    /// Keep only the first `max` recommendations
    pub fn limit_recommendations(mut self, max: usize) -> Self {
        self.recommendations.truncate(max);
        self
    }

    /// Render the report as Markdown
    pub fn to_markdown(&self) -> String {
        let mut content = String::new();

        content.push_str(&format!("# Discovery Summary: {}\n\n", self.client_name));
        if !self.coach_name.is_empty() {
            content.push_str(&format!("**Coach**: {}\n", self.coach_name));
        }
        if let Some(date) = self.engagement_date {
            content.push_str(&format!("**Date**: {}\n", date.format("%Y-%m-%d")));
        }
        content.push_str(&format!(
            "**Coverage**: {} of {} questions answered ({}%)\n",
            self.coverage.answered_questions,
            self.coverage.total_questions,
            self.coverage.coverage_percentage
        ));

        content.push_str("\n## Key Findings\n");
        if self.key_findings.is_empty() {
            content.push_str("\n_No findings recorded yet._\n");
        }
        for section in &self.key_findings {
            content.push_str(&format!("\n### Phase {}: {}\n", section.phase, section.title));
            for entry in &section.entries {
                content.push_str(&format!(
                    "\n**{}. {}**\n\n{}\n",
                    display_id(&entry.question_id),
                    entry.prompt,
                    entry.findings
                ));
            }
        }

        content.push_str("\n## Coverage Gaps\n");
        if self.coverage_gaps.is_empty() {
            content.push_str("\n_All questions answered._\n");
        }
        for section in &self.coverage_gaps {
            content.push_str(&format!("\n### Phase {}: {}\n\n", section.phase, section.title));
            for entry in &section.entries {
                content.push_str(&format!(
                    "- {}. {}\n",
                    display_id(&entry.question_id),
                    entry.prompt
                ));
            }
        }

        content.push_str("\n## Recommended Discovery Techniques\n");
        if self.recommendations.is_empty() {
            content.push_str("\n_Every discovery method is already in use._\n");
        }
        for recommendation in &self.recommendations {
            content.push_str(&format!(
                "\n### {}\n\n{}\n",
                recommendation.technique, recommendation.benefit
            ));
        }

        content.push_str("\n## Discovery Maturity\n\n");
        content.push_str(&format!("**Level**: {}\n\n", self.maturity.level));
        content.push_str(&format!("{}\n", self.maturity_description));

        content
    }
}
