//! Coverage and maturity analysis
//!
//! Pure functions of a `Session`: nothing here mutates state or touches storage.

pub mod coverage;
pub mod maturity;
pub mod signals;

pub use coverage::{compute_coverage, CoverageReport};
pub use maturity::{assess_maturity, compute_maturity, MaturityAssessment, MaturityLevel};
pub use signals::{detect_methods, TechniqueEntry, TECHNIQUE_PRIORITY};

use crate::models::Session;

/// Techniques for methods no record uses yet, in priority order
pub fn recommended_techniques(session: &Session) -> Vec<&'static TechniqueEntry> {
    let used = session.methods_used();
    TECHNIQUE_PRIORITY
        .iter()
        .filter(|t| !used.contains(&t.method))
        .collect()
}
