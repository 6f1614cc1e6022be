//! Markdown discovery-notes import
//!
//! Coaches often keep notes as a Markdown file rather than in the app:
//!
//! ```text
//! **Date**: 2024-03-14
//! **Project**: Acme Invoicing
//! **Participants**: Jordan Lee
//!
//! ### ✅ Q1: What problem are we solving?
//! - Finance teams re-key 400 invoices a week
//! - **Methods**: interview, survey
//!
//! ### 🟡 Q2: Who experiences it?
//! - AP clerks at mid-size firms
//! ```
//!
//! Each line is classified on its own and fed to a small state machine.
//! Nothing in a Markdown document is an error: lines that match no rule
//! are skipped and header values that cannot be read keep their old value.

use chrono::NaiveDate;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use super::json::parse_engagement_date;
use super::{reconcile, DocumentFormat, ImportOutcome};
use crate::analysis::detect_methods;
use crate::catalog::Catalog;
use crate::models::{AnswerRecord, AnswerStatus, DiscoveryMethod, MetadataPatch, Session};

/// Prefix kept on findings of partially answered questions
pub const PARTIAL_PREFIX: &str = "(Partial)";

// ============================================================================
// Line classification
// ============================================================================

static HEADER_PATTERN: OnceLock<Regex> = OnceLock::new();
static OPENER_PATTERN: OnceLock<Regex> = OnceLock::new();
static LABELLED_BULLET_PATTERN: OnceLock<Regex> = OnceLock::new();
static BULLET_PATTERN: OnceLock<Regex> = OnceLock::new();
static HEADING_PATTERN: OnceLock<Regex> = OnceLock::new();

fn get_header_pattern() -> &'static Regex {
    HEADER_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*\*\*\s*(date|project|participants|coach)\s*:?\s*\*\*\s*:?\s*(.*?)\s*$")
            .unwrap()
    })
}

fn get_opener_pattern() -> &'static Regex {
    OPENER_PATTERN.get_or_init(|| {
        Regex::new(
            r"^\s*(?:#{1,6}\s+|[-*]\s+)?(✅|🟡|🔶|⬜|❌|\[[xX~ ]\])\x{FE0F}?\s*\**\s*[Qq](\d+)\b",
        )
        .unwrap()
    })
}

fn get_labelled_bullet_pattern() -> &'static Regex {
    LABELLED_BULLET_PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)^\s*[-*]\s+\**\s*(discovery methods|methods|notes)(?:\s*:\s*\*\*|\s*\*\*\s*:|\s*:)\s*(.*?)\s*$",
        )
        .unwrap()
    })
}

fn get_bullet_pattern() -> &'static Regex {
    BULLET_PATTERN.get_or_init(|| Regex::new(r"^\s*[-*]\s+(.*?)\s*$").unwrap())
}

fn get_heading_pattern() -> &'static Regex {
    HEADING_PATTERN.get_or_init(|| Regex::new(r"^\s*#{1,6}\s").unwrap())
}

/// Status marker in front of a question identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGlyph {
    Complete,
    Partial,
    NotStarted,
}

impl StatusGlyph {
    fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "✅" | "[x]" | "[X]" => Some(StatusGlyph::Complete),
            "🟡" | "🔶" | "[~]" => Some(StatusGlyph::Partial),
            "⬜" | "❌" | "[ ]" => Some(StatusGlyph::NotStarted),
            _ => None,
        }
    }

    pub fn status(&self) -> AnswerStatus {
        match self {
            StatusGlyph::Complete | StatusGlyph::Partial => AnswerStatus::Answered,
            StatusGlyph::NotStarted => AnswerStatus::Open,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Date,
    Project,
    Participants,
    Coach,
}

/// What a single line means, independent of context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Header(HeaderField, &'a str),
    QuestionOpener { glyph: StatusGlyph, question_id: String },
    Methods(&'a str),
    Notes(&'a str),
    Bullet(&'a str),
    Heading,
    Blank,
    Other,
}

/// Classify one line. Header fields are only recognized while `allow_header`.
pub fn classify_line(line: &str, allow_header: bool) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }

    if allow_header {
        if let Some(caps) = get_header_pattern().captures(line) {
            let field = match caps[1].to_lowercase().as_str() {
                "date" => HeaderField::Date,
                "project" => HeaderField::Project,
                "participants" => HeaderField::Participants,
                _ => HeaderField::Coach,
            };
            let value = caps.get(2).map_or("", |m| m.as_str());
            return LineKind::Header(field, value);
        }
    }

    if let Some(caps) = get_opener_pattern().captures(line) {
        if let Some(glyph) = StatusGlyph::from_marker(&caps[1]) {
            // Q01 and Q1 name the same question
            let number = caps[2].trim_start_matches('0');
            let number = if number.is_empty() { "0" } else { number };
            return LineKind::QuestionOpener {
                glyph,
                question_id: format!("q{}", number),
            };
        }
    }

    if let Some(caps) = get_labelled_bullet_pattern().captures(line) {
        let value = caps.get(2).map_or("", |m| m.as_str());
        return if caps[1].eq_ignore_ascii_case("notes") {
            LineKind::Notes(value)
        } else {
            LineKind::Methods(value)
        };
    }

    if let Some(caps) = get_bullet_pattern().captures(line) {
        return LineKind::Bullet(caps.get(1).map_or("", |m| m.as_str()));
    }

    if get_heading_pattern().is_match(line) {
        return LineKind::Heading;
    }

    LineKind::Other
}

// ============================================================================
// State machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    SeekingHeader,
    SeekingQuestionBlock,
    InQuestionBlock,
}

/// Question block being collected
#[derive(Debug)]
struct OpenBlock {
    question_id: String,
    glyph: StatusGlyph,
    findings: Vec<String>,
    notes: Vec<String>,
    methods: BTreeSet<DiscoveryMethod>,
}

impl OpenBlock {
    fn new(question_id: String, glyph: StatusGlyph) -> Self {
        Self {
            question_id,
            glyph,
            findings: Vec::new(),
            notes: Vec::new(),
            methods: BTreeSet::new(),
        }
    }

    fn into_record(self) -> AnswerRecord {
        let mut findings = self.findings.join("\n");
        if self.glyph == StatusGlyph::Partial {
            findings = if findings.is_empty() {
                PARTIAL_PREFIX.to_string()
            } else {
                format!("{} {}", PARTIAL_PREFIX, findings)
            };
        }

        let mut discovery_methods = self.methods;
        discovery_methods.extend(detect_methods(&findings));

        AnswerRecord {
            question_id: self.question_id,
            findings,
            notes: self.notes.join("\n"),
            discovery_methods,
            status: self.glyph.status(),
            last_updated: None,
        }
    }
}

#[derive(Debug, Default)]
struct HeaderValues {
    date: Option<NaiveDate>,
    project: Option<String>,
    participants: Option<String>,
    coach: Option<String>,
}

impl HeaderValues {
    fn record(&mut self, field: HeaderField, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        match field {
            HeaderField::Date => match parse_header_date(value) {
                Some(date) => self.date = Some(date),
                None => log::warn!("Unreadable date '{}' in Markdown header; keeping current value", value),
            },
            HeaderField::Project => self.project = Some(value.to_string()),
            HeaderField::Participants => self.participants = Some(value.to_string()),
            HeaderField::Coach => self.coach = Some(value.to_string()),
        }
    }

    fn into_patch(self) -> MetadataPatch {
        MetadataPatch {
            client_name: self.project,
            coach_name: self.coach.or(self.participants),
            engagement_date: self.date,
            last_modified: None,
        }
    }
}

fn parse_header_date(value: &str) -> Option<NaiveDate> {
    parse_engagement_date(value).or_else(|| {
        ["%B %d, %Y", "%b %d, %Y", "%d %B %Y"]
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
    })
}

fn parse_method_tags(value: &str) -> BTreeSet<DiscoveryMethod> {
    value
        .split(|c| c == ',' || c == ';')
        .map(|tag| tag.trim().trim_matches('*').trim())
        .filter(|tag| !tag.is_empty())
        .filter_map(|tag| match tag.parse::<DiscoveryMethod>() {
            Ok(method) => Some(method),
            Err(e) => {
                log::debug!("{}; ignoring", e);
                None
            }
        })
        .collect()
}

/// Line-by-line parser over a Markdown document
struct MarkdownParser {
    state: ParserState,
    header: HeaderValues,
    block: Option<OpenBlock>,
    records: Vec<AnswerRecord>,
}

impl MarkdownParser {
    fn new() -> Self {
        Self {
            state: ParserState::SeekingHeader,
            header: HeaderValues::default(),
            block: None,
            records: Vec::new(),
        }
    }

    fn close_block(&mut self) {
        if let Some(block) = self.block.take() {
            self.records.push(block.into_record());
        }
    }

    fn feed(&mut self, line: &str) {
        let kind = classify_line(line, self.state == ParserState::SeekingHeader);

        match (self.state, kind) {
            (_, LineKind::QuestionOpener { glyph, question_id }) => {
                self.close_block();
                self.block = Some(OpenBlock::new(question_id, glyph));
                self.state = ParserState::InQuestionBlock;
            }
            (ParserState::SeekingHeader, LineKind::Header(field, value)) => {
                self.header.record(field, value);
            }
            (ParserState::SeekingHeader, LineKind::Heading) => {
                // The title heading may come before the header lines
                if self.header_seen() {
                    self.state = ParserState::SeekingQuestionBlock;
                }
            }
            (ParserState::InQuestionBlock, LineKind::Heading) => {
                self.close_block();
                self.state = ParserState::SeekingQuestionBlock;
            }
            (ParserState::InQuestionBlock, LineKind::Bullet(text)) => {
                if let Some(block) = self.block.as_mut() {
                    if !text.is_empty() {
                        block.findings.push(text.to_string());
                    }
                }
            }
            (ParserState::InQuestionBlock, LineKind::Methods(value)) => {
                if let Some(block) = self.block.as_mut() {
                    block.methods.extend(parse_method_tags(value));
                }
            }
            (ParserState::InQuestionBlock, LineKind::Notes(value)) => {
                if let Some(block) = self.block.as_mut() {
                    if !value.is_empty() {
                        block.notes.push(value.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    fn header_seen(&self) -> bool {
        self.header.date.is_some()
            || self.header.project.is_some()
            || self.header.participants.is_some()
            || self.header.coach.is_some()
    }

    fn finish(mut self) -> (MetadataPatch, Vec<AnswerRecord>) {
        self.close_block();
        (self.header.into_patch(), self.records)
    }
}

/// Import a Markdown discovery-notes document against the live session
pub fn import_markdown(catalog: &Catalog, current: &Session, text: &str) -> ImportOutcome {
    let mut parser = MarkdownParser::new();
    for line in text.lines() {
        parser.feed(line);
    }

    let (patch, records) = parser.finish();
    reconcile(catalog, current, patch, records, DocumentFormat::Markdown)
}
