//! Lightweight query-shape classification.
//!
//! Classification works on lowercase word tokens, so punctuation and casing
//! never change the outcome.

use syl_core::enums::EntityType;

const ASSESSMENT_WORDS: &[&str] = &[
    "assessment",
    "assessments",
    "assignment",
    "assignments",
    "coursework",
    "exam",
    "exams",
    "examination",
    "essay",
    "essays",
    "deadline",
    "deadlines",
    "due",
    "submit",
    "submission",
    "weighting",
    "presentation",
    "portfolio",
    "report",
];

const SCHEDULING_WORDS: &[&str] = &[
    "deadline",
    "deadlines",
    "due",
    "calendar",
    "week",
    "weeks",
    "schedule",
    "timetable",
    "term",
    "date",
    "dates",
];

const MODULE_LISTING_PHRASES: &[&str] = &[
    "what modules",
    "which modules",
    "list modules",
    "list the modules",
    "all modules",
    "all the modules",
    "modules in",
    "modules for",
    "modules do",
    "modules are",
];

const BROAD_PHRASES: &[&str] = &["deadline", "deadlines", "tell me", "show", "what are", "list"];

const COURSE_WORDS: &[&str] = &["course", "courses", "programme", "programmes", "program", "degree"];

const MODULE_WORDS: &[&str] = &["module", "modules"];

/// What a query appears to be about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct QueryIntent {
    /// Concerns assessments, deadlines or submissions.
    pub assessment: bool,
    /// Concerns dates, weeks or the academic calendar.
    pub scheduling: bool,
    /// Asks for the modules of a course rather than a single item.
    pub module_listing: bool,
    /// Exploratory wording such as "tell me" or "show".
    pub broad: bool,
    pub mentions_module: bool,
    pub mentions_course: bool,
}

impl QueryIntent {
    #[must_use]
    pub fn classify(query: &str) -> Self {
        let tokens = tokenize(query);
        let padded = format!(" {} ", tokens.join(" "));
        let has_word = |words: &[&str]| tokens.iter().any(|t| words.contains(&t.as_str()));
        let has_phrase = |phrases: &[&str]| phrases.iter().any(|p| padded.contains(&format!(" {p} ")));

        Self {
            assessment: has_word(ASSESSMENT_WORDS),
            scheduling: has_word(SCHEDULING_WORDS),
            module_listing: has_phrase(MODULE_LISTING_PHRASES),
            broad: has_phrase(BROAD_PHRASES),
            mentions_module: has_word(MODULE_WORDS),
            mentions_course: has_word(COURSE_WORDS),
        }
    }

    /// The entity type the query is asking about, if any.
    ///
    /// Assessment wording wins over module wording, which wins over course
    /// wording; a bare scheduling query asks about the calendar.
    #[must_use]
    pub const fn requested_type(&self) -> Option<EntityType> {
        if self.assessment {
            Some(EntityType::Assessment)
        } else if self.module_listing || self.mentions_module {
            Some(EntityType::Module)
        } else if self.mentions_course {
            Some(EntityType::Course)
        } else if self.scheduling {
            Some(EntityType::Calendar)
        } else {
            None
        }
    }
}

/// Lowercase alphanumeric tokens; apostrophes are dropped so "what's" is one token.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace(['\'', '\u{2019}'], "")
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("What's the deadline for Academic Research?", true, true)]
    #[case("When is the Databases exam?", true, false)]
    #[case("When is Databases taught?", false, false)]
    #[case("What date is the Databases exam?", true, true)]
    #[case("What happens in week 7?", false, true)]
    #[case("Who teaches Programming Fundamentals?", false, false)]
    fn assessment_and_scheduling(
        #[case] query: &str,
        #[case] assessment: bool,
        #[case] scheduling: bool,
    ) {
        let intent = QueryIntent::classify(query);
        assert_eq!(intent.assessment, assessment);
        assert_eq!(intent.scheduling, scheduling);
    }

    #[test]
    fn module_listing_needs_a_phrase() {
        assert!(QueryIntent::classify("What modules are in the FD Computing course?").module_listing);
        assert!(!QueryIntent::classify("Tell me about the networking module").module_listing);
    }

    #[test]
    fn broad_wording_is_detected() {
        assert!(QueryIntent::classify("Tell me about year 2").broad);
        assert!(QueryIntent::classify("show deadlines").broad);
        assert!(!QueryIntent::classify("Who leads Databases?").broad);
    }

    #[test]
    fn requested_type_prefers_assessments() {
        assert_eq!(
            QueryIntent::classify("module essay deadline").requested_type(),
            Some(EntityType::Assessment)
        );
        assert_eq!(
            QueryIntent::classify("Which modules are in year 1?").requested_type(),
            Some(EntityType::Module)
        );
        assert_eq!(
            QueryIntent::classify("What is the course about?").requested_type(),
            Some(EntityType::Course)
        );
        assert_eq!(QueryIntent::classify("hello").requested_type(), None);
    }

    #[test]
    fn tokenize_strips_punctuation_and_apostrophes() {
        assert_eq!(tokenize("What's  the DEADLINE?"), vec!["whats", "the", "deadline"]);
    }
}
