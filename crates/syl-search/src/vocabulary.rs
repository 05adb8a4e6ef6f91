//! Keyword tables used by the context extractor.
//!
//! Kept as data so deployments and tests can substitute their own tables.

use syl_core::enums::Track;

/// One vocabulary term and the canonical hint it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub pattern: String,
    pub canonical: String,
}

impl Term {
    #[must_use]
    pub fn new(pattern: &str, canonical: &str) -> Self {
        Self {
            pattern: pattern.to_lowercase(),
            canonical: canonical.to_string(),
        }
    }

    /// A term that is its own canonical form.
    #[must_use]
    pub fn same(pattern: &str) -> Self {
        Self::new(pattern, &pattern.to_lowercase())
    }
}

/// Track markers and domain nouns recognized in queries and history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub track_markers: Vec<(Track, Vec<String>)>,
    pub module_terms: Vec<Term>,
    pub assessment_terms: Vec<Term>,
    /// Words that never count as a hint even when a table contains them.
    pub stop_words: Vec<String>,
}

impl Vocabulary {
    /// A vocabulary with no terms at all.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            track_markers: Vec::new(),
            module_terms: Vec::new(),
            assessment_terms: Vec::new(),
            stop_words: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_track(mut self, track: Track, markers: &[&str]) -> Self {
        self.track_markers
            .push((track, markers.iter().map(|m| m.to_lowercase()).collect()));
        self
    }

    #[must_use]
    pub fn with_module_term(mut self, term: Term) -> Self {
        self.module_terms.push(term);
        self
    }

    #[must_use]
    pub fn with_assessment_term(mut self, term: Term) -> Self {
        self.assessment_terms.push(term);
        self
    }

    #[must_use]
    pub fn with_stop_words(mut self, words: &[&str]) -> Self {
        self.stop_words.extend(words.iter().map(|w| w.to_lowercase()));
        self
    }

    #[must_use]
    pub fn is_stop_word(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        self.stop_words.iter().any(|s| *s == word)
    }
}

impl Default for Vocabulary {
    /// Tables for the FD / BSc computing programmes.
    fn default() -> Self {
        let mut vocabulary = Self::empty()
            .with_track(Track::Fd, &["fd", "fdsc", "foundation degree", "foundation"])
            .with_track(Track::Bsc, &["bsc", "b.sc", "top-up", "top up", "topup", "honours"])
            .with_stop_words(&[
                "module", "modules", "course", "courses", "the", "a", "an", "and", "for", "of",
                "in", "on", "about", "what", "when", "which", "is", "are", "my", "me",
            ]);

        for module in [
            "academic research",
            "study skills",
            "research",
            "programming",
            "databases",
            "database",
            "networking",
            "networks",
            "web development",
            "software engineering",
            "cyber security",
            "security",
            "mathematics",
            "maths",
            "computer systems",
            "project management",
            "dissertation",
            "artificial intelligence",
            "data science",
        ] {
            vocabulary = vocabulary.with_module_term(Term::same(module));
        }

        for (pattern, canonical) in [
            ("exam", "exam"),
            ("exams", "exam"),
            ("examination", "exam"),
            ("test", "exam"),
            ("essay", "essay"),
            ("coursework", "coursework"),
            ("assignment", "coursework"),
            ("presentation", "presentation"),
            ("portfolio", "portfolio"),
            ("report", "report"),
            ("practical", "practical"),
            ("quiz", "quiz"),
        ] {
            vocabulary = vocabulary.with_assessment_term(Term::new(pattern, canonical));
        }

        vocabulary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_are_populated() {
        let vocabulary = Vocabulary::default();
        assert_eq!(vocabulary.track_markers.len(), 2);
        assert!(vocabulary.module_terms.iter().any(|t| t.pattern == "academic research"));
        assert!(
            vocabulary
                .assessment_terms
                .iter()
                .any(|t| t.pattern == "examination" && t.canonical == "exam")
        );
    }

    #[test]
    fn stop_words_are_case_insensitive() {
        let vocabulary = Vocabulary::empty().with_stop_words(&["Module"]);
        assert!(vocabulary.is_stop_word("MODULE"));
        assert!(!vocabulary.is_stop_word("databases"));
    }
}
