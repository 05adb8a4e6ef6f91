//! Conversation hint extraction.
//!
//! [`KeywordContextExtractor`] scans the newest user turns first, then the
//! current query, which overrides anything found in history.

use regex::Regex;
use syl_core::conversation::{ContextNote, ConversationContext, Turn};
use syl_core::enums::{Role, Track};

use crate::error::SearchError;
use crate::vocabulary::{Term, Vocabulary};

/// The BSc top-up is a one-year course taken as year 3 after an FD, so a
/// BSc student with no stated year is in year 3.
pub const SINGLE_YEAR_TRACK: Track = Track::Bsc;
pub const SINGLE_YEAR_TRACK_YEAR: &str = "3";

/// Turns scanned when no explicit window is configured.
pub const DEFAULT_HISTORY_TURNS: usize = 6;

const YEAR_PATTERN: &str = r"(?i)\byear\s*([1-9])\b|\b([1-9])(?:st|nd|rd|th)?\s*year\b|\b(first|second|third)\s+year\b";

/// Derives a [`ConversationContext`] from a query and recent turns.
pub trait ContextStrategy: Send + Sync {
    /// Must be deterministic for identical input.
    fn extract(&self, query: &str, history: &[Turn]) -> ConversationContext;
}

#[derive(Debug)]
struct CompiledTerm {
    regex: Regex,
    canonical: String,
    len: usize,
}

impl CompiledTerm {
    fn compile(pattern: &str, canonical: &str) -> Result<Self, SearchError> {
        let words: Vec<String> = pattern.split_whitespace().map(regex::escape).collect();
        let regex = Regex::new(&format!(r"(?i)\b{}\b", words.join(r"\s+")))?;
        Ok(Self {
            regex,
            canonical: canonical.to_string(),
            len: pattern.chars().count(),
        })
    }
}

/// Picks the longest matching term; ties go to the earliest position.
fn best_match<'a, T>(
    terms: impl Iterator<Item = (&'a CompiledTerm, T)>,
    text: &str,
) -> Option<(&'a CompiledTerm, T)> {
    let mut best: Option<(usize, usize, &'a CompiledTerm, T)> = None;
    for (term, tag) in terms {
        let Some(found) = term.regex.find(text) else {
            continue;
        };
        let better = best
            .as_ref()
            .is_none_or(|(len, start, _, _)| term.len > *len || (term.len == *len && found.start() < *start));
        if better {
            best = Some((term.len, found.start(), term, tag));
        }
    }
    best.map(|(_, _, term, tag)| (term, tag))
}

/// Regex-backed [`ContextStrategy`] over a [`Vocabulary`].
#[derive(Debug)]
pub struct KeywordContextExtractor {
    tracks: Vec<(Track, CompiledTerm)>,
    modules: Vec<CompiledTerm>,
    assessments: Vec<CompiledTerm>,
    year: Regex,
    history_turns: usize,
}

impl KeywordContextExtractor {
    /// Compile the vocabulary. Stop-words are dropped from every table here.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Pattern`] if a pattern fails to compile.
    pub fn new(vocabulary: &Vocabulary, history_turns: usize) -> Result<Self, SearchError> {
        let compile_terms = |terms: &[Term]| -> Result<Vec<CompiledTerm>, SearchError> {
            terms
                .iter()
                .filter(|t| !vocabulary.is_stop_word(&t.pattern))
                .map(|t| CompiledTerm::compile(&t.pattern, &t.canonical))
                .collect()
        };

        let mut tracks = Vec::new();
        for (track, markers) in &vocabulary.track_markers {
            for marker in markers.iter().filter(|m| !vocabulary.is_stop_word(m)) {
                tracks.push((*track, CompiledTerm::compile(marker, track.as_str())?));
            }
        }

        Ok(Self {
            tracks,
            modules: compile_terms(&vocabulary.module_terms)?,
            assessments: compile_terms(&vocabulary.assessment_terms)?,
            year: Regex::new(YEAR_PATTERN)?,
            history_turns,
        })
    }

    /// Extractor over the built-in vocabulary.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Pattern`] if a pattern fails to compile.
    pub fn with_defaults(history_turns: usize) -> Result<Self, SearchError> {
        Self::new(&Vocabulary::default(), history_turns)
    }

    fn track_in(&self, text: &str) -> Option<Track> {
        best_match(self.tracks.iter().map(|(track, term)| (term, *track)), text)
            .map(|(_, track)| track)
    }

    fn module_in(&self, text: &str) -> Option<String> {
        best_match(self.modules.iter().map(|t| (t, ())), text).map(|(t, ())| t.canonical.clone())
    }

    fn assessment_in(&self, text: &str) -> Option<String> {
        best_match(self.assessments.iter().map(|t| (t, ())), text)
            .map(|(t, ())| t.canonical.clone())
    }

    fn year_in(&self, text: &str) -> Option<String> {
        let caps = self.year.captures(text)?;
        if let Some(digit) = caps.get(1).or_else(|| caps.get(2)) {
            return Some(digit.as_str().to_string());
        }
        let word = caps.get(3)?.as_str().to_lowercase();
        match word.as_str() {
            "first" => Some("1".into()),
            "second" => Some("2".into()),
            "third" => Some("3".into()),
            _ => None,
        }
    }

    /// Query value if present, else the newest history turn that has one.
    fn resolve<T>(
        query: &str,
        recent_user_turns: &[&Turn],
        find: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        find(query).or_else(|| recent_user_turns.iter().find_map(|turn| find(&turn.content)))
    }
}

impl ContextStrategy for KeywordContextExtractor {
    fn extract(&self, query: &str, history: &[Turn]) -> ConversationContext {
        let window = &history[history.len().saturating_sub(self.history_turns)..];
        let recent: Vec<&Turn> = window
            .iter()
            .rev()
            .filter(|turn| turn.role == Role::User)
            .collect();

        let track = Self::resolve(query, &recent, |text| self.track_in(text));
        let mut year = Self::resolve(query, &recent, |text| self.year_in(text));
        let module = Self::resolve(query, &recent, |text| self.module_in(text));
        let assessment = Self::resolve(query, &recent, |text| self.assessment_in(text));

        let mut notes = Vec::new();
        if track == Some(SINGLE_YEAR_TRACK) && year.is_none() {
            tracing::debug!(
                track = %SINGLE_YEAR_TRACK,
                year = SINGLE_YEAR_TRACK_YEAR,
                "no year given, applying single-year track default"
            );
            year = Some(SINGLE_YEAR_TRACK_YEAR.to_string());
            notes.push(ContextNote::YearDefaulted {
                track: SINGLE_YEAR_TRACK,
                year: SINGLE_YEAR_TRACK_YEAR.to_string(),
            });
        }

        ConversationContext {
            track,
            year,
            module,
            assessment,
            notes,
        }
    }
}
