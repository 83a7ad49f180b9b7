/*!
Candidate matching: scanning a text for occurrences of gazetteer entries and a handful of
multi-token stem patterns. The matcher is intentionally permissive. It emits every hit it finds,
including hits that overlap each other; deduplication and conflict resolution are the resolver's
job, and the output order carries no meaning.
*/
use crate::gazetteer::Gazetteer;
use crate::span::{Candidate, Label, Span};

/// A multi-token pattern matched by case-insensitive stem prefix per token. This is the
/// dictionary-free counterpart of lemma matching: the stem "europäisch" covers "Europäische",
/// "Europäischen" and so on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LemmaPattern {
    pub label: Label,
    pub stems: Vec<String>,
}

impl LemmaPattern {
    pub fn new(label: Label, stems: &[&str]) -> Self {
        LemmaPattern {
            label,
            stems: stems.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The patterns the rule-based annotator ships with: inflected EU institution names and the
/// parliamentary chambers and offices that appear in running text in declined forms.
pub fn default_patterns() -> Vec<LemmaPattern> {
    let mut patterns = vec![
        LemmaPattern::new(Label::Organization, &["europäisch", "Kommission"]),
        LemmaPattern::new(Label::Organization, &["europäisch", "Union"]),
        LemmaPattern::new(Label::Organization, &["europäisch", "Rat"]),
        LemmaPattern::new(Label::Organization, &["europäisch", "Parlament"]),
    ];
    for stem in [
        "Nationalrat",
        "Bundesrat",
        "Parlament",
        "Bundesregierung",
        "Bundeskanzleramt",
        "Bundespräsident",
        "Bundesversammlung",
    ] {
        patterns.push(LemmaPattern::new(Label::Organization, &[stem]));
    }
    patterns
}

/// Scans `text` for every gazetteer entry and every pattern, producing raw candidates with
/// offsets into the original text. Matching is case-insensitive and anchored at word boundaries,
/// so "Wien" does not fire inside "Wiener".
pub fn find_candidates(
    text: &str,
    gazetteer: &Gazetteer,
    patterns: &[LemmaPattern],
) -> Vec<Candidate> {
    let folded = FoldedText::new(text);
    let words = word_ranges(text);
    let mut out = Vec::new();
    for (entry, label) in gazetteer.entries() {
        folded.push_phrase_matches(entry, label, text, &mut out);
    }
    for pattern in patterns {
        push_pattern_matches(text, pattern, &words, &mut out);
    }
    out
}

/// A lowercase copy of the text plus a per-byte map back to the original byte offsets. Folding
/// can change byte lengths ("İ" folds to two characters), so matches found in the folded text
/// must be projected through the map before becoming spans.
struct FoldedText {
    folded: String,
    offsets: Vec<usize>,
}

impl FoldedText {
    fn new(text: &str) -> Self {
        let mut folded = String::with_capacity(text.len());
        let mut offsets = Vec::with_capacity(text.len());
        for (index, ch) in text.char_indices() {
            for low in ch.to_lowercase() {
                let before = folded.len();
                folded.push(low);
                for _ in before..folded.len() {
                    offsets.push(index);
                }
            }
        }
        FoldedText { folded, offsets }
    }

    /// Appends every whole-word occurrence of `entry` to `out`.
    fn push_phrase_matches(
        &self,
        entry: &str,
        label: Label,
        source: &str,
        out: &mut Vec<Candidate>,
    ) {
        let needle = entry.trim().to_lowercase();
        if needle.is_empty() {
            return;
        }
        let hay = self.folded.as_str();
        let mut from = 0;
        while let Some(found) = hay[from..].find(&needle) {
            let begin = from + found;
            let end = begin + needle.len();
            from = end;
            if !self.is_word_bounded(begin, end) {
                continue;
            }
            // A hit must not start or stop inside the folded expansion of one source character.
            if begin > 0 && self.offsets[begin] == self.offsets[begin - 1] {
                continue;
            }
            if end < self.offsets.len() && self.offsets[end] == self.offsets[end - 1] {
                continue;
            }
            let start = self.offsets[begin];
            let stop = if end < self.offsets.len() {
                self.offsets[end]
            } else {
                source.len()
            };
            out.push(Candidate::new(Span::new(
                &source[start..stop],
                label,
                start,
                stop,
            )));
        }
    }

    fn is_word_bounded(&self, begin: usize, end: usize) -> bool {
        let left = self.folded[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let right = self.folded[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        left && right
    }
}

/// Byte ranges of the alphanumeric word runs in `text`.
fn word_ranges(text: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut start = None;
    for (index, ch) in text.char_indices() {
        if ch.is_alphanumeric() {
            if start.is_none() {
                start = Some(index);
            }
        } else if let Some(s) = start.take() {
            out.push((s, index));
        }
    }
    if let Some(s) = start {
        out.push((s, text.len()));
    }
    out
}

fn push_pattern_matches(
    text: &str,
    pattern: &LemmaPattern,
    words: &[(usize, usize)],
    out: &mut Vec<Candidate>,
) {
    if pattern.stems.is_empty() {
        return;
    }
    let stems: Vec<String> = pattern.stems.iter().map(|s| s.to_lowercase()).collect();
    for window in words.windows(stems.len()) {
        let matches = window
            .iter()
            .zip(&stems)
            .all(|(&(begin, end), stem)| text[begin..end].to_lowercase().starts_with(stem));
        if matches {
            let start = window[0].0;
            let stop = window[stems.len() - 1].1;
            out.push(Candidate::new(Span::new(
                &text[start..stop],
                pattern.label,
                start,
                stop,
            )));
        }
    }
}
