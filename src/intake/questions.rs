//! Question tracking for the technical assessment.
//!
//! Questions are lifted out of numbered lists in the assistant's replies and
//! answers are paired with them purely by position: the next user message
//! answers the oldest question that has no answer yet.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::profile::Interview;

/// `N.` standing on its own, so `3.10` or `HTTP/1.1` never start a segment.
static NUMBER_MARKER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)\d+\.\s").ok());

/// Every numbered segment of `text` that reads as a question, in document
/// order. A segment runs from its `N.` marker to the next marker or the end
/// of the text.
pub fn extract_questions(text: &str) -> Vec<String> {
    let Some(marker) = NUMBER_MARKER.as_ref() else {
        return Vec::new();
    };

    let markers: Vec<_> = marker.find_iter(text).collect();
    markers
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let end = markers.get(i + 1).map_or(text.len(), |next| next.start());
            text[m.end()..end].trim()
        })
        .filter(|segment| segment.contains('?'))
        .map(String::from)
        .collect()
}

/// Appends the questions found in `assistant_text` that are not already on
/// record. Returns how many were added.
pub fn track(assistant_text: &str, interview: &mut Interview) -> usize {
    let mut added = 0;
    for question in extract_questions(assistant_text) {
        if interview.contains_question(&question) {
            continue;
        }
        debug!("Tracking question {}: {}", interview.questions().len() + 1, question);
        interview.push_question(question);
        added += 1;
    }
    added
}

/// Pairs `user_text` with the oldest unanswered question, if there is one.
pub fn record_answer(user_text: &str, interview: &mut Interview) -> bool {
    interview.push_answer(user_text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_numbered_questions_are_split() {
        let questions = extract_questions("1. What is REST? 2. Explain indexing?");
        assert_eq!(questions, vec!["What is REST?", "Explain indexing?"]);
    }

    #[test]
    fn segments_without_a_question_mark_are_ignored() {
        let text = "Great, here we go:\n1. Tell me about yourself.\n2. What is a closure?\n3. Thanks";
        assert_eq!(extract_questions(text), vec!["What is a closure?"]);
    }

    #[test]
    fn version_numbers_do_not_split_questions() {
        let text = "Great. 1. What changed in Python 3.10? 2. How does HTTP/1.1 keep-alive work?";
        assert_eq!(
            extract_questions(text),
            vec!["What changed in Python 3.10?", "How does HTTP/1.1 keep-alive work?"]
        );
    }

    #[test]
    fn decimals_inside_a_question_stay_attached() {
        let text = "1. Is 0.1 + 0.2 == 0.3 in floating point? 2. What does semver 1.2.3 promise?";
        assert_eq!(
            extract_questions(text),
            vec!["Is 0.1 + 0.2 == 0.3 in floating point?", "What does semver 1.2.3 promise?"]
        );
    }

    #[test]
    fn mislabeled_lists_keep_document_order() {
        let questions = extract_questions("3. Why Rust? 1. Why Go?");
        assert_eq!(questions, vec!["Why Rust?", "Why Go?"]);
    }

    #[test]
    fn answers_bind_positionally() {
        let mut interview = Interview::default();
        assert_eq!(track("1. What is REST? 2. Explain indexing?", &mut interview), 2);

        assert!(record_answer("Representational state transfer", &mut interview));
        assert!(record_answer("B-trees over columns", &mut interview));
        assert!(!record_answer("one more thing", &mut interview));

        let pairs: Vec<_> = interview.pairs().collect();
        assert_eq!(
            pairs,
            [
                ("What is REST?", Some("Representational state transfer")),
                ("Explain indexing?", Some("B-trees over columns")),
            ]
        );
    }

    #[test]
    fn repeated_questions_are_not_recorded_twice() {
        let mut interview = Interview::default();
        track("1. What is REST?", &mut interview);
        assert_eq!(track("Let me repeat: 1. What is REST? 2. What is gRPC?", &mut interview), 1);
        assert_eq!(interview.questions(), ["What is REST?", "What is gRPC?"]);
    }

    #[test]
    fn answers_never_outrun_questions() {
        let mut interview = Interview::default();
        let turns = [
            ("assistant", "1. A? 2. B?"),
            ("user", "a"),
            ("user", "b"),
            ("user", "c"),
            ("assistant", "3. C?"),
            ("user", "c"),
        ];
        for (speaker, text) in turns {
            match speaker {
                "assistant" => {
                    track(text, &mut interview);
                }
                _ => {
                    record_answer(text, &mut interview);
                }
            }
            assert!(interview.answered() <= interview.questions().len());
        }
        assert_eq!(interview.answered(), 3);
    }
}
