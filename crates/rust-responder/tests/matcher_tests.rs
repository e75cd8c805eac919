//! Tests for question resolution.

use bytes::Bytes;
use proptest::prelude::*;
use rust_responder::{AnswerSequencer, MatchRule, QuestionMatcher};

fn one(answer: &'static str) -> AnswerSequencer {
    let mut seq = AnswerSequencer::new();
    seq.push(Bytes::from_static(answer.as_bytes()));
    seq
}

fn resolved_answer(matcher: &mut QuestionMatcher, line: &str) -> Option<Bytes> {
    matcher
        .resolve(line)
        .map(|q| q.sequencer().answers()[0].clone())
}

#[test]
fn full_precedence_chain() {
    let mut matcher = QuestionMatcher::new();
    matcher.register("colour", MatchRule::Regex, one("regex")).unwrap();
    matcher.register("colour", MatchRule::Substring, one("substring")).unwrap();
    matcher.register("colour?", MatchRule::Exact, one("exact")).unwrap();

    assert_eq!(resolved_answer(&mut matcher, "colour?").unwrap(), "exact");
    assert_eq!(resolved_answer(&mut matcher, "Favourite colour?").unwrap(), "substring");
    assert_eq!(resolved_answer(&mut matcher, "shape?"), None);
}

#[test]
fn earliest_registration_wins_within_a_table() {
    let mut matcher = QuestionMatcher::new();
    matcher.register("name", MatchRule::Substring, one("first")).unwrap();
    matcher.register("your name", MatchRule::Substring, one("second")).unwrap();

    assert_eq!(resolved_answer(&mut matcher, "What is your name?").unwrap(), "first");
}

#[test]
fn regex_is_compiled_once_per_pattern() {
    let mut matcher = QuestionMatcher::new();
    matcher.register(r"^\d+$", MatchRule::Regex, one("a")).unwrap();
    matcher.register(r"^\d+$", MatchRule::Regex, one("b")).unwrap();

    assert!(matcher.is_compiled(r"^\d+$"));
    assert_eq!(matcher.len(), 1);
    assert_eq!(resolved_answer(&mut matcher, "42").unwrap(), "a");
    assert_eq!(resolved_answer(&mut matcher, "4 2"), None);
}

#[test]
fn resolving_does_not_dispense() {
    let mut matcher = QuestionMatcher::new();
    matcher.register("q", MatchRule::Substring, one("a")).unwrap();

    matcher.resolve("q").unwrap();
    matcher.resolve("q").unwrap();
    assert_eq!(matcher.get("q", MatchRule::Substring).unwrap().sequencer().call_count(), 0);
}

proptest! {
    #[test]
    fn exact_key_never_matches_a_longer_line(
        key in "[a-z]{1,10}",
        prefix in "[ a-z]{0,5}",
        suffix in "[ a-z?]{1,5}",
    ) {
        let mut matcher = QuestionMatcher::new();
        matcher.register(key.clone(), MatchRule::Exact, one("x")).unwrap();

        prop_assert!(matcher.resolve(&key).is_some());
        let line = format!("{prefix}{key}{suffix}");
        prop_assert!(matcher.resolve(&line).is_none());
    }

    #[test]
    fn substring_key_matches_any_surrounding_text(
        key in "[a-z]{1,10}",
        prefix in "[ -~]{0,10}",
        suffix in "[ -~]{0,10}",
    ) {
        let mut matcher = QuestionMatcher::new();
        matcher.register(key.clone(), MatchRule::Substring, one("x")).unwrap();

        let line = format!("{prefix}{key}{suffix}");
        let question = matcher.resolve(&line);
        prop_assert!(question.is_some());
    }
}
