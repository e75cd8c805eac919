//! Answer sequencing for a single registered question.

use bytes::Bytes;

/// The outcome of one [`AnswerSequencer::dispense`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispensed {
    /// Encoded answer bytes to write.
    pub answer: Bytes,
    /// Set when the question was asked more often than expected.
    pub overrun: Option<Overrun>,
}

/// Details of an overrun: the question was asked past its call limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overrun {
    /// Number of calls including the one that overran.
    pub calls: usize,
    /// The configured call limit.
    pub expected: usize,
}

/// Ordered answers for one question, and the policy for picking the next.
///
/// Answers are handed out in order. Once the list is exhausted the final
/// answer repeats indefinitely. A non-zero call limit flags every dispense
/// past the limit as an [`Overrun`]; those dispenses hand out the final
/// answer.
#[derive(Debug, Clone, Default)]
pub struct AnswerSequencer {
    answers: Vec<Bytes>,
    call_count: usize,
    expected_calls: usize,
    submit_override: Option<Bytes>,
}

impl AnswerSequencer {
    /// Create an empty sequencer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an encoded answer.
    pub fn push(&mut self, answer: impl Into<Bytes>) {
        self.answers.push(answer.into());
    }

    /// Append all answers of another sequencer, keeping this one's call count.
    ///
    /// The call limit and submit override of `other` replace this one's, even
    /// when `other` leaves them unset.
    pub fn merge(&mut self, other: Self) {
        self.answers.extend(other.answers);
        self.expected_calls = other.expected_calls;
        self.submit_override = other.submit_override;
    }

    /// Set the expected call limit; `0` means unlimited.
    pub fn set_expected_calls(&mut self, limit: usize) {
        self.expected_calls = limit;
    }

    /// Replace the default submit marker for this question.
    pub fn set_submit_override(&mut self, submit: impl Into<Bytes>) {
        self.submit_override = Some(submit.into());
    }

    /// Pick the next answer.
    ///
    /// Returns `None` only when no answers were ever registered.
    pub fn dispense(&mut self) -> Option<Dispensed> {
        let n = self.call_count;
        self.call_count += 1;

        let overrun = (self.expected_calls > 0 && n >= self.expected_calls).then_some(Overrun {
            calls: n + 1,
            expected: self.expected_calls,
        });

        let answer = if overrun.is_some() {
            self.answers.last()
        } else {
            self.answers.get(n).or_else(|| self.answers.last())
        }?
        .clone();

        Some(Dispensed { answer, overrun })
    }

    /// The submit marker to send after an answer.
    #[must_use]
    pub fn submit<'a>(&'a self, default: &'a Bytes) -> &'a Bytes {
        self.submit_override.as_ref().unwrap_or(default)
    }

    /// The registered answers, in order.
    #[must_use]
    pub fn answers(&self) -> &[Bytes] {
        &self.answers
    }

    /// Number of answers registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    /// Check if no answers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Number of times an answer has been dispensed.
    #[must_use]
    pub const fn call_count(&self) -> usize {
        self.call_count
    }

    /// The expected call limit (`0` when unlimited).
    #[must_use]
    pub const fn expected_calls(&self) -> usize {
        self.expected_calls
    }

    /// The submit override, if any.
    #[must_use]
    pub const fn submit_override(&self) -> Option<&Bytes> {
        self.submit_override.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequencer(answers: &[&'static str]) -> AnswerSequencer {
        let mut seq = AnswerSequencer::new();
        for answer in answers {
            seq.push(Bytes::from_static(answer.as_bytes()));
        }
        seq
    }

    #[test]
    fn dispenses_in_order_then_repeats_last() {
        let mut seq = sequencer(&["a", "b", "c"]);
        let picked: Vec<_> = (0..5).map(|_| seq.dispense().unwrap().answer).collect();
        assert_eq!(picked, ["a", "b", "c", "c", "c"]);
        assert_eq!(seq.call_count(), 5);
    }

    #[test]
    fn overrun_after_limit() {
        let mut seq = sequencer(&["left!"]);
        seq.set_expected_calls(1);

        let first = seq.dispense().unwrap();
        assert!(first.overrun.is_none());

        let second = seq.dispense().unwrap();
        assert_eq!(second.answer, "left!");
        assert_eq!(
            second.overrun,
            Some(Overrun {
                calls: 2,
                expected: 1
            })
        );
    }

    #[test]
    fn overrun_jumps_to_last_answer() {
        let mut seq = sequencer(&["a", "b", "c"]);
        seq.set_expected_calls(1);
        assert_eq!(seq.dispense().unwrap().answer, "a");

        let second = seq.dispense().unwrap();
        assert_eq!(second.answer, "c");
        assert!(second.overrun.is_some());

        let third = seq.dispense().unwrap();
        assert_eq!(third.answer, "c");
        assert_eq!(third.overrun.map(|o| o.calls), Some(3));
    }

    #[test]
    fn empty_sequencer_dispenses_nothing() {
        let mut seq = AnswerSequencer::new();
        assert!(seq.dispense().is_none());
        assert_eq!(seq.call_count(), 1);
    }

    #[test]
    fn merge_appends() {
        let mut seq = sequencer(&["yes"]);
        let mut more = sequencer(&["yes for sure"]);
        more.set_expected_calls(2);
        seq.merge(more);

        assert_eq!(seq.answers(), ["yes", "yes for sure"]);
        assert_eq!(seq.expected_calls(), 2);
    }

    #[test]
    fn merge_takes_newer_limit_and_submit() {
        let mut seq = sequencer(&["x"]);
        seq.set_expected_calls(1);
        seq.set_submit_override(Bytes::from_static(b"\r"));
        seq.merge(sequencer(&["y"]));

        assert_eq!(seq.expected_calls(), 0);
        assert!(seq.submit_override().is_none());
    }

    #[test]
    fn submit_override_wins() {
        let default = Bytes::from_static(b"\r\n");
        let mut seq = sequencer(&["x"]);
        assert_eq!(seq.submit(&default), "\r\n");
        seq.set_submit_override(Bytes::from_static(b"\r"));
        assert_eq!(seq.submit(&default), "\r");
    }
}
