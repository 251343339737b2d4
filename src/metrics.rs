use std::fmt;

use crate::session::SessionState;

/// Derived figures for a session. Recomputed from state on every use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub words_typed: usize,
    pub correct_words: usize,
    pub accuracy_percent: f64,
    pub wpm: f64,
}

impl Metrics {
    pub fn from_session(state: &SessionState) -> Self {
        let words_typed = state.committed_words().len().min(state.words().len());
        let correct_words = state.correct_count(words_typed);

        Self {
            words_typed,
            correct_words,
            accuracy_percent: accuracy_percent(state),
            wpm: wpm(state),
        }
    }

    /// Lines for the results screen, headline excluded.
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Words typed: {}", self.words_typed),
            format!("Correct words: {}", self.correct_words),
            format!("Accuracy: {:.2}%", self.accuracy_percent),
            format!("Words per minute: {:.2}", self.wpm),
        ]
    }
}

/// The live stats line shown under the word list.
impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Words: {} | Accuracy: {:.2}% | WPM: {:.2}",
            self.words_typed, self.accuracy_percent, self.wpm
        )
    }
}

pub fn accuracy_percent(state: &SessionState) -> f64 {
    let n = state.committed_words().len().min(state.words().len());
    if n == 0 {
        return 0.0;
    }
    100.0 * state.correct_count(n) as f64 / n as f64
}

/// Submitted words per minute, counting wrong words as well as right ones.
pub fn wpm(state: &SessionState) -> f64 {
    let minutes = state.elapsed().as_secs_f64() / 60.0;
    if minutes <= 0.0 {
        return 0.0;
    }
    state.committed_words().len() as f64 / minutes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::WordList;
    use std::time::Duration;

    fn typed(words: &str, input: &str, elapsed: Duration) -> SessionState {
        let mut s = SessionState::new(
            WordList::from_text(words).unwrap(),
            Duration::from_secs(30),
        );
        for c in input.chars() {
            if c == ' ' {
                s.submit_word();
            } else {
                s.append_char(c);
            }
        }
        s.set_elapsed(elapsed);
        s
    }

    #[test]
    fn empty_session_scores_zero() {
        let s = typed("the quick brown", "", Duration::ZERO);
        let m = Metrics::from_session(&s);
        assert_eq!(m.words_typed, 0);
        assert_eq!(m.accuracy_percent, 0.0);
        assert_eq!(m.wpm, 0.0);
    }

    #[test]
    fn timed_out_without_typing_scores_zero() {
        let s = typed("the quick brown", "", Duration::from_secs(30));
        assert!(s.is_finished());
        assert_eq!(accuracy_percent(&s), 0.0);
        assert_eq!(wpm(&s), 0.0);
    }

    #[test]
    fn accuracy_counts_correct_submitted_words() {
        let s = typed("the quick brown", "the quikc brown ", Duration::from_secs(10));
        let acc = accuracy_percent(&s);
        assert!((acc - 66.666_666).abs() < 1e-3);
        assert_eq!(Metrics::from_session(&s).correct_words, 2);
    }

    #[test]
    fn wpm_counts_every_submitted_word() {
        // three words in 30 seconds, one of them wrong
        let s = typed("a b c d", "a x c ", Duration::from_secs(30));
        assert!((wpm(&s) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn pending_input_does_not_count() {
        let s = typed("the quick", "the qui", Duration::from_secs(6));
        let m = Metrics::from_session(&s);
        assert_eq!(m.words_typed, 1);
        assert_eq!(m.accuracy_percent, 100.0);
        assert!((m.wpm - 10.0).abs() < 1e-9);
    }

    #[test]
    fn stats_line_format() {
        let s = typed("the quick brown fox", "the quikc brown ", Duration::from_secs(30));
        let line = Metrics::from_session(&s).to_string();
        assert_eq!(line, "Words: 3 | Accuracy: 66.67% | WPM: 6.00");
    }

    #[test]
    fn summary_lines_format() {
        let s = typed("the quick", "the ", Duration::from_secs(15));
        let lines = Metrics::from_session(&s).summary_lines();
        assert_eq!(
            lines,
            vec![
                "Words typed: 1",
                "Correct words: 1",
                "Accuracy: 100.00%",
                "Words per minute: 4.00",
            ]
        );
    }

    #[test]
    fn accuracy_stays_in_bounds() {
        for input in ["", "x ", "the ", "x y z ", "the quick brown "] {
            let s = typed("the quick brown", input, Duration::from_secs(1));
            let acc = accuracy_percent(&s);
            assert!((0.0..=100.0).contains(&acc), "{input:?} -> {acc}");
            assert!(wpm(&s) >= 0.0);
        }
    }
}
