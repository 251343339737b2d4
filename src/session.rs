use std::time::Duration;

use tracing::debug;

use crate::words::WordList;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    Finished,
}

/// Why a session stopped accepting input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum FinishReason {
    #[strum(to_string = "Time's up!")]
    TimeUp,
    #[strum(to_string = "All words typed!")]
    WordsExhausted,
    #[strum(to_string = "Aborted")]
    Aborted,
}

/// Display status of a single target word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordStyle {
    Correct,
    Incorrect,
    Active,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordView {
    pub text: String,
    pub style: WordStyle,
}

/// State of one typing test.
///
/// `committed_words` and `correctness` always hold exactly `target_index`
/// entries. Every transition is a no-op once [`SessionState::is_finished`]
/// reports true.
#[derive(Debug, Clone)]
pub struct SessionState {
    words: WordList,
    target_index: usize,
    committed_words: Vec<String>,
    correctness: Vec<bool>,
    input_buffer: String,
    elapsed: Duration,
    time_limit: Duration,
}

impl SessionState {
    pub fn new(words: WordList, time_limit: Duration) -> Self {
        Self {
            words,
            target_index: 0,
            committed_words: Vec::new(),
            correctness: Vec::new(),
            input_buffer: String::new(),
            elapsed: Duration::ZERO,
            time_limit,
        }
    }

    pub fn words(&self) -> &WordList {
        &self.words
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn committed_words(&self) -> &[String] {
        &self.committed_words
    }

    /// Judgment for a submitted word; `None` for the active word and beyond.
    pub fn correctness(&self, idx: usize) -> Option<bool> {
        self.correctness.get(idx).copied()
    }

    pub fn correct_count(&self, upto: usize) -> usize {
        self.correctness.iter().take(upto).filter(|&&ok| ok).count()
    }

    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    /// Whole seconds left on the clock, never negative.
    pub fn seconds_remaining(&self) -> u64 {
        self.time_limit.saturating_sub(self.elapsed).as_secs()
    }

    pub fn status(&self) -> SessionStatus {
        if self.is_finished() {
            SessionStatus::Finished
        } else {
            SessionStatus::Running
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.time_limit || self.target_index == self.words.len()
    }

    /// Word-list exhaustion wins over the timer when both hold.
    pub fn finish_reason(&self) -> Option<FinishReason> {
        if self.target_index == self.words.len() {
            Some(FinishReason::WordsExhausted)
        } else if self.elapsed >= self.time_limit {
            Some(FinishReason::TimeUp)
        } else {
            None
        }
    }

    /// Record the time read from the session clock. Ignored once finished,
    /// and never moves backwards.
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        if self.is_finished() {
            return;
        }
        self.elapsed = self.elapsed.max(elapsed);
    }

    pub fn submit_word(&mut self) {
        if self.is_finished() || self.input_buffer.is_empty() {
            return;
        }

        let typed = std::mem::take(&mut self.input_buffer);
        let correct = typed == self.words[self.target_index];
        debug!(
            index = self.target_index,
            typed = %typed,
            expected = &self.words[self.target_index],
            correct,
            "word_submitted"
        );

        self.committed_words.push(typed);
        self.correctness.push(correct);
        self.target_index += 1;
    }

    /// Append a printable glyph to the word in progress. Control characters
    /// are dropped.
    pub fn append_char(&mut self, c: char) {
        if self.is_finished() || c.is_control() {
            return;
        }
        self.input_buffer.push(c);
    }

    pub fn delete_back(&mut self) {
        if self.is_finished() {
            return;
        }

        if self.input_buffer.pop().is_some() {
            return;
        }

        if self.target_index == 0 {
            return;
        }

        // Step back into the previous word; its judgment is dropped until it
        // gets submitted again.
        if let Some(previous) = self.committed_words.pop() {
            self.target_index -= 1;
            self.correctness.truncate(self.target_index);
            debug!(index = self.target_index, restored = %previous, "word_reopened");
            self.input_buffer = previous;
        }
    }

    /// Every target word in order, with the text to show and its style.
    /// Submitted words show what was typed; the rest show the target.
    pub fn word_views(&self) -> Vec<WordView> {
        self.words
            .iter()
            .enumerate()
            .map(|(idx, target)| {
                if idx < self.target_index {
                    let style = match self.correctness(idx) {
                        Some(true) => WordStyle::Correct,
                        _ => WordStyle::Incorrect,
                    };
                    WordView {
                        text: self.committed_words[idx].clone(),
                        style,
                    }
                } else if idx == self.target_index {
                    WordView {
                        text: target.to_string(),
                        style: WordStyle::Active,
                    }
                } else {
                    WordView {
                        text: target.to_string(),
                        style: WordStyle::Pending,
                    }
                }
            })
            .collect()
    }
}
