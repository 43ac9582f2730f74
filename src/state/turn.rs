use crate::state::team::TeamId;

/// Outcome of one team's timed round.
///
/// Recording is idempotent: a word lands in at most one of the two lists, so a
/// retried network action cannot be counted twice. Once finalized the turn is frozen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    team_id: TeamId,
    correct_words: Vec<String>,
    missed_words: Vec<String>,
    time_taken_ms: Option<u64>,
}

impl Turn {
    /// Open a new turn for `team_id`.
    pub fn new(team_id: TeamId) -> Self {
        Self {
            team_id,
            correct_words: Vec::new(),
            missed_words: Vec::new(),
            time_taken_ms: None,
        }
    }

    /// Team playing this turn.
    pub fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Words guessed during the turn, in order.
    pub fn correct_words(&self) -> &[String] {
        &self.correct_words
    }

    /// Words skipped during the turn, in order.
    pub fn missed_words(&self) -> &[String] {
        &self.missed_words
    }

    /// Always the number of correct words.
    pub fn score(&self) -> usize {
        self.correct_words.len()
    }

    /// Time the round took, set when the turn is finalized.
    pub fn time_taken_ms(&self) -> Option<u64> {
        self.time_taken_ms
    }

    /// Whether the turn has been frozen.
    pub fn is_finalized(&self) -> bool {
        self.time_taken_ms.is_some()
    }

    /// Append `word` to the correct list unless it is already recorded.
    pub fn record_correct(&mut self, word: &str) -> bool {
        if !self.accepts(word) {
            return false;
        }
        self.correct_words.push(word.to_string());
        true
    }

    /// Append `word` to the missed list unless it is already recorded.
    pub fn record_missed(&mut self, word: &str) -> bool {
        if !self.accepts(word) {
            return false;
        }
        self.missed_words.push(word.to_string());
        true
    }

    /// Freeze the turn with the time the round took.
    pub fn finalize(&mut self, time_taken_ms: u64) {
        if self.time_taken_ms.is_none() {
            self.time_taken_ms = Some(time_taken_ms);
        }
    }

    fn accepts(&self, word: &str) -> bool {
        !self.is_finalized()
            && !self.correct_words.iter().any(|w| w == word)
            && !self.missed_words.iter().any(|w| w == word)
    }
}
