use uuid::Uuid;

use crate::state::word::WordPool;

/// Opaque team identifier, unique for the lifetime of a game.
pub type TeamId = Uuid;

/// Name given to freshly added teams.
pub const DEFAULT_TEAM_NAME: &str = "New Team";

/// A competing team with its own word pool.
#[derive(Debug, Clone)]
pub struct Team {
    id: TeamId,
    /// Display name chosen by the game-master.
    pub name: String,
    /// Set once a round of this team has been finalized, cleared when a new round starts.
    pub has_played: bool,
    /// Time spent by the last finalized round, in milliseconds.
    pub time_taken_ms: u64,
    pool: WordPool,
}

/// Score and word split of a team, as shown on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSummary {
    /// Number of guessed words in the pool.
    pub score: usize,
    /// Guessed words.
    pub correct_words: Vec<String>,
    /// Words that are still to guess.
    pub missed_words: Vec<String>,
}

impl Default for Team {
    fn default() -> Self {
        Self::new()
    }
}

impl Team {
    /// Create an empty team with a fresh identifier.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: DEFAULT_TEAM_NAME.to_string(),
            has_played: false,
            time_taken_ms: 0,
            pool: WordPool::default(),
        }
    }

    /// Immutable identifier.
    pub fn id(&self) -> TeamId {
        self.id
    }

    /// Word pool backing this team.
    pub fn pool(&self) -> &WordPool {
        &self.pool
    }

    /// Replace the word list, keeping guesses for words that survive.
    pub fn set_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pool.set_words(words);
    }

    /// Texts of every word in pool order.
    pub fn words(&self) -> Vec<String> {
        self.pool
            .words()
            .iter()
            .map(|word| word.text().to_string())
            .collect()
    }

    /// Word the team is currently trying to guess.
    pub fn current_word(&self) -> Option<&str> {
        self.pool.current_word().map(|word| word.text())
    }

    /// Word queued after the current one.
    pub fn preview_word(&self) -> Option<&str> {
        self.pool.peek_next().map(|word| word.text())
    }

    /// Move on to the next unguessed word.
    pub fn next_word(&mut self) {
        self.pool.next();
    }

    /// Mark `text` as guessed.
    pub fn guessed(&mut self, text: &str) -> bool {
        self.pool.mark_guessed(text)
    }

    /// Mark `text` as missed, clearing a previous guess.
    pub fn missed(&mut self, text: &str) -> bool {
        self.pool.mark_missed(text)
    }

    /// Number of guessed words.
    pub fn score(&self) -> usize {
        self.pool
            .words()
            .iter()
            .filter(|word| word.is_guessed())
            .count()
    }

    /// Leaderboard view of this team.
    pub fn summary(&self) -> TeamSummary {
        TeamSummary {
            score: self.score(),
            correct_words: self.pool.guessed_texts(),
            missed_words: self.pool.unguessed_texts(),
        }
    }

    /// Forget every guess and the play history.
    pub fn reset(&mut self) {
        self.pool.reset();
        self.has_played = false;
        self.time_taken_ms = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_team_has_default_name_and_no_words() {
        let team = Team::new();
        assert_eq!(team.name, DEFAULT_TEAM_NAME);
        assert!(team.current_word().is_none());
        assert_eq!(team.score(), 0);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(Team::new().id(), Team::new().id());
    }

    #[test]
    fn score_follows_word_list_updates() {
        let mut team = Team::new();
        team.set_words(["Apple", "Banana"]);
        team.guessed("Apple");
        assert_eq!(team.score(), 1);

        team.set_words(["Apple", "Cherry", "Date"]);
        assert_eq!(team.score(), 1);
        assert!(team.summary().correct_words.contains(&"Apple".to_string()));

        team.set_words(["Cherry", "Date"]);
        assert_eq!(team.score(), 0);
    }

    #[test]
    fn summary_splits_guessed_and_remaining_words() {
        let mut team = Team::new();
        team.set_words(["Apple", "Banana"]);
        team.guessed("Banana");

        let summary = team.summary();
        assert_eq!(summary.score, 1);
        assert_eq!(summary.correct_words, vec!["Banana".to_string()]);
        assert_eq!(summary.missed_words, vec!["Apple".to_string()]);
    }

    #[test]
    fn reset_clears_history() {
        let mut team = Team::new();
        team.set_words(["Apple"]);
        team.guessed("Apple");
        team.has_played = true;
        team.time_taken_ms = 1_500;

        team.reset();
        assert_eq!(team.score(), 0);
        assert!(!team.has_played);
        assert_eq!(team.time_taken_ms, 0);
        assert_eq!(team.current_word(), Some("Apple"));
    }
}
