//! Words and the per-team word pool the game-master cycles through during a round.

use rand::{rng, seq::SliceRandom};

/// A guessable text item.
///
/// Two words with the same text are indistinguishable for matching purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    text: String,
    guessed: bool,
}

impl Word {
    /// Build a fresh, unguessed word.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            guessed: false,
        }
    }

    /// Text shown to the game-master.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether a team already guessed this word.
    pub fn is_guessed(&self) -> bool {
        self.guessed
    }

    /// Text equality check used by every lookup in the pool.
    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }
}

/// Ordered, shuffled collection of words with a cursor on the current one.
#[derive(Debug, Clone, Default)]
pub struct WordPool {
    words: Vec<Word>,
    current_index: usize,
}

impl WordPool {
    /// Build a pool from raw texts, shuffled once.
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pool = Self::default();
        pool.set_words(texts);
        pool
    }

    /// Replace the pool content.
    ///
    /// Words whose text survives the update keep their guessed flag, removed
    /// words are forgotten and new texts start unguessed. The resulting pool is
    /// shuffled and the cursor goes back to the first slot.
    pub fn set_words<I, S>(&mut self, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let previous = std::mem::take(&mut self.words);

        let mut words: Vec<Word> = texts
            .into_iter()
            .map(|text| {
                let text = text.into();
                let guessed = previous
                    .iter()
                    .any(|existing| existing.is(&text) && existing.guessed);
                Word { text, guessed }
            })
            .collect();

        if words.len() > 1 {
            words.shuffle(&mut rng());
        }

        self.words = words;
        self.current_index = 0;
    }

    /// All words in pool order.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Position of the current word, skipping guessed words forward.
    ///
    /// Falls back to the raw cursor when the pool is exhausted.
    pub fn current_index(&self) -> usize {
        self.current_position().unwrap_or(self.current_index)
    }

    /// First unguessed word at or after the cursor (circular), `None` once the pool is exhausted.
    pub fn current_word(&self) -> Option<&Word> {
        self.current_position().map(|index| &self.words[index])
    }

    /// Word that [`WordPool::next`] would move to, if it differs from the current one.
    pub fn peek_next(&self) -> Option<&Word> {
        let current = self.current_position()?;
        self.next_available(current)
            .filter(|&index| index != current)
            .map(|index| &self.words[index])
    }

    /// True when every word has been guessed (an empty pool counts as exhausted).
    pub fn is_exhausted(&self) -> bool {
        self.current_position().is_none()
    }

    /// Advance the cursor to the following unguessed word.
    ///
    /// When the scan wraps back to the current word without finding another
    /// candidate, the cursor stays where it is.
    pub fn next(&mut self) {
        let from = self.current_index();
        if let Some(next) = self.next_available(from) {
            self.current_index = next;
        }
    }

    /// Flag the first word matching `text` as guessed. Returns false when no word matches.
    pub fn mark_guessed(&mut self, text: &str) -> bool {
        self.set_guessed(text, true)
    }

    /// Clear the guessed flag of the first word matching `text`.
    ///
    /// This doubles as an undo for a word that was wrongly marked correct.
    pub fn mark_missed(&mut self, text: &str) -> bool {
        self.set_guessed(text, false)
    }

    /// Forget every guess and move the cursor back to the start, keeping the order.
    pub fn reset(&mut self) {
        self.words.iter_mut().for_each(|word| word.guessed = false);
        self.current_index = 0;
    }

    /// Texts of guessed words, in pool order.
    pub fn guessed_texts(&self) -> Vec<String> {
        self.texts_where(true)
    }

    /// Texts of words still to guess, in pool order.
    pub fn unguessed_texts(&self) -> Vec<String> {
        self.texts_where(false)
    }

    fn texts_where(&self, guessed: bool) -> Vec<String> {
        self.words
            .iter()
            .filter(|word| word.guessed == guessed)
            .map(|word| word.text.clone())
            .collect()
    }

    fn set_guessed(&mut self, text: &str, guessed: bool) -> bool {
        match self.words.iter_mut().find(|word| word.is(text)) {
            Some(word) => {
                word.guessed = guessed;
                true
            }
            None => false,
        }
    }

    fn current_position(&self) -> Option<usize> {
        let word = self.words.get(self.current_index)?;
        if !word.guessed {
            return Some(self.current_index);
        }
        self.next_available(self.current_index)
    }

    /// Circular scan starting after `from`; the last candidate checked is `from` itself.
    fn next_available(&self, from: usize) -> Option<usize> {
        let len = self.words.len();
        (1..=len)
            .map(|step| (from + step) % len)
            .find(|&index| !self.words[index].guessed)
    }
}
