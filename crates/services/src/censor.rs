//! Masks banned words in user-facing text.

/// Replaces each configured word with `*` repeated to the word's length.
#[derive(Debug, Clone, Default)]
pub struct Censor {
    banned: Vec<String>,
}

impl Censor {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            banned: words
                .into_iter()
                .map(Into::into)
                .filter(|w: &String| !w.is_empty())
                .collect(),
        }
    }

    pub fn apply(&self, text: &str) -> String {
        self.banned.iter().fold(text.to_string(), |acc, word| {
            acc.replace(word.as_str(), &"*".repeat(word.chars().count()))
        })
    }
}
