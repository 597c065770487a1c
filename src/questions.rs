//! Question bank
//!
//! Rooms draw their prompts from a [`QuestionProvider`] handed to them at
//! construction. The bundled implementation reads a JSON array of strings.

use rand::seq::SliceRandom;
use std::path::Path;

/// Errors that can occur while loading prompts
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read question file: {0}")]
    Io(#[from] std::io::Error),

    #[error("question file is not a JSON array of strings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Source of prompts for a match
pub trait QuestionProvider: Send + Sync {
    /// All prompts in their original order
    fn questions(&self) -> &[String];

    /// A freshly shuffled copy of the prompts. The original order is untouched.
    fn shuffled_copy(&self) -> Vec<String> {
        let mut deck = self.questions().to_vec();
        deck.shuffle(&mut rand::rng());
        deck
    }
}

/// Read prompts from a JSON file
pub fn load_questions(source: impl AsRef<Path>) -> Result<Vec<String>, LoadError> {
    let data = std::fs::read_to_string(source)?;
    Ok(serde_json::from_str(&data)?)
}

/// In-memory prompt list, usually loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<String>,
}

impl QuestionBank {
    pub fn load(source: impl AsRef<Path>) -> Result<Self, LoadError> {
        let source = source.as_ref();
        let questions = load_questions(source)?;
        tracing::info!(
            "Loaded {} questions from {}",
            questions.len(),
            source.display()
        );
        Ok(Self { questions })
    }

    pub fn from_questions(questions: Vec<String>) -> Self {
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl QuestionProvider for QuestionBank {
    fn questions(&self) -> &[String] {
        &self.questions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_questions_from_file() {
        let file = write_temp(r#"["What is your superpower?", "Who would you invite to dinner?"]"#);

        let bank = QuestionBank::load(file.path()).unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.questions()[0], "What is your superpower?");
    }

    #[test]
    fn test_load_empty_list_is_allowed() {
        let file = write_temp("[]");
        let bank = QuestionBank::load(file.path()).unwrap();
        assert!(bank.is_empty());
        assert!(bank.shuffled_copy().is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = QuestionBank::load(dir.path().join("nope.json"));
        assert!(matches!(result, Err(LoadError::Io(_))));
    }

    #[test]
    fn test_load_malformed_file() {
        for contents in [r#"{"questions": []}"#, "[1, 2, 3]", "not json"] {
            let file = write_temp(contents);
            let result = QuestionBank::load(file.path());
            assert!(matches!(result, Err(LoadError::Parse(_))), "{}", contents);
        }
    }

    #[test]
    fn test_shuffled_copy_keeps_original() {
        let original: Vec<String> = (0..20).map(|i| format!("q{}", i)).collect();
        let bank = QuestionBank::from_questions(original.clone());

        let mut deck = bank.shuffled_copy();
        assert_eq!(bank.questions(), original.as_slice());

        deck.sort();
        let mut expected = original;
        expected.sort();
        assert_eq!(deck, expected);
    }
}
