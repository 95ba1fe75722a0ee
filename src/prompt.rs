//! Operator confirmation provider
//!
//! The stages that gate on operator approval take this capability as a
//! parameter instead of reading standard input directly.

use std::io::{self, Write};

/// Ask a yes/no question, return the answer
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
}

/// Reads the answer from standard input, defaulting to "no"
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        print!("{} [y/N]: ", question);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let response = input.trim().to_lowercase();
        Ok(response == "y" || response == "yes")
    }
}

/// Answers yes to everything (--yes flag, unattended runs)
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _question: &str) -> io::Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::VecDeque;

    /// Replays scripted answers and records the questions asked
    pub struct ScriptedConfirm {
        answers: VecDeque<bool>,
        pub questions: Vec<String>,
    }

    impl ScriptedConfirm {
        pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                questions: Vec::new(),
            }
        }
    }

    impl Confirm for ScriptedConfirm {
        fn confirm(&mut self, question: &str) -> io::Result<bool> {
            self.questions.push(question.to_string());
            Ok(self
                .answers
                .pop_front()
                .expect("ScriptedConfirm ran out of answers"))
        }
    }
}
