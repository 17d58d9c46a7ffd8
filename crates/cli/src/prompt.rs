//! Line input for the interactive menus.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Source of answers to menu prompts.
///
/// `None` means the input is closed (Ctrl-D, Ctrl-C or end of a script) and the current
/// menu should unwind.
pub trait Prompter {
    fn prompt(&mut self, label: &str) -> Option<String>;
}

/// Interactive prompter backed by a rustyline editor with in-memory history.
pub struct RustylinePrompter {
    editor: DefaultEditor,
}

impl RustylinePrompter {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl Prompter for RustylinePrompter {
    fn prompt(&mut self, label: &str) -> Option<String> {
        match self.editor.readline(label) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.trim()).ok();
                }
                Some(line)
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => None,
            Err(err) => {
                tracing::error!("readline error: {:?}", err);
                None
            }
        }
    }
}

/// Replays a fixed list of answers; used to drive the menus in tests.
#[cfg(test)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    pub labels: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            labels: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn prompt(&mut self, label: &str) -> Option<String> {
        self.labels.push(label.to_string());
        self.answers.pop_front()
    }
}
