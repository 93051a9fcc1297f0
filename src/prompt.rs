//! Interactive prompts.
//!
//! Every prompt returns a [`Prompt`] so that the user backing out (Esc,
//! Ctrl-C) is a value the caller matches on, not an error.

use std::io::ErrorKind;

use dialoguer::{Confirm, Input, MultiSelect, Select};

use crate::error::PromptError;

/// Outcome of a single prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt<T> {
    Answer(T),
    Cancelled,
}

impl<T> Prompt<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Prompt::Cancelled)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Prompt<U> {
        match self {
            Prompt::Answer(value) => Prompt::Answer(f(value)),
            Prompt::Cancelled => Prompt::Cancelled,
        }
    }
}

impl<T> From<Option<T>> for Prompt<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Prompt::Answer(v),
            None => Prompt::Cancelled,
        }
    }
}

/// The terminal questions the workflow can ask.
pub trait Prompter {
    /// Pick one item. `default` is the pre-highlighted index.
    fn select(&self, message: &str, items: &[String], default: usize)
    -> Result<Prompt<usize>, PromptError>;

    /// Pick any number of items. `checked` marks the pre-selected ones.
    fn multi_select(
        &self,
        message: &str,
        items: &[String],
        checked: &[bool],
    ) -> Result<Prompt<Vec<usize>>, PromptError>;

    /// Free text, pre-filled with `initial`. Empty answers are allowed.
    ///
    /// The terminal implementation cannot be escaped, so it only returns
    /// `Cancelled` on an interrupted read. Callers that need a way out ask
    /// a [`Prompter::confirm`] after an empty answer.
    fn input(&self, message: &str, initial: &str) -> Result<Prompt<String>, PromptError>;

    fn confirm(&self, message: &str, default: bool) -> Result<Prompt<bool>, PromptError>;

    /// Show a line of feedback to the user.
    fn notify(&self, message: &str);
}

/// [`Prompter`] backed by dialoguer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select(
        &self,
        message: &str,
        items: &[String],
        default: usize,
    ) -> Result<Prompt<usize>, PromptError> {
        let choice = Select::new()
            .with_prompt(message)
            .items(items)
            .default(default)
            .interact_opt();
        lift(choice)
    }

    fn multi_select(
        &self,
        message: &str,
        items: &[String],
        checked: &[bool],
    ) -> Result<Prompt<Vec<usize>>, PromptError> {
        let choice = MultiSelect::new()
            .with_prompt(message)
            .items(items)
            .defaults(checked)
            .interact_opt();
        lift(choice)
    }

    fn input(&self, message: &str, initial: &str) -> Result<Prompt<String>, PromptError> {
        let answer = Input::<String>::new()
            .with_prompt(message)
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text();
        lift(answer.map(Some))
    }

    fn confirm(&self, message: &str, default: bool) -> Result<Prompt<bool>, PromptError> {
        let answer = Confirm::new()
            .with_prompt(message)
            .default(default)
            .interact_opt();
        lift(answer)
    }

    fn notify(&self, message: &str) {
        eprintln!("{message}");
    }
}

fn lift<T>(result: Result<Option<T>, dialoguer::Error>) -> Result<Prompt<T>, PromptError> {
    match result {
        Ok(value) => Ok(value.into()),
        Err(dialoguer::Error::IO(e)) if e.kind() == ErrorKind::Interrupted => Ok(Prompt::Cancelled),
        Err(e) => Err(PromptError::Terminal(e)),
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    //! Prompter that replays canned answers, for workflow tests.

    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::{Prompt, Prompter};
    use crate::error::PromptError;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Reply {
        Select(Prompt<usize>),
        MultiSelect(Prompt<Vec<usize>>),
        Input(Prompt<String>),
        Confirm(Prompt<bool>),
    }

    /// Panics when asked a question of the wrong kind or after the script ends.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedPrompter {
        replies: RefCell<VecDeque<Reply>>,
        /// Every prompt message, in order.
        pub(crate) asked: RefCell<Vec<String>>,
        /// Pre-checked flags of the last multi-select.
        pub(crate) last_checked: RefCell<Vec<bool>>,
        pub(crate) notices: RefCell<Vec<String>>,
    }

    impl ScriptedPrompter {
        pub(crate) fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
            Self {
                replies: RefCell::new(replies.into_iter().collect()),
                ..Self::default()
            }
        }

        pub(crate) fn remaining(&self) -> usize {
            self.replies.borrow().len()
        }

        fn next(&self, message: &str) -> Reply {
            self.asked.borrow_mut().push(message.to_string());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected prompt: {message}"))
        }
    }

    impl Prompter for ScriptedPrompter {
        fn select(
            &self,
            message: &str,
            _items: &[String],
            _default: usize,
        ) -> Result<Prompt<usize>, PromptError> {
            match self.next(message) {
                Reply::Select(answer) => Ok(answer),
                other => panic!("expected select for '{message}', script has {other:?}"),
            }
        }

        fn multi_select(
            &self,
            message: &str,
            _items: &[String],
            checked: &[bool],
        ) -> Result<Prompt<Vec<usize>>, PromptError> {
            *self.last_checked.borrow_mut() = checked.to_vec();
            match self.next(message) {
                Reply::MultiSelect(answer) => Ok(answer),
                other => panic!("expected multi-select for '{message}', script has {other:?}"),
            }
        }

        fn input(&self, message: &str, _initial: &str) -> Result<Prompt<String>, PromptError> {
            match self.next(message) {
                Reply::Input(answer) => Ok(answer),
                other => panic!("expected input for '{message}', script has {other:?}"),
            }
        }

        fn confirm(&self, message: &str, _default: bool) -> Result<Prompt<bool>, PromptError> {
            match self.next(message) {
                Reply::Confirm(answer) => Ok(answer),
                other => panic!("expected confirm for '{message}', script has {other:?}"),
            }
        }

        fn notify(&self, message: &str) {
            self.notices.borrow_mut().push(message.to_string());
        }
    }
}
