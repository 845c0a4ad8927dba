//! Error type for configuration parsing.

use thiserror::Error;
use winnow::error::{ContextError, ErrMode, StrContext};

use crate::span::Span;

/// A parse failure with the source location it was detected at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    message: String,
    span: Span,
    help: Option<String>,
    file: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            help: None,
            file: None,
        }
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Record the name of the file the error occurred in.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Convert a winnow error detected at byte `offset`.
    pub(crate) fn from_winnow(err: ErrMode<ContextError>, offset: usize, source_len: usize) -> Self {
        let context = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        let mut label = None;
        let mut expected = Vec::new();
        for item in context.context() {
            match item {
                StrContext::Label(name) => {
                    label.get_or_insert(*name);
                }
                StrContext::Expected(value) => expected.push(value.to_string()),
                _ => {}
            }
        }

        let message = match (label, expected.is_empty()) {
            (Some(label), false) => format!("invalid {label}: expected {}", expected.join(" or ")),
            (Some(label), true) => format!("invalid {label}"),
            (None, false) => format!("expected {}", expected.join(" or ")),
            (None, true) if offset >= source_len => "unexpected end of input".to_string(),
            (None, true) => "unexpected input".to_string(),
        };

        let end = (offset + 1).min(source_len.max(offset));
        Self::new(message, Span::new(offset..end))
    }
}
