//! Rendering of [`TerracanvasError`] as a miette diagnostic.
//!
//! Parse errors carry their source text, so they are reported with a
//! labelled snippet; every other variant is reported by message and code.

use std::{error::Error, fmt, iter};

use miette::{Diagnostic, LabeledSpan, SourceCode, SourceSpan};

use terracanvas::TerracanvasError;

/// A [`TerracanvasError`] viewed as a miette diagnostic.
#[derive(Debug)]
pub struct Report<'a>(&'a TerracanvasError);

impl<'a> Report<'a> {
    pub fn new(err: &'a TerracanvasError) -> Self {
        Self(err)
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0, f)
    }
}

impl Error for Report<'_> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

impl Diagnostic for Report<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            TerracanvasError::Validation(_) => "terracanvas::validation",
            TerracanvasError::NotFound(_) => "terracanvas::not_found",
            TerracanvasError::Generation(_) => "terracanvas::generation",
            TerracanvasError::Layout(_) => "terracanvas::layout",
            TerracanvasError::Parse { .. } => "terracanvas::parse",
            TerracanvasError::Io(_) => "terracanvas::io",
            TerracanvasError::Serialization(_) => "terracanvas::serialization",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self.0 {
            TerracanvasError::Parse { err, .. } => err
                .help()
                .map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>),
            _ => None,
        }
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        match self.0 {
            TerracanvasError::Parse { src, .. } => Some(src as &dyn SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let TerracanvasError::Parse { err, .. } = self.0 else {
            return None;
        };
        let message = match err.file() {
            Some(file) => format!("in {file}"),
            None => "here".to_string(),
        };
        let span = err.span();
        let span = SourceSpan::new(span.start().into(), span.len());
        Some(Box::new(iter::once(LabeledSpan::new_primary_with_span(
            Some(message),
            span,
        ))))
    }
}

#[cfg(test)]
mod tests {
    use terracanvas_parser::{ParseError, Span};

    use super::*;

    #[test]
    fn test_parse_error_is_diagnostic() {
        let parse_err = ParseError::new("unexpected token", Span::new(0..5)).with_help("try this");
        let err = TerracanvasError::new_parse_error(parse_err, "hello world");
        let report = Report::new(&err);

        assert_eq!(report.to_string(), "unexpected token");
        assert_eq!(report.help().unwrap().to_string(), "try this");
        assert_eq!(report.code().unwrap().to_string(), "terracanvas::parse");
        assert!(report.source_code().is_some());
    }

    #[test]
    fn test_label_points_at_span() {
        let parse_err = ParseError::new("bad", Span::new(6..11)).with_file("main.tf");
        let err = TerracanvasError::new_parse_error(parse_err, "hello world");
        let report = Report::new(&err);

        let labels: Vec<_> = report.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 6);
        assert_eq!(labels[0].len(), 5);
        assert_eq!(labels[0].label(), Some("in main.tf"));
        assert!(labels[0].primary());
    }

    #[test]
    fn test_non_parse_error() {
        let err = TerracanvasError::NotFound("node `resource.t.a`".to_string());
        let report = Report::new(&err);

        assert_eq!(report.to_string(), "Not found: node `resource.t.a`");
        assert_eq!(report.code().unwrap().to_string(), "terracanvas::not_found");
        assert!(report.labels().is_none());
        assert!(report.source_code().is_none());
    }
}
