use std::fmt::{self, Display};

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::TextRange;

/// A syntax error recorded in the node model.
///
/// Errors are tree content: a node carrying one of these is still a regular
/// part of the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxErrorMessage {
    message: String,
    issue_code: Option<String>,
    issue_data: Vec<String>,
}

impl SyntaxErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), issue_code: None, issue_data: Vec::new() }
    }

    /// Attaches a machine readable code, e.g. for quick fixes.
    pub fn with_issue_code(mut self, code: impl Into<String>) -> Self {
        self.issue_code = Some(code.into());
        self
    }

    pub fn with_issue_data(mut self, data: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.issue_data = data.into_iter().map(Into::into).collect();
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn issue_code(&self) -> Option<&str> {
        self.issue_code.as_deref()
    }

    pub fn issue_data(&self) -> &[String] {
        &self.issue_data
    }
}

impl Display for SyntaxErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<&str> for SyntaxErrorMessage {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for SyntaxErrorMessage {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// A syntax error located in the source text, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    message: String,
    issue_code: Option<String>,
    range: TextRange,
}

impl Diagnostic {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn issue_code(&self) -> Option<&str> {
        self.issue_code.as_deref()
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn error(message: impl Into<String>, range: TextRange) -> Self {
        Self { message: message.into(), issue_code: None, range }
    }

    pub fn from_syntax_error(error: &SyntaxErrorMessage, range: TextRange) -> Self {
        Self { message: error.message.clone(), issue_code: error.issue_code.clone(), range }
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let mut message = Level::Error.title(&self.message).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(Level::Error.span(self.range.into()).label("here"))
                .fold(true),
        );
        if let Some(code) = &self.issue_code {
            message = message.id(code);
        }
        renderer.render(message)
    }
}

#[cfg(test)]
mod tests {
    use text_size::TextSize;

    use super::*;

    #[test]
    fn issue_code_travels_into_diagnostic() {
        let error = SyntaxErrorMessage::new("missing ';'")
            .with_issue_code("E0001")
            .with_issue_data(["insert", ";"]);
        assert_eq!(error.issue_data(), ["insert", ";"]);

        let range = TextRange::at(TextSize::new(3), TextSize::new(1));
        let diagnostic = Diagnostic::from_syntax_error(&error, range);
        assert_eq!(diagnostic.message(), "missing ';'");
        assert_eq!(diagnostic.issue_code(), Some("E0001"));
        assert_eq!(diagnostic.range(), range);
    }

    #[test]
    fn render_points_at_range() {
        let text = "a+b\n";
        let diagnostic = Diagnostic::error(
            "unexpected token",
            TextRange::at(TextSize::new(2), TextSize::new(1)),
        );
        let renderer = Renderer::plain();
        let rendered = diagnostic.render(&renderer, "input.txt", text).to_string();

        assert!(rendered.starts_with("error: unexpected token"), "{rendered}");
        assert!(rendered.contains("input.txt"), "{rendered}");
        assert!(rendered.contains("here"), "{rendered}");
    }
}
