//! Content filter pipeline applied to landing document bodies.

/// A single transformation of document body text.
pub trait ContentFilter: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Transforms the body.
    fn apply(&self, content: String) -> String;
}

/// Strips surrounding whitespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct Trim;

impl ContentFilter for Trim {
    fn name(&self) -> &'static str {
        "trim"
    }

    fn apply(&self, content: String) -> String {
        content.trim().to_string()
    }
}

/// Wraps plain-text blocks separated by blank lines in paragraphs.
///
/// Blocks that already start with a tag are left untouched. Single line
/// breaks inside a paragraph become `<br />`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Paragraphs;

impl ContentFilter for Paragraphs {
    fn name(&self) -> &'static str {
        "paragraphs"
    }

    fn apply(&self, content: String) -> String {
        let normalized = content.replace("\r\n", "\n");
        normalized
            .split("\n\n")
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .map(|block| {
                if block.starts_with('<') {
                    block.to_string()
                } else {
                    let lines: Vec<&str> = block.lines().map(str::trim_end).collect();
                    format!("<p>{}</p>", lines.join("<br />\n"))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Ordered list of filters run over a document body.
pub struct ContentPipeline {
    filters: Vec<Box<dyn ContentFilter>>,
}

impl Default for ContentPipeline {
    fn default() -> Self {
        Self::empty().with_filter(Trim).with_filter(Paragraphs)
    }
}

impl ContentPipeline {
    /// A pipeline that returns bodies unchanged.
    #[must_use]
    pub fn empty() -> Self {
        Self { filters: Vec::new() }
    }

    /// Appends a filter.
    #[must_use]
    pub fn with_filter<F: ContentFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Names of the filters, in order.
    #[must_use]
    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Runs every filter over `body`.
    #[must_use]
    pub fn render(&self, body: &str) -> String {
        self.filters
            .iter()
            .fold(body.to_string(), |content, filter| filter.apply(content))
    }
}

/// Runs the default pipeline over `body`.
#[must_use]
pub fn render_content_filters(body: &str) -> String {
    ContentPipeline::default().render(body)
}
