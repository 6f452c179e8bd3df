//! Report assembly and download naming.

/// Prefix of the downloadable markdown file name.
pub const DOWNLOAD_PREFIX: &str = "resumo_e_explicacao_";
/// MIME type of the downloadable report.
pub const MARKDOWN_MIME: &str = "text/markdown";

/// Ordered generated segments for one document, labelled with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    source: String,
    segments: Vec<String>,
}

impl Report {
    /// Assemble a report from per-chunk outputs, kept in the given order.
    pub fn assemble(source: impl Into<String>, segments: Vec<String>) -> Self {
        Self {
            source: source.into(),
            segments,
        }
    }

    /// Source label (original file name).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Generated segments in chunk order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Render `Source: <label>` followed by every segment, each terminated by a blank line.
    pub fn to_markdown(&self) -> String {
        let capacity = self.source.len()
            + 10
            + self
                .segments
                .iter()
                .map(|segment| segment.len() + 2)
                .sum::<usize>();
        let mut markdown = String::with_capacity(capacity);
        markdown.push_str("Source: ");
        markdown.push_str(&self.source);
        markdown.push_str("\n\n");
        for segment in &self.segments {
            markdown.push_str(segment);
            markdown.push_str("\n\n");
        }
        markdown
    }

    /// File name offered for download, e.g. `resumo_e_explicacao_report.pdf.md`.
    pub fn download_file_name(&self) -> String {
        download_file_name(&self.source)
    }
}

/// Build the download name for an uploaded file name.
pub fn download_file_name(source: &str) -> String {
    format!("{DOWNLOAD_PREFIX}{}.md", sanitize_file_name(source))
}

/// Keep only the last path component and replace quotes and control characters.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_control() || c == '"' { '_' } else { c })
        .collect();
    if cleaned.trim().is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}
