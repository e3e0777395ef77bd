//! Ranks a meeting's documents into the bounded context block handed to the
//! summarizer. The urls are passed through untouched, the model is expected
//! to fetch them itself.

use itertools::Itertools;
use meeting_datastore::{Document, DocumentFormat};

pub const DEFAULT_MAX_DOCUMENTS: usize = 5;

const HEADER: &str = "Meeting Documents Available:";
const FOOTER: &str =
    "Please access and review these documents for additional context about the meeting.";
const UNTITLED: &str = "Untitled document";

/// Up to `max_docs` documents, HTML first, then PDF, then everything else,
/// keeping input order within each group.
pub fn rank_documents(documents: &[Document], max_docs: usize) -> Vec<&Document> {
    documents
        .iter()
        .sorted_by_key(|doc| match doc.format() {
            DocumentFormat::Html => 0,
            DocumentFormat::Pdf => 1,
            DocumentFormat::Other => 2,
        })
        .take(max_docs)
        .collect()
}

/// Formats the ranked documents as a bullet list, or `""` when there are none.
pub fn document_context(documents: &[Document], max_docs: usize) -> String {
    let ranked = rank_documents(documents, max_docs);
    if ranked.is_empty() {
        return String::new();
    }

    let lines = ranked
        .iter()
        .map(|doc| {
            let title = doc.title.trim();
            let title = if title.is_empty() { UNTITLED } else { title };
            format!("- {title}: {}", doc.url)
        })
        .join("\n");

    format!("{HEADER}\n{lines}\n\n{FOOTER}")
}
