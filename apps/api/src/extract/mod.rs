//! Text extraction from uploaded documents.
//!
//! The format is chosen from the file extension: `.pdf` and `.docx` are parsed,
//! anything else must be valid UTF-8 text.

use std::panic::{catch_unwind, AssertUnwindSafe};

use docx_rs::{
    DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild,
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("could not read PDF '{filename}': {reason}")]
    Pdf { filename: String, reason: String },

    #[error("could not read DOCX '{filename}': {reason}")]
    Docx { filename: String, reason: String },

    #[error("'{filename}' is not valid UTF-8 text: {source}")]
    Encoding {
        filename: String,
        #[source]
        source: std::str::Utf8Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            Self::Pdf
        } else if lower.ends_with(".docx") {
            Self::Docx
        } else {
            Self::PlainText
        }
    }
}

/// Raw extracted text plus the name it was uploaded under. Lives for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub filename: String,
    pub text: String,
}

impl Document {
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
        }
    }
}

/// Extracts text from an uploaded file. Blocking; PDF parsing can be slow.
pub fn extract_document(filename: &str, bytes: &[u8]) -> Result<Document, ExtractError> {
    let format = DocumentFormat::from_filename(filename);
    debug!("Extracting {filename} as {format:?} ({} bytes)", bytes.len());

    let text = match format {
        DocumentFormat::Pdf => extract_pdf(filename, bytes)?,
        DocumentFormat::Docx => extract_docx(filename, bytes)?,
        DocumentFormat::PlainText => decode_utf8(filename, bytes)?,
    };

    Ok(Document::new(filename, text))
}

fn extract_pdf(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed inputs instead of returning an error
    let outcome = catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)));
    match outcome {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractError::Pdf {
            filename: filename.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Err(ExtractError::Pdf {
            filename: filename.to_string(),
            reason: "malformed PDF structure".to_string(),
        }),
    }
}

fn extract_docx(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractError::Docx {
        filename: filename.to_string(),
        reason: e.to_string(),
    })?;

    let mut lines = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => lines.push(paragraph_text(&p.children)),
            DocumentChild::Table(table) => {
                let cells = table
                    .rows
                    .iter()
                    .flat_map(|TableChild::TableRow(row)| row.cells.iter())
                    .flat_map(|TableRowChild::TableCell(cell)| cell.children.iter());
                for content in cells {
                    if let TableCellContent::Paragraph(p) = content {
                        lines.push(paragraph_text(&p.children));
                    }
                }
            }
            _ => {}
        }
    }

    Ok(lines.join("\n"))
}

fn paragraph_text(children: &[ParagraphChild]) -> String {
    let mut text = String::new();
    for child in children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Tab(_) => text.push('\t'),
                    RunChild::Break(_) => text.push('\n'),
                    _ => {}
                }
            }
        }
    }
    text
}

fn decode_utf8(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|source| ExtractError::Encoding {
            filename: filename.to_string(),
            source,
        })
}
