//! Loader adapters over the text-extraction libraries.

use std::path::Path;

use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, Run, RunChild, Table, TableCellContent, TableChild,
    TableRowChild,
};

use crate::ingest::{DocumentFormat, DocumentLoader, IngestError, TextSegment};

/// Per-page text via `pdf-extract`, in page order. Whitespace-only pages are
/// skipped, so an image-only scan yields no segments at all.
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<Vec<TextSegment>, IngestError> {
        let pages = pdf_extract::extract_text_by_pages(path).map_err(|e| IngestError::Extraction {
            format: DocumentFormat::Pdf,
            message: e.to_string(),
        })?;

        Ok(pages
            .into_iter()
            .filter(|page| !page.trim().is_empty())
            .map(TextSegment::new)
            .collect())
    }
}

/// Paragraphs via `docx-rs`, in document order. Table cells are walked row by
/// row and each cell paragraph becomes its own segment. Whitespace-only
/// paragraphs are skipped.
pub struct DocxLoader;

impl DocumentLoader for DocxLoader {
    fn load(&self, path: &Path) -> Result<Vec<TextSegment>, IngestError> {
        let data = std::fs::read(path)?;
        let docx = docx_rs::read_docx(&data).map_err(|e| IngestError::Extraction {
            format: DocumentFormat::Docx,
            message: e.to_string(),
        })?;

        let mut paragraphs = Vec::new();
        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(p) => paragraphs.push(paragraph_text(p)),
                DocumentChild::Table(t) => push_table_text(t, &mut paragraphs),
                _ => {}
            }
        }

        Ok(paragraphs
            .into_iter()
            .filter(|text| !text.trim().is_empty())
            .map(TextSegment::new)
            .collect())
    }
}

fn push_table_text(t: &Table, out: &mut Vec<String>) {
    for row in &t.rows {
        let TableChild::TableRow(r) = row;
        for cell in &r.cells {
            let TableRowChild::TableCell(c) = cell;
            for content in &c.children {
                if let TableCellContent::Paragraph(p) = content {
                    out.push(paragraph_text(p));
                }
            }
        }
    }
}

fn paragraph_text(p: &Paragraph) -> String {
    let mut text = String::new();
    for child in &p.children {
        match child {
            ParagraphChild::Run(r) => push_run_text(r, &mut text),
            ParagraphChild::Hyperlink(h) => {
                for child in &h.children {
                    if let ParagraphChild::Run(r) = child {
                        push_run_text(r, &mut text);
                    }
                }
            }
            _ => {}
        }
    }
    text
}

fn push_run_text(run: &Run, out: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

/// Whole file as UTF-8, verbatim.
pub struct TxtLoader;

impl DocumentLoader for TxtLoader {
    fn load(&self, path: &Path) -> Result<Vec<TextSegment>, IngestError> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes).map_err(|e| IngestError::DecodeFailure(e.to_string()))?;
        Ok(vec![TextSegment::new(text)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, TableCell, TableRow};
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use std::io::Write;

    fn write_docx(docx: Docx) -> tempfile::NamedTempFile {
        let mut buf = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        let mut file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        file.write_all(buf.get_ref()).unwrap();
        file
    }

    #[test]
    fn test_docx_paragraphs_in_order() {
        let docx = Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Ada Lovelace")))
            .add_paragraph(Paragraph::new())
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("Analyst"))
                    .add_run(Run::new().add_tab().add_text("1843")),
            );
        let file = write_docx(docx);

        let segments = DocxLoader.load(file.path()).unwrap();
        assert_eq!(
            segments,
            vec![TextSegment::new("Ada Lovelace"), TextSegment::new("Analyst\t1843")]
        );
    }

    #[test]
    fn test_docx_table_cells_kept_in_order() {
        let cell = |text: &str| TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)));
        let docx = Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Ada Lovelace")))
            .add_table(Table::new(vec![
                TableRow::new(vec![cell("Skills"), cell("Rust, C++")]),
                TableRow::new(vec![cell("Email"), cell("ada@example.com")]),
            ]))
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("References on request")));
        let file = write_docx(docx);

        let segments = DocxLoader.load(file.path()).unwrap();
        assert_eq!(
            segments,
            vec![
                TextSegment::new("Ada Lovelace"),
                TextSegment::new("Skills"),
                TextSegment::new("Rust, C++"),
                TextSegment::new("Email"),
                TextSegment::new("ada@example.com"),
                TextSegment::new("References on request"),
            ]
        );
    }

    /// Builds a PDF with one page per entry; `None` is a page with no text.
    fn write_pdf(pages: &[Option<&str>]) -> tempfile::NamedTempFile {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for page in pages {
            let operations = match page {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => vec![],
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        doc.save_to(&mut file).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_pdf_pages_in_document_order() {
        let file = write_pdf(&[Some("Alpha"), Some("Bravo"), Some("Charlie")]);

        let segments = PdfLoader.load(file.path()).unwrap();
        let texts: Vec<&str> = segments.iter().map(|s| s.as_str().trim()).collect();
        assert_eq!(texts, vec!["Alpha", "Bravo", "Charlie"]);
    }

    #[test]
    fn test_pdf_blank_page_yields_no_segment() {
        let file = write_pdf(&[Some("Alpha"), None, Some("Charlie")]);

        let segments = PdfLoader.load(file.path()).unwrap();
        let texts: Vec<&str> = segments.iter().map(|s| s.as_str().trim()).collect();
        assert_eq!(texts, vec!["Alpha", "Charlie"]);
    }

    #[test]
    fn test_pdf_without_text_layer_is_empty() {
        let file = write_pdf(&[None, None]);

        assert!(PdfLoader.load(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_docx_garbage_is_extraction_error() {
        let mut file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        file.write_all(b"definitely not a zip archive").unwrap();

        let err = DocxLoader.load(file.path()).unwrap_err();
        assert!(matches!(err, IngestError::Extraction { format: DocumentFormat::Docx, .. }));
    }

    #[test]
    fn test_pdf_garbage_is_extraction_error() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"not a pdf").unwrap();

        let err = PdfLoader.load(file.path()).unwrap_err();
        assert!(matches!(err, IngestError::Extraction { format: DocumentFormat::Pdf, .. }));
    }

    #[test]
    fn test_txt_is_single_verbatim_segment() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"  line one\r\n\r\nline two  ").unwrap();

        let segments = TxtLoader.load(file.path()).unwrap();
        assert_eq!(segments, vec![TextSegment::new("  line one\r\n\r\nline two  ")]);
    }
}
