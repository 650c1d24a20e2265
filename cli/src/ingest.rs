//! Input file handling.

use std::path::Path;

use crate::error::{CliError, CliResult};

/// Read a document's text from a `.txt` or `.pdf` file.
///
/// Invalid UTF-8 sequences in text files are replaced rather than rejected.
/// PDF pages with no extractable text are dropped.
pub fn extract_text_from_file(path: &Path) -> CliResult<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("txt") => {
            let bytes = std::fs::read(path)?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        Some("pdf") => extract_text_from_pdf(path),
        _ => Err(CliError::UnsupportedFileType(path.to_path_buf())),
    }
}

fn extract_text_from_pdf(path: &Path) -> CliResult<String> {
    let bytes = std::fs::read(path)?;
    let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| CliError::Pdf {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    Ok(join_pages(&text))
}

/// Trim each form-feed separated page and join the non-empty ones
fn join_pages(text: &str) -> String {
    text.split('\u{c}')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Source label for chunks from `path`: its file name.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_txt_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.TXT");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"caf\xff notes").unwrap();

        let text = extract_text_from_file(&path).unwrap();
        assert_eq!(text, "caf\u{FFFD} notes");
    }

    #[test]
    fn test_rejects_other_extensions() {
        let err = extract_text_from_file(Path::new("report.docx")).unwrap_err();
        assert!(matches!(err, CliError::UnsupportedFileType(_)));
        assert!(extract_text_from_file(Path::new("README")).is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = extract_text_from_file(Path::new("/nonexistent/mmrag/input.txt")).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }

    #[test]
    fn test_unreadable_pdf_is_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        let err = extract_text_from_file(&path).unwrap_err();
        assert!(matches!(err, CliError::Pdf { .. }));
    }

    #[test]
    fn test_join_pages_drops_blank_pages() {
        assert_eq!(
            join_pages("  first page \n\u{c}\n \u{c}second page\n"),
            "first page\n\nsecond page"
        );
        assert_eq!(join_pages("single"), "single");
    }

    #[test]
    fn test_source_name() {
        assert_eq!(source_name(Path::new("/data/in/report.txt")), "report.txt");
    }
}
