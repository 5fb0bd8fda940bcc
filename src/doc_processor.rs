use serde::Serialize;
use std::fs;
use std::path::Path;

/// Uploaded document content plus the name shown next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub file_name: String,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Unsupported file type: .{0}")]
    Unsupported(String),
    #[error("Could not read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parse error: {0}")]
    Pdf(String),
}

impl Serialize for LoadError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Read an uploaded file into plain text
pub fn load_document(path: &Path) -> Result<LoadedDocument, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    let text = match ext.as_str() {
        "txt" | "md" | "markdown" => fs::read_to_string(path)?,
        "pdf" => {
            let bytes = fs::read(path)?;
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| LoadError::Pdf(e.to_string()))?
        }
        _ => return Err(LoadError::Unsupported(ext)),
    };

    Ok(LoadedDocument { file_name, text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.md");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "# Marbury v. Madison").unwrap();

        let doc = load_document(&path).unwrap();
        assert_eq!(doc.file_name, "brief.md");
        assert_eq!(doc.text, "# Marbury v. Madison");
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_document(Path::new("contract.docx")).unwrap_err();
        assert!(matches!(err, LoadError::Unsupported(ext) if ext == "docx"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_document(Path::new("/nonexistent/brief.txt")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
