//! 文档读取：按扩展名识别类型，PDF 逐页抽取文本，纯文本整体作为第 1 页

use std::path::{Path, PathBuf};

use crate::materials::{MaterialError, Page};

/// 支持的文档类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Text,
}

impl FileKind {
    /// 按扩展名（大小写无关）识别；不支持时返回 UnsupportedFileType
    pub fn from_path(path: &Path) -> Result<Self, MaterialError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            "txt" | "md" | "markdown" => Ok(Self::Text),
            _ => Err(MaterialError::UnsupportedFileType(if ext.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{}", ext)
            })),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "text",
        }
    }
}

/// PDF 解析器：返回每页文本（下标 0 对应第 1 页）
pub trait DocumentParser: Send + Sync {
    fn parse_pdf(&self, path: &Path) -> Result<Vec<String>, String>;
}

/// 基于 pdf-extract 的默认实现
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractParser;

impl DocumentParser for PdfExtractParser {
    fn parse_pdf(&self, path: &Path) -> Result<Vec<String>, String> {
        pdf_extract::extract_text_by_pages(path).map_err(|e| e.to_string())
    }
}

/// 已读取的文档
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub kind: FileKind,
    pub pages: Vec<Page>,
    /// 文档全文字符数（PDF 为非空页以空行拼接后的长度）
    pub total_characters: usize,
}

/// 读取文档的各页文本；仅含空白的 PDF 页被丢弃，页码保持原始编号
pub async fn load_pages(
    path: &Path,
    parser: std::sync::Arc<dyn DocumentParser>,
) -> Result<LoadedDocument, MaterialError> {
    let kind = FileKind::from_path(path)?;
    match kind {
        FileKind::Pdf => {
            let path_buf: PathBuf = path.to_path_buf();
            let raw = tokio::task::spawn_blocking(move || parser.parse_pdf(&path_buf))
                .await
                .map_err(|e| MaterialError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
                .map_err(|reason| MaterialError::Parse {
                    path: path.to_path_buf(),
                    reason,
                })?;

            let pages: Vec<Page> = raw
                .into_iter()
                .enumerate()
                .filter(|(_, text)| !text.trim().is_empty())
                .map(|(i, text)| Page::new((i + 1) as u32, text))
                .collect();
            let total_characters = pages
                .iter()
                .map(|p| p.text.chars().count())
                .sum::<usize>()
                + 2 * pages.len().saturating_sub(1);

            Ok(LoadedDocument {
                kind,
                pages,
                total_characters,
            })
        }
        FileKind::Text => {
            let content = tokio::fs::read_to_string(path).await?;
            let total_characters = content.chars().count();
            Ok(LoadedDocument {
                kind,
                pages: vec![Page::new(1, content)],
                total_characters,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use super::*;

    struct FakePdf(Vec<&'static str>);

    impl DocumentParser for FakePdf {
        fn parse_pdf(&self, _path: &Path) -> Result<Vec<String>, String> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct BrokenPdf;

    impl DocumentParser for BrokenPdf {
        fn parse_pdf(&self, _path: &Path) -> Result<Vec<String>, String> {
            Err("invalid xref table".into())
        }
    }

    #[test]
    fn test_file_kind_from_extension() {
        assert_eq!(FileKind::from_path(Path::new("a.PDF")).unwrap(), FileKind::Pdf);
        assert_eq!(FileKind::from_path(Path::new("notes.md")).unwrap(), FileKind::Text);
        assert_eq!(FileKind::from_path(Path::new("n.markdown")).unwrap(), FileKind::Text);
        assert_eq!(FileKind::from_path(Path::new("n.txt")).unwrap(), FileKind::Text);
        assert!(matches!(
            FileKind::from_path(Path::new("slides.docx")),
            Err(MaterialError::UnsupportedFileType(ext)) if ext == ".docx"
        ));
        assert!(FileKind::from_path(Path::new("README")).is_err());
    }

    #[tokio::test]
    async fn test_pdf_blank_pages_dropped_numbers_kept() {
        let parser = Arc::new(FakePdf(vec!["first", "  \n ", "third"]));
        let doc = load_pages(Path::new("book.pdf"), parser).await.unwrap();

        assert_eq!(doc.kind, FileKind::Pdf);
        let numbers: Vec<u32> = doc.pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(doc.total_characters, "first\n\nthird".len());
    }

    #[tokio::test]
    async fn test_pdf_parse_error() {
        let err = load_pages(Path::new("bad.pdf"), Arc::new(BrokenPdf))
            .await
            .unwrap_err();
        assert!(matches!(err, MaterialError::Parse { .. }));
        assert!(err.to_string().contains("invalid xref table"));
    }

    #[tokio::test]
    async fn test_text_file_is_single_page() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "alpha\n\nbeta").unwrap();

        let doc = load_pages(file.path(), Arc::new(PdfExtractParser)).await.unwrap();
        assert_eq!(doc.kind, FileKind::Text);
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].number, 1);
        assert_eq!(doc.pages[0].text, "alpha\n\nbeta");
        assert_eq!(doc.total_characters, 11);
    }
}
