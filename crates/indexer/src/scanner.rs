use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Text dumps larger than this are skipped
pub const MAX_DOCUMENT_SIZE_BYTES: u64 = 64 * 1024 * 1024;

/// A document found under the docs folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub path: PathBuf,

    /// Path relative to the scanned root, `/`-separated; used as the fragment source
    pub source: String,
}

/// Scanner for finding page dumps in a folder
pub struct DocumentScanner {
    root: PathBuf,
    extensions: Vec<String>,
    recursive: bool,
}

impl DocumentScanner {
    pub fn new(root: impl AsRef<Path>, extensions: &[String]) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            recursive: false,
        }
    }

    /// Descend into subfolders instead of reading only the top level
    #[must_use]
    pub const fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Documents with an accepted extension, sorted by source name
    pub fn scan(&self) -> Vec<DocumentFile> {
        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut documents = Vec::new();

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !Self::is_hidden(entry.path()));

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Failed to read entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.is_accepted(entry.path()) {
                continue;
            }

            let path = entry.path();
            if let Ok(meta) = entry.metadata() {
                if meta.len() > MAX_DOCUMENT_SIZE_BYTES {
                    log::debug!(
                        "Skipping large document {} ({} bytes > {})",
                        path.display(),
                        meta.len(),
                        MAX_DOCUMENT_SIZE_BYTES
                    );
                    continue;
                }
            }

            documents.push(DocumentFile {
                path: path.to_path_buf(),
                source: self.source_name(path),
            });
        }

        documents.sort_by(|a, b| a.source.cmp(&b.source));
        log::info!("Found {} documents", documents.len());
        documents
    }

    fn is_accepted(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|accepted| *accepted == ext)
            })
    }

    fn is_hidden(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with('.'))
    }

    fn source_name(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn sources(docs: &[DocumentFile]) -> Vec<&str> {
        docs.iter().map(|d| d.source.as_str()).collect()
    }

    #[test]
    fn top_level_only_by_default() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.TXT"), "a").unwrap();
        fs::write(dir.path().join("notes.md"), "md").unwrap();
        fs::write(dir.path().join(".hidden.txt"), "h").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/c.txt"), "c").unwrap();

        let scanner = DocumentScanner::new(dir.path(), &exts(&["txt"]));
        assert_eq!(sources(&scanner.scan()), vec!["a.TXT", "b.txt"]);
    }

    #[test]
    fn recursive_scan_uses_relative_sources() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/c.txt"), "c").unwrap();
        fs::write(dir.path().join("nested/d.md"), "d").unwrap();

        let scanner = DocumentScanner::new(dir.path(), &exts(&[".txt", "md"])).recursive(true);
        assert_eq!(
            sources(&scanner.scan()),
            vec!["a.txt", "nested/c.txt", "nested/d.md"]
        );
    }

    #[test]
    fn missing_root_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let scanner = DocumentScanner::new(dir.path().join("absent"), &exts(&["txt"]));
        assert!(scanner.scan().is_empty());
    }
}
