//! Line-oriented term lists (search terms, release groups, shows).

use std::collections::HashSet;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, error};

/// Errors from reading or appending term files.
#[derive(Debug, Error)]
pub enum TermsError {
    /// The list file is required and missing.
    #[error("Term file does not exist: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read term file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to append to term file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Normalize term file content: trim lines, drop blanks and `#` comments,
/// remove duplicates while keeping first-seen order. Case-sensitive.
pub fn parse_terms(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}

/// Load a term list from a UTF-8 text file.
pub async fn load_terms(path: &Path) -> Result<Vec<String>, TermsError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            error!(path = %path.display(), "Term file does not exist");
            return Err(TermsError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(TermsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let terms = parse_terms(&content);
    debug!(path = %path.display(), count = terms.len(), "Loaded terms");
    Ok(terms)
}

/// Append one line to a term file, creating the file if needed.
///
/// A file whose last line is unterminated gets a newline first, so the
/// appended term always lands on its own line.
pub async fn append_term(path: &Path, term: &str) -> Result<(), TermsError> {
    let result = async {
        let mut line = String::new();
        if missing_final_newline(path).await? {
            line.push('\n');
        }
        line.push_str(term);
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
    .await;

    result.map_err(|source| {
        error!(path = %path.display(), error = %source, "Failed to append term");
        TermsError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}

async fn missing_final_newline(path: &Path) -> std::io::Result<bool> {
    let mut file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if file.metadata().await?.len() == 0 {
        return Ok(false);
    }

    file.seek(SeekFrom::End(-1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] != b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_terms_comments_blanks_and_case() {
        assert_eq!(parse_terms("a\n#comment\n\nA\nb"), vec!["a", "A", "b"]);
    }

    #[test]
    fn test_parse_terms_trims_and_dedups() {
        let content = "  Show One  \r\nShow Two\n\tShow One\n   # indented comment\n   \n";
        assert_eq!(parse_terms(content), vec!["Show One", "Show Two"]);
    }

    #[test]
    fn test_parse_terms_keeps_first_seen_order() {
        assert_eq!(parse_terms("c\nb\na\nb\nc"), vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_load_terms_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_terms(&dir.path().join("terms.txt")).await.unwrap_err();
        assert!(matches!(err, TermsError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_load_terms_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("terms.txt");
        std::fs::write(&path, "# shows\nFoo 1080p\nBar\nFoo 1080p\n").unwrap();
        assert_eq!(load_terms(&path).await.unwrap(), vec!["Foo 1080p", "Bar"]);
    }

    #[tokio::test]
    async fn test_append_term_creates_and_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("terms.txt");

        append_term(&path, "GRP Show 1080p").await.unwrap();
        append_term(&path, "").await.unwrap();
        append_term(&path, "GRP Show 1080p").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "GRP Show 1080p\n\nGRP Show 1080p\n");
        assert_eq!(load_terms(&path).await.unwrap(), vec!["GRP Show 1080p"]);
    }

    #[tokio::test]
    async fn test_append_term_after_unterminated_last_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("terms.txt");
        std::fs::write(&path, "Existing Show").unwrap();

        append_term(&path, "GRP Show 1080p").await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Existing Show\nGRP Show 1080p\n"
        );
        assert_eq!(
            load_terms(&path).await.unwrap(),
            vec!["Existing Show", "GRP Show 1080p"]
        );
    }

    #[tokio::test]
    async fn test_append_term_to_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("terms.txt");
        std::fs::write(&path, "").unwrap();

        append_term(&path, "Show").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Show\n");
    }
}
