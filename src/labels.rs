use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("failed to read class list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("class list {} contains no labels", path.display())]
    Empty { path: PathBuf },
}

/// Class names in index order. Line `n` of the class list names class id `n`.
#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    pub fn load(path: &Path) -> Result<Self, LabelError> {
        let contents = std::fs::read_to_string(path).map_err(|source| LabelError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let table = Self::parse(&contents);
        if table.is_empty() {
            return Err(LabelError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(table)
    }

    /// Trims every line and drops the blank tail so a trailing newline does not add a class.
    /// Blank lines in the middle are kept, they still occupy an index.
    pub fn parse(contents: &str) -> Self {
        let mut labels: Vec<String> = contents.lines().map(|l| l.trim().to_string()).collect();
        while labels.last().is_some_and(|l| l.is_empty()) {
            labels.pop();
        }
        Self { labels }
    }

    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.labels.get(class_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
