use std::path::PathBuf;

use tracing::debug;

/// User-maintained fallback seat codes, one flat file.
///
/// The file is a whitespace- and/or comma-delimited token list so it can
/// be edited by hand without caring about the separator. A missing file
/// is simply an empty list.
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Seat codes in file order.
    pub fn load(&self) -> Vec<String> {
        let Ok(text) = std::fs::read_to_string(&self.path) else {
            debug!(path = %self.path.display(), "no preference file");
            return vec![];
        };
        text.split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_mixed_separators_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Z101, Z102\nZ205\t Z301,,\n").unwrap();
        let store = PreferenceStore::new(file.path());
        assert_eq!(store.load(), vec!["Z101", "Z102", "Z205", "Z301"]);
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path().join("absent.txt"));
        assert!(store.load().is_empty());
    }
}
