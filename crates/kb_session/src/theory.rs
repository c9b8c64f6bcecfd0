//! Theory file discovery and loading.
//!
//! A theory directory holds one or more `.sys2`/`.sys2dsl` files, each a
//! plain DSL source file in the same grammar [`kb_parser`] accepts from
//! `Session::learn`. Construction loads them in lexicographic filename
//! order — `index.sys2` is skipped, reserved for a future manifest format
//! rather than loaded as theory. A file that fails to parse or that
//! contradicts an earlier one is reported in the returned summary but
//! does not stop the remaining files from loading; only a failure to read
//! the directory itself is fatal.

use std::fs;
use std::path::{Path, PathBuf};

/// What happened when one theory file was loaded.
#[derive(Debug, Clone)]
pub struct TheoryFileReport {
    pub path: PathBuf,
    pub facts_added: usize,
    pub errors: Vec<String>,
}

/// Lists the theory files under `dir`, in the order a session loads
/// them: lexicographic by filename, `.sys2`/`.sys2dsl` only, excluding
/// `index.sys2`.
pub fn discover(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name == "index.sys2" {
            continue;
        }
        if name.ends_with(".sys2") || name.ends_with(".sys2dsl") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn touch(dir: &Path, name: &str) {
        let mut f = File::create(dir.join(name)).unwrap();
        writeln!(f, "isA Fido Dog").unwrap();
    }

    #[test]
    fn discovers_in_lexicographic_order_excluding_index() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.sys2");
        touch(dir.path(), "a.sys2dsl");
        touch(dir.path(), "index.sys2");
        touch(dir.path(), "notes.txt");

        let found = discover(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.sys2dsl", "b.sys2"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(discover(&missing).is_err());
    }
}
