use std::sync::Arc;
use std::path::Path;

use crate::error::Result;
use crate::fstree::FsTree;

/// A page-definition file found by [`discover()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFile {
    /// The file stem. Output file names are derived from it.
    pub id: Arc<str>,
    pub path: Arc<Path>,
}

/// The page-definition files of a directory, in file-name order.
///
/// Consumed once: collect it if the listing is needed again.
#[derive(Debug)]
pub struct Pages {
    files: std::vec::IntoIter<PageFile>,
}

/// Lists the files directly inside `dir` whose extension is `ext`.
///
/// Subdirectories and hidden files are ignored. Fails if `dir` is not an
/// existing directory.
pub fn discover(dir: &Path, ext: &str) -> Result<Pages> {
    if !dir.is_dir() {
        return err! {
            "page directory not found",
            "expected directory" => dir.display(),
        };
    }

    let tree = FsTree::shallow(dir)?;
    let files = tree.children(tree.root_id())
        .filter(|entry| entry.is_file() && entry.file_ext() == Some(ext))
        .map(|entry| PageFile {
            id: entry.file_stem().into(),
            path: entry.path.clone(),
        })
        .collect::<Vec<_>>();

    Ok(Pages { files: files.into_iter() })
}

impl Iterator for Pages {
    type Item = PageFile;

    fn next(&mut self) -> Option<Self::Item> {
        self.files.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.files.size_hint()
    }
}

impl ExactSizeIterator for Pages { }

#[cfg(test)]
mod tests {
    use std::fs;
    use super::*;

    #[test]
    fn lists_matching_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["product.json", "cart.json", "index.json", "notes.txt", "nested/about.json"] {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "{}").unwrap();
        }

        let ids: Vec<_> = discover(dir.path(), "json").unwrap().map(|p| p.id.to_string()).collect();
        assert_eq!(ids, ["cart", "index", "product"]);
    }

    #[test]
    fn directories_with_the_extension_are_not_pages() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("archive.json")).unwrap();
        fs::write(dir.path().join("index.json"), "{}").unwrap();

        let pages = discover(dir.path(), "json").unwrap();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("pages");
        let error = discover(&missing, "json").unwrap_err();
        assert_eq!(error.message(), "page directory not found");
        assert_eq!(error.context_value("expected directory"), Some(missing.display().to_string()));
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(discover(dir.path(), "json").unwrap().count(), 0);
    }
}
