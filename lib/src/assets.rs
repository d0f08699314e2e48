use std::fs;
use std::path::Path;

use crate::error::{Result, Chainable};
use crate::fstree::{Depth, FsTree, Hidden};

/// Root-level asset files with these extensions are page prototypes, not
/// assets, and are never copied.
const PROTOTYPE_EXTS: &[&str] = &["html", "xml"];

/// Copies static assets from `source` into `output`.
///
/// Every directory of `source` named in `dirs` replaces the same-named
/// directory of `output` wholesale. Files at the root of `source` are copied
/// as well, except page prototypes. Other directories are ignored. Hidden
/// files are assets like any other. A missing `source` copies nothing.
/// Returns the number of files copied.
pub fn copy_assets(source: &Path, output: &Path, dirs: &[String]) -> Result<usize> {
    if !source.is_dir() {
        return Ok(0);
    }

    let tree = FsTree::walk(source, Depth::Unbounded, Hidden::Include)?;
    let root = tree.root();
    let mut copied = 0;
    for entry in tree.children(root.id) {
        if entry.is_dir() && dirs.iter().any(|d| *d == entry.file_name) {
            let destination = output.join(&entry.file_name);
            if destination.exists() {
                fs::remove_dir_all(&destination).chain_with(|| error! {
                    "failed to clear asset directory",
                    "directory" => destination.display(),
                })?;
            }

            let mut result = Ok(());
            tree.depth_first_search(entry.id, |entry| {
                if result.is_err() {
                    return false;
                }

                // Entries below `root` always have a relative path.
                let Some(relative) = entry.path_relative_to(root) else { return false };
                let target = output.join(relative);
                result = if entry.is_dir() {
                    fs::create_dir_all(&target).map_err(Into::into)
                } else {
                    copied += 1;
                    copy_file(&entry.path, &target)
                };

                result.is_ok()
            });

            result?;
        } else if entry.is_file() && !entry.file_ext().is_some_and(|e| PROTOTYPE_EXTS.contains(&e)) {
            copy_file(&entry.path, &output.join(&entry.file_name))?;
            copied += 1;
        }
    }

    Ok(copied)
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).map(|_| ()).chain_with(|| error! {
        "failed to copy asset",
        "source path" => from.display(),
        "destination path" => to.display(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, path: &str, contents: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn dirs() -> Vec<String> {
        vec!["css".into(), "js".into(), "img".into()]
    }

    #[test]
    fn copies_listed_directories_and_root_files() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(source.path(), "css/site.css", "body {}");
        write(source.path(), "img/products/chair.webp", "RIFF");
        write(source.path(), "favicon.ico", "ico");
        write(source.path(), "index.html", "<html>");
        write(source.path(), "sitemap.xml", "<urlset>");
        write(source.path(), "drafts/notes.txt", "skip me");

        let copied = copy_assets(source.path(), output.path(), &dirs()).unwrap();
        assert_eq!(copied, 3);

        let out = output.path();
        assert_eq!(fs::read_to_string(out.join("css/site.css")).unwrap(), "body {}");
        assert!(out.join("img/products/chair.webp").is_file());
        assert!(out.join("favicon.ico").is_file());
        assert!(!out.join("index.html").exists());
        assert!(!out.join("sitemap.xml").exists());
        assert!(!out.join("drafts").exists());
    }

    #[test]
    fn stale_files_in_replaced_directories_are_removed() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(source.path(), "js/main.js", "new");
        write(output.path(), "js/old.js", "stale");
        write(output.path(), "js/main.js", "old");
        write(output.path(), "index.html", "keep");

        copy_assets(source.path(), output.path(), &dirs()).unwrap();
        assert!(!output.path().join("js/old.js").exists());
        assert_eq!(fs::read_to_string(output.path().join("js/main.js")).unwrap(), "new");
        assert!(output.path().join("index.html").exists());
    }

    #[test]
    fn hidden_files_are_copied() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(source.path(), ".htaccess", "Options -Indexes");
        write(source.path(), "img/.well-known.txt", "ok");
        write(source.path(), ".cache/skip.txt", "not listed");

        let copied = copy_assets(source.path(), output.path(), &dirs()).unwrap();
        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(output.path().join(".htaccess")).unwrap(), "Options -Indexes");
        assert!(output.path().join("img/.well-known.txt").is_file());
        assert!(!output.path().join(".cache").exists());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_asset_directories_are_errors() {
        use std::os::unix::fs::PermissionsExt;

        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(source.path(), "css/vendor/reset.css", "*{}");
        let vendor = source.path().join("css/vendor");
        fs::set_permissions(&vendor, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can read the directory regardless.
        let readable = fs::read_dir(&vendor).is_ok();
        let result = copy_assets(source.path(), output.path(), &dirs());
        fs::set_permissions(&vendor, fs::Permissions::from_mode(0o755)).unwrap();
        if !readable {
            assert!(result.is_err());
        }
    }

    #[test]
    fn missing_source_copies_nothing() {
        let output = tempfile::tempdir().unwrap();
        let missing = output.path().join("prototype");
        assert_eq!(copy_assets(&missing, output.path(), &dirs()).unwrap(), 0);
    }
}
