use std::sync::Arc;
use std::path::Path;
use std::{fs, fmt};

use rustc_hash::FxHashMap;

use crate::error::{Result, Chainable};

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct EntryId(pub(crate) usize);

/// An in-memory snapshot of a directory tree.
///
/// Entries are stored in walk order: parents before children, and siblings
/// sorted by file name. The root is always `EntryId(0)`.
#[derive(Debug)]
pub struct FsTree {
    entries: Vec<Entry>,
    map: FxHashMap<Arc<Path>, EntryId>,
}

#[derive(Debug)]
pub struct Entry {
    pub id: EntryId,
    pub path: Arc<Path>,
    pub metadata: fs::Metadata,
    pub file_name: String,
    pub file_type: fs::FileType,
    pub parent: Option<EntryId>,
    pub children: Vec<EntryId>,
    pub depth: usize,
}

#[derive(Default, Debug)]
struct FsMetadata(Option<fs::Metadata>);

/// How far below the root a walk descends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Only the root and its immediate children.
    Shallow,
    Unbounded,
}

/// Whether a walk visits entries whose names start with `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hidden {
    Skip,
    Include,
}

impl FsTree {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            entries: vec![],
        }
    }

    /// Walks `root` recursively. Hidden files are skipped.
    pub fn build<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::walk(root.as_ref(), Depth::Unbounded, Hidden::Skip)
    }

    /// Walks `root` and its immediate children only. Hidden files are skipped.
    pub fn shallow<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::walk(root.as_ref(), Depth::Shallow, Hidden::Skip)
    }

    /// Walks `root`. Any entry that cannot be read fails the whole walk.
    pub fn walk(root: &Path, depth: Depth, hidden: Hidden) -> Result<Self> {
        use jwalk::WalkDirGeneric;

        let mut walker = WalkDirGeneric::<FsMetadata>::new(root)
            .sort(true)
            .skip_hidden(hidden == Hidden::Skip)
            .follow_links(true)
            .process_read_dir(|_, _, _, entries| {
                entries.iter_mut()
                    .filter_map(|e| e.as_mut().ok())
                    .for_each(|e| e.client_state = FsMetadata(e.metadata().ok()))
            });

        if depth == Depth::Shallow {
            walker = walker.max_depth(1);
        }

        let mut tree = FsTree::new();
        for entry in walker {
            let mut entry = entry.chain_with(|| error! {
                "failed to walk directory",
                "search root" => root.display(),
            })?;

            // The root's state is never set by `process_read_dir`.
            let metadata = match entry.client_state.0.take() {
                Some(metadata) => metadata,
                None if entry.depth == 0 => match fs::metadata(root) {
                    Ok(metadata) => metadata,
                    Err(_) => continue,
                },
                None => continue,
            };

            tree.insert(entry, metadata);
        }

        if tree.len() == 0 {
            return err! {
                "file system tree discovery yielded zero files",
                "search root" => root.display(),
            }
        }

        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn root(&self) -> &Entry {
        &self[self.root_id()]
    }

    pub fn root_id(&self) -> EntryId {
        EntryId(0)
    }

    /// Looks up `path` relative to `root`, or to the tree root if `None`.
    #[inline]
    pub fn get<R, P>(&self, root: R, path: P) -> Option<&Entry>
        where R: Into<Option<EntryId>>, P: AsRef<Path>
    {
        let root = root.into().unwrap_or(self.root_id());
        let full_path = self[root].path.join(path.as_ref());
        self.map.get(&*full_path).map(|id| &self[*id])
    }

    /// The direct children of `id`, in sorted order.
    pub fn children(&self, id: EntryId) -> impl Iterator<Item = &Entry> + '_ {
        self[id].children.iter().map(move |child| &self[*child])
    }

    /// Visits `root` and its descendants depth-first. Returning `false` from
    /// `progress` prunes the subtree below the visited entry.
    pub fn depth_first_search<F>(&self, root: EntryId, mut progress: F)
        where F: FnMut(&Entry) -> bool
    {
        fn _dfs<F: FnMut(&Entry) -> bool>(tree: &FsTree, root: EntryId, progress: &mut F) {
            let entry = &tree[root];
            if progress(entry) {
                for &child in &entry.children {
                    _dfs(tree, child, progress)
                }
            }
        }

        _dfs(self, root, &mut progress)
    }

    fn insert(&mut self, entry: jwalk::DirEntry<FsMetadata>, metadata: fs::Metadata) -> EntryId {
        let entry = Entry {
            id: EntryId(self.entries.len()),
            path: Arc::from(entry.path().into_boxed_path()),
            metadata,
            file_type: entry.file_type,
            file_name: entry.file_name.to_string_lossy().into_owned(),
            parent: self.map.get(&entry.parent_path).cloned(),
            children: vec![],
            depth: entry.depth,
        };

        self.map.insert(entry.path.clone(), entry.id);
        if let Some(parent) = entry.parent {
            self.entries[parent.0].children.push(entry.id);
        }

        let id = entry.id;
        self.entries.push(entry);
        id
    }
}

impl Entry {
    /// File name without the extension.
    pub fn file_stem(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((left, _)) => left,
            None => &self.file_name,
        }
    }

    /// The last extension, if any.
    pub fn file_ext(&self) -> Option<&str> {
        self.file_name.rsplit_once('.').map(|(_, right)| right)
    }

    pub fn is_file(&self) -> bool {
        self.metadata.is_file()
    }

    pub fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }

    /// Path relative to `other`. `other` must be an ancestor of `self`.
    pub fn path_relative_to(&self, other: &Entry) -> Option<&Path> {
        self.path.strip_prefix(&other.path).ok()
    }
}

impl jwalk::ClientState for FsMetadata {
    type ReadDirState = ();
    type DirEntryState = Self;
}

impl std::ops::Index<EntryId> for FsTree {
    type Output = Entry;

    fn index(&self, index: EntryId) -> &Self::Output {
        &self.entries[index.0]
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
