use crate::filesystem::{EntryKind, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub kind: EntryKind,
    pub name: String,
}

/// One-shot snapshot of a directory's entries.
///
/// Later changes to the directory are not observed.
#[derive(Debug, Clone)]
pub struct DirectoryEntryStream {
    entries: Vec<DirectoryEntry>,
    cursor: usize,
}

impl DirectoryEntryStream {
    pub(crate) fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries, cursor: 0 }
    }

    /// Next entry, or `None` once the snapshot is exhausted.
    pub fn read_directory_entry(&mut self) -> Result<Option<DirectoryEntry>, ErrorCode> {
        let entry = self.entries.get(self.cursor).cloned();
        if entry.is_some() {
            self.cursor += 1;
        }
        Ok(entry)
    }
}

impl Iterator for DirectoryEntryStream {
    type Item = DirectoryEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_directory_entry().ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::{DescriptorFlags, Filesystem, OpenFlags, PathFlags};

    #[test]
    fn yields_entries_in_insertion_order_then_end() {
        let root = Filesystem::new().root();
        root.create_directory_at("a").unwrap();
        for name in ["b", "c"] {
            root.open_at(
                PathFlags::empty(),
                name,
                OpenFlags::CREATE,
                DescriptorFlags::WRITE,
            )
            .unwrap();
        }

        let mut stream = root.read_directory().unwrap();
        assert_eq!(
            stream.read_directory_entry(),
            Ok(Some(DirectoryEntry {
                kind: EntryKind::Directory,
                name: "a".to_string()
            }))
        );
        assert_eq!(
            stream.read_directory_entry().unwrap().map(|entry| entry.name),
            Some("b".to_string())
        );
        assert_eq!(
            stream.read_directory_entry().unwrap().map(|entry| entry.kind),
            Some(EntryKind::File)
        );
        assert_eq!(stream.read_directory_entry(), Ok(None));
        assert_eq!(stream.read_directory_entry(), Ok(None));
    }

    #[test]
    fn snapshot_ignores_later_mutation() {
        let root = Filesystem::new().root();
        root.create_directory_at("a").unwrap();
        root.create_directory_at("b").unwrap();
        root.create_directory_at("c").unwrap();

        let stream = root.read_directory().unwrap();
        root.remove_directory_at("b").unwrap();
        root.create_directory_at("d").unwrap();

        let names: Vec<_> = stream.map(|entry| entry.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_directory_ends_immediately() {
        let root = Filesystem::new().root();
        let mut stream = root.read_directory().unwrap();
        assert_eq!(stream.read_directory_entry(), Ok(None));
    }
}
