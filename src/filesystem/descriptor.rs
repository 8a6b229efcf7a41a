use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::clocks::Datetime;
use crate::filesystem::{
    CreatePolicy, DescriptorFlags, DirectoryEntry, DirectoryEntryStream, Entry, EntryKind,
    ErrorCode, NodeArena, NodeId, OpenFlags, PathFlags, ReadStream, Traversal, WriteStream,
};

/// Entries never have more than one name.
const LINK_COUNT: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorStat {
    pub kind: EntryKind,
    pub link_count: u64,
    pub size: u64,
    pub data_access_timestamp: Option<Datetime>,
    pub data_modification_timestamp: Option<Datetime>,
    pub status_change_timestamp: Option<Datetime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetadataHashValue {
    pub lower: u64,
    pub upper: u64,
}

/// Capability handle over one entry of a [`Filesystem`](crate::filesystem::Filesystem).
///
/// Descriptors alias the tree: a descriptor over an entry that is later
/// unlinked keeps reading and writing it until the tree is swept.
#[derive(Debug, Clone)]
pub struct Descriptor {
    arena: Rc<RefCell<NodeArena>>,
    node: NodeId,
    flags: DescriptorFlags,
}

impl Descriptor {
    pub(crate) fn new(arena: Rc<RefCell<NodeArena>>, node: NodeId, flags: DescriptorFlags) -> Self {
        Self { arena, node, flags }
    }

    fn sibling(&self, node: NodeId, flags: DescriptorFlags) -> Self {
        Self::new(self.arena.clone(), node, flags)
    }

    fn resolve(&self, path: &str, traversal: Traversal) -> Result<NodeId, ErrorCode> {
        self.arena.borrow_mut().traverse(self.node, path, traversal)
    }

    fn kind_of(&self, node: NodeId) -> Result<EntryKind, ErrorCode> {
        Ok(self.arena.borrow().get(node)?.kind())
    }

    pub fn get_type(&self) -> Result<EntryKind, ErrorCode> {
        self.kind_of(self.node)
    }

    pub fn get_flags(&self) -> DescriptorFlags {
        self.flags
    }

    pub fn is_same_object(&self, other: &Descriptor) -> bool {
        Rc::ptr_eq(&self.arena, &other.arena) && self.node == other.node
    }

    pub fn stat(&self) -> Result<DescriptorStat, ErrorCode> {
        let arena = self.arena.borrow();
        let entry = arena.get(self.node)?;
        let size = match entry {
            Entry::File(file) => file.size(),
            Entry::Directory(_) => 0,
        };
        Ok(DescriptorStat {
            kind: entry.kind(),
            link_count: LINK_COUNT,
            size,
            data_access_timestamp: None,
            data_modification_timestamp: None,
            status_change_timestamp: None,
        })
    }

    pub fn stat_at(&self, _path_flags: PathFlags, path: &str) -> Result<DescriptorStat, ErrorCode> {
        trace!("stat_at '{}'", path);
        if self.get_type()? != EntryKind::Directory {
            return Err(ErrorCode::Invalid);
        }
        let node = self.resolve(path, Traversal::lookup())?;
        self.sibling(node, self.flags).stat()
    }

    /// Content hashing is not performed; the hash is always zero.
    pub fn metadata_hash(&self) -> Result<MetadataHashValue, ErrorCode> {
        Ok(MetadataHashValue::default())
    }

    pub fn metadata_hash_at(
        &self,
        _path_flags: PathFlags,
        _path: &str,
    ) -> Result<MetadataHashValue, ErrorCode> {
        Ok(MetadataHashValue::default())
    }

    pub fn open_at(
        &self,
        _path_flags: PathFlags,
        path: &str,
        open_flags: OpenFlags,
        descriptor_flags: DescriptorFlags,
    ) -> Result<Descriptor, ErrorCode> {
        trace!("open_at '{}' with {:?}", path, open_flags);
        let create = if open_flags.contains(OpenFlags::CREATE) {
            CreatePolicy::File
        } else {
            CreatePolicy::Nothing
        };
        let node = self.resolve(path, Traversal::create(create))?;

        let kind = self.kind_of(node)?;
        if open_flags.contains(OpenFlags::DIRECTORY) {
            if kind != EntryKind::Directory {
                return Err(ErrorCode::NotDirectory);
            }
        } else if kind == EntryKind::Directory {
            return Err(ErrorCode::IsDirectory);
        }

        if open_flags.contains(OpenFlags::TRUNCATE) {
            self.arena.borrow_mut().file_mut(node)?.truncate();
        }

        Ok(self.sibling(node, descriptor_flags))
    }

    /// Reads up to `length` bytes at `offset`; the flag reports whether the
    /// requested range reaches the end of the file.
    pub fn read(&self, length: u64, offset: u64) -> Result<(Vec<u8>, bool), ErrorCode> {
        let arena = self.arena.borrow();
        let file = arena.file(self.node)?;
        let bytes = file.slice(offset, length).to_vec();
        let end = offset.saturating_add(length) >= file.size();
        Ok((bytes, end))
    }

    /// Direct writes are not available; use [`Descriptor::write_via_stream`].
    pub fn write(&self, _buffer: &[u8], _offset: u64) -> Result<u64, ErrorCode> {
        Err(ErrorCode::Unsupported)
    }

    pub fn read_via_stream(&self, offset: u64) -> Result<ReadStream, ErrorCode> {
        self.arena.borrow().file(self.node)?;
        Ok(ReadStream::new(self.arena.clone(), self.node, offset))
    }

    pub fn write_via_stream(&self, offset: u64) -> Result<WriteStream, ErrorCode> {
        self.arena.borrow().file(self.node)?;
        Ok(WriteStream::new(self.arena.clone(), self.node, offset))
    }

    pub fn append_via_stream(&self) -> Result<WriteStream, ErrorCode> {
        let size = self.arena.borrow().file(self.node)?.size();
        Ok(WriteStream::new(self.arena.clone(), self.node, size))
    }

    pub fn set_size(&self, size: u64) -> Result<(), ErrorCode> {
        self.arena.borrow_mut().file_mut(self.node)?.set_size(size)
    }

    pub fn read_directory(&self) -> Result<DirectoryEntryStream, ErrorCode> {
        let arena = self.arena.borrow();
        let entries = arena
            .directory(self.node)?
            .iter()
            .filter_map(|(name, id)| {
                let kind = arena.get(id).ok()?.kind();
                Some(DirectoryEntry {
                    kind,
                    name: name.to_owned(),
                })
            })
            .collect();
        Ok(DirectoryEntryStream::new(entries))
    }

    pub fn create_directory_at(&self, path: &str) -> Result<(), ErrorCode> {
        trace!("create_directory_at '{}'", path);
        self.resolve(path, Traversal::create(CreatePolicy::Directory))?;
        Ok(())
    }

    pub fn unlink_file_at(&self, path: &str) -> Result<(), ErrorCode> {
        trace!("unlink_file_at '{}'", path);
        let node = self.resolve(path, Traversal::lookup())?;
        if self.kind_of(node)? == EntryKind::Directory {
            return Err(ErrorCode::IsDirectory);
        }
        self.resolve(path, Traversal::remove())?;
        Ok(())
    }

    pub fn remove_directory_at(&self, path: &str) -> Result<(), ErrorCode> {
        trace!("remove_directory_at '{}'", path);
        let node = self.resolve(path, Traversal::lookup())?;
        if self.kind_of(node)? != EntryKind::Directory {
            return Err(ErrorCode::NotDirectory);
        }
        self.resolve(path, Traversal::remove())?;
        Ok(())
    }
}
