use std::cell::RefCell;
use std::rc::Rc;

use derive_more::Display;
use hashlink::LinkedHashMap;
use tracing::debug;

use crate::filesystem::{Descriptor, DescriptorFlags, ErrorCode};

/// Kind of a filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EntryKind {
    #[display("file")]
    File,
    #[display("directory")]
    Directory,
}

/// Stable handle to an entry stored in a [`NodeArena`].
///
/// The generation changes whenever a slot is reclaimed, so a handle issued
/// before a [`Filesystem::sweep`] never aliases a newer entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct File {
    data: Vec<u8>,
}

impl File {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bytes in `[offset, offset + len)`, clamped to the buffer.
    pub fn slice(&self, offset: u64, len: u64) -> &[u8] {
        let available = self.data.len();
        let clamp = |position: u64| usize::try_from(position).map_or(available, |p| p.min(available));
        &self.data[clamp(offset)..clamp(offset.saturating_add(len))]
    }

    /// Writes `bytes` at `offset`, zero-filling any gap past the current end.
    pub fn write_at(&mut self, offset: u64, bytes: &[u8]) -> Result<(), ErrorCode> {
        let start = usize::try_from(offset).map_err(|_| ErrorCode::Invalid)?;
        let end = start.checked_add(bytes.len()).ok_or(ErrorCode::Invalid)?;
        if self.data.len() < end {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(bytes);
        Ok(())
    }

    pub fn set_size(&mut self, size: u64) -> Result<(), ErrorCode> {
        let size = usize::try_from(size).map_err(|_| ErrorCode::Invalid)?;
        self.data.resize(size, 0);
        Ok(())
    }

    pub fn truncate(&mut self) {
        self.data.clear();
    }
}

/// Directory contents, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    entries: LinkedHashMap<String, NodeId>,
}

impl Directory {
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.entries.iter().map(|(name, &id)| (name.as_str(), id))
    }
}

#[derive(Debug, Clone)]
pub enum Entry {
    File(File),
    Directory(Directory),
}

impl Entry {
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::File(_) => EntryKind::File,
            Entry::Directory(_) => EntryKind::Directory,
        }
    }
}

/// What [`NodeArena::traverse`] may create for missing segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreatePolicy {
    #[default]
    Nothing,
    /// Missing intermediate segments become directories, a missing final
    /// segment becomes an empty file.
    File,
    /// Every missing segment becomes a directory.
    Directory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Traversal {
    pub create: CreatePolicy,
    pub remove: bool,
}

impl Traversal {
    pub fn lookup() -> Self {
        Self::default()
    }

    pub fn create(create: CreatePolicy) -> Self {
        Self {
            create,
            remove: false,
        }
    }

    pub fn remove() -> Self {
        Self {
            create: CreatePolicy::Nothing,
            remove: true,
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Storage for every entry of one tree.
///
/// Unlinking a name only detaches the entry: its slot survives until
/// [`NodeArena::sweep`], so descriptors issued earlier keep working.
#[derive(Debug)]
pub struct NodeArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                entry: Some(Entry::Directory(Directory::default())),
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Stores `entry` in a free slot, or a new one when none is free.
    ///
    /// Fails with `Invalid` once the arena holds `u32::MAX` slots.
    pub fn insert(&mut self, entry: Entry) -> Result<NodeId, ErrorCode> {
        if let Some(id) = self.free.pop() {
            let slot = self.slot_mut(id)?;
            slot.entry = Some(entry);
            return Ok(NodeId {
                index: id,
                generation: slot.generation,
            });
        }
        let index = u32::try_from(self.slots.len()).map_err(|_| ErrorCode::Invalid)?;
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        Ok(NodeId {
            index,
            generation: 0,
        })
    }

    fn slot_mut(&mut self, index: u32) -> Result<&mut Slot, ErrorCode> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.slots.get_mut(index))
            .ok_or(ErrorCode::NoEntry)
    }

    pub fn get(&self, id: NodeId) -> Result<&Entry, ErrorCode> {
        usize::try_from(id.index)
            .ok()
            .and_then(|index| self.slots.get(index))
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
            .ok_or(ErrorCode::NoEntry)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Entry, ErrorCode> {
        self.slot_mut(id.index)
            .ok()
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
            .ok_or(ErrorCode::NoEntry)
    }

    pub fn directory(&self, id: NodeId) -> Result<&Directory, ErrorCode> {
        match self.get(id)? {
            Entry::Directory(directory) => Ok(directory),
            Entry::File(_) => Err(ErrorCode::NotDirectory),
        }
    }

    fn directory_mut(&mut self, id: NodeId) -> Result<&mut Directory, ErrorCode> {
        match self.get_mut(id)? {
            Entry::Directory(directory) => Ok(directory),
            Entry::File(_) => Err(ErrorCode::NotDirectory),
        }
    }

    pub fn file(&self, id: NodeId) -> Result<&File, ErrorCode> {
        match self.get(id)? {
            Entry::File(file) => Ok(file),
            Entry::Directory(_) => Err(ErrorCode::IsDirectory),
        }
    }

    pub fn file_mut(&mut self, id: NodeId) -> Result<&mut File, ErrorCode> {
        match self.get_mut(id)? {
            Entry::File(file) => Ok(file),
            Entry::Directory(_) => Err(ErrorCode::IsDirectory),
        }
    }

    /// Adds `entry` under `name` in the directory `parent`, replacing any
    /// entry of the same name.
    ///
    /// Names that `traverse` could never resolve (empty, `.`, `..` or
    /// containing `/`) are rejected with `Invalid`.
    pub fn link(&mut self, parent: NodeId, name: &str, entry: Entry) -> Result<NodeId, ErrorCode> {
        if !is_linkable_name(name) {
            return Err(ErrorCode::Invalid);
        }
        self.directory(parent)?;
        let child = self.insert(entry)?;
        self.directory_mut(parent)?
            .entries
            .insert(name.to_owned(), child);
        Ok(child)
    }

    /// Resolves a `/`-separated `path` relative to the directory `start`.
    ///
    /// Empty, `.` and `..` segments never move the cursor. With
    /// `traversal.remove` the final segment is unlinked and the detached entry
    /// is returned.
    pub fn traverse(
        &mut self,
        start: NodeId,
        path: &str,
        traversal: Traversal,
    ) -> Result<NodeId, ErrorCode> {
        let mut current = start;
        let mut segments = path.split('/').peekable();

        while let Some(segment) = segments.next() {
            let is_last = segments.peek().is_none();
            let existing = self.directory(current)?.get(segment);

            if matches!(segment, "" | "." | "..") {
                continue;
            }

            if is_last && traversal.remove {
                let removed = self
                    .directory_mut(current)?
                    .entries
                    .remove(segment)
                    .ok_or(ErrorCode::NoEntry)?;
                debug!("Unlinked '{}' from {:?}", segment, current);
                return Ok(removed);
            }

            current = match (existing, traversal.create, is_last) {
                (Some(child), _, _) => child,
                (None, CreatePolicy::Directory, _) | (None, CreatePolicy::File, false) => {
                    debug!("Creating directory '{}' in {:?}", segment, current);
                    self.link(current, segment, Entry::Directory(Directory::default()))?
                }
                (None, CreatePolicy::File, true) => {
                    debug!("Creating file '{}' in {:?}", segment, current);
                    self.link(current, segment, Entry::File(File::default()))?
                }
                (None, CreatePolicy::Nothing, _) => return Err(ErrorCode::NoEntry),
            };
        }

        Ok(current)
    }

    /// Frees every slot unreachable from the root, returning how many were freed.
    pub fn sweep(&mut self) -> usize {
        let mut reachable = vec![false; self.slots.len()];
        let mut pending = vec![self.root];
        while let Some(id) = pending.pop() {
            if let Some(mark) = usize::try_from(id.index)
                .ok()
                .and_then(|index| reachable.get_mut(index))
            {
                *mark = true;
            }
            if let Ok(directory) = self.directory(id) {
                pending.extend(directory.entries.values().copied());
            }
        }

        let mut freed = 0;
        for (index, slot) in (0u32..).zip(self.slots.iter_mut()) {
            let is_reachable = usize::try_from(index)
                .ok()
                .and_then(|index| reachable.get(index).copied())
                .unwrap_or(false);
            if slot.entry.is_some() && !is_reachable {
                slot.entry = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index);
                freed += 1;
            }
        }
        debug!("Swept {} detached entries", freed);
        freed
    }
}

fn is_linkable_name(name: &str) -> bool {
    !matches!(name, "" | "." | "..") && !name.contains('/')
}

/// Shared handle to one in-memory tree.
///
/// Clones alias the same tree; the tree lives as long as any clone,
/// descriptor or stream does.
#[derive(Debug, Clone, Default)]
pub struct Filesystem {
    arena: Rc<RefCell<NodeArena>>,
}

impl Filesystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_arena(arena: NodeArena) -> Self {
        Self {
            arena: Rc::new(RefCell::new(arena)),
        }
    }

    /// Descriptor over the root directory.
    pub fn root(&self) -> Descriptor {
        let root = self.arena.borrow().root();
        Descriptor::new(
            self.arena.clone(),
            root,
            DescriptorFlags::READ | DescriptorFlags::MUTATE_DIRECTORY,
        )
    }

    /// Reclaims the storage of unlinked entries.
    ///
    /// Descriptors and streams over swept entries fail afterwards.
    pub fn sweep(&self) -> usize {
        self.arena.borrow_mut().sweep()
    }
}
