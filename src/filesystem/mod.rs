//! In-memory filesystem exposed through capability descriptors.
//!
//! Entries live in a [`NodeArena`] shared by every [`Descriptor`] and stream
//! handed out for it. Paths are resolved one segment at a time by
//! [`NodeArena::traverse`], which also applies the creation and removal
//! policies of the descriptor operations.

mod conversion;
mod descriptor;
mod directory_stream;
mod error;
mod flags;
mod streams;
mod tree;

pub use conversion::{IntoTreeOptions, TreeMap, TreeNode, directory_from_tree, directory_into_tree};
pub use descriptor::{Descriptor, DescriptorStat, MetadataHashValue};
pub use directory_stream::{DirectoryEntry, DirectoryEntryStream};
pub use error::{ErrorCode, StreamError};
pub use flags::{DescriptorFlags, OpenFlags, PathFlags};
pub use streams::{ReadStream, WRITE_CAPACITY_HINT, WriteStream};
pub use tree::{
    CreatePolicy, Directory, Entry, EntryKind, File, Filesystem, NodeArena, NodeId, Traversal,
};
