use bitflags::bitflags;

bitflags! {
    /// Flags controlling how a path is resolved.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PathFlags: u8 {
        /// Accepted for interface compatibility; the tree holds no symlinks.
        const SYMLINK_FOLLOW = 1 << 0;
    }
}

bitflags! {
    /// Flags controlling what [`Descriptor::open_at`](crate::filesystem::Descriptor::open_at) resolves to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OpenFlags: u8 {
        /// Create the file (and missing parent directories) if absent.
        const CREATE = 1 << 0;
        /// Fail unless the path resolves to a directory.
        const DIRECTORY = 1 << 1;
        /// Accepted for interface compatibility; existing files are opened anyway.
        const EXCLUSIVE = 1 << 2;
        /// Empty the resolved file.
        const TRUNCATE = 1 << 3;
    }
}

bitflags! {
    /// Access flags a descriptor was opened with. Recorded, not enforced.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DescriptorFlags: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const FILE_INTEGRITY_SYNC = 1 << 2;
        const DATA_INTEGRITY_SYNC = 1 << 3;
        const REQUESTED_WRITE_SYNC = 1 << 4;
        const MUTATE_DIRECTORY = 1 << 5;
    }
}
