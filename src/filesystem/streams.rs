use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::filesystem::{NodeArena, NodeId, StreamError};

/// Capacity advertised by [`WriteStream::check_write`].
pub const WRITE_CAPACITY_HINT: u64 = 1_000_000;

/// Sequential reader over one file.
///
/// The cursor advances by the requested length even when fewer bytes were
/// available.
#[derive(Debug, Clone)]
pub struct ReadStream {
    arena: Rc<RefCell<NodeArena>>,
    node: NodeId,
    offset: u64,
}

impl ReadStream {
    pub(crate) fn new(arena: Rc<RefCell<NodeArena>>, node: NodeId, offset: u64) -> Self {
        Self { arena, node, offset }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns up to `len` bytes at the cursor. Reading at or past the end of
    /// the file signals [`StreamError::Closed`].
    pub fn read(&mut self, len: u64) -> Result<Vec<u8>, StreamError> {
        let arena = self.arena.borrow();
        let file = arena.file(self.node).map_err(|_| StreamError::Closed)?;
        if len > 0 && self.offset >= file.size() {
            return Err(StreamError::Closed);
        }
        let bytes = file.slice(self.offset, len).to_vec();
        trace!("Read {} of {} requested bytes at {}", bytes.len(), len, self.offset);
        self.offset = self.offset.saturating_add(len);
        Ok(bytes)
    }

    pub fn blocking_read(&mut self, len: u64) -> Result<Vec<u8>, StreamError> {
        self.read(len)
    }

    /// Moves the cursor by `len`, returning how many bytes were actually skipped.
    pub fn skip(&mut self, len: u64) -> Result<u64, StreamError> {
        let arena = self.arena.borrow();
        let file = arena.file(self.node).map_err(|_| StreamError::Closed)?;
        if len > 0 && self.offset >= file.size() {
            return Err(StreamError::Closed);
        }
        let skipped = file.slice(self.offset, len).len() as u64;
        self.offset = self.offset.saturating_add(len);
        Ok(skipped)
    }
}

/// Sequential writer over one file. Writes past the end zero-fill the gap.
#[derive(Debug, Clone)]
pub struct WriteStream {
    arena: Rc<RefCell<NodeArena>>,
    node: NodeId,
    offset: u64,
}

impl WriteStream {
    pub(crate) fn new(arena: Rc<RefCell<NodeArena>>, node: NodeId, offset: u64) -> Self {
        Self { arena, node, offset }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn check_write(&self) -> Result<u64, StreamError> {
        self.arena
            .borrow()
            .file(self.node)
            .map_err(|_| StreamError::Closed)?;
        Ok(WRITE_CAPACITY_HINT)
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        self.arena
            .borrow_mut()
            .file_mut(self.node)
            .and_then(|file| file.write_at(self.offset, bytes))
            .map_err(|_| StreamError::Closed)?;
        trace!("Wrote {} bytes at {}", bytes.len(), self.offset);
        self.offset = self.offset.saturating_add(bytes.len() as u64);
        Ok(())
    }

    pub fn write_zeroes(&mut self, len: u64) -> Result<(), StreamError> {
        let len = usize::try_from(len).map_err(|_| StreamError::Closed)?;
        self.write(&vec![0; len])
    }

    /// Writes land in the tree immediately, so flushing only checks the
    /// stream is still usable.
    pub fn flush(&mut self) -> Result<(), StreamError> {
        self.check_write().map(|_| ())
    }

    pub fn blocking_flush(&mut self) -> Result<(), StreamError> {
        self.flush()
    }

    pub fn blocking_write_and_flush(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        self.write(bytes)?;
        self.flush()
    }
}
