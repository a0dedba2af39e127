//! Bookkeeping behind a `ReaderWriterLock`.

use std::collections::HashMap;
use std::thread::ThreadId;

/// Which kind of access currently holds the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Reader,
    Writer,
}

impl Owner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Owner::Reader => "reader",
            Owner::Writer => "writer",
        }
    }
}

/// Mutable state, only ever touched under the lock's internal mutex.
///
/// While `writer` is set, `readers` is empty or holds only the writer itself.
#[derive(Debug, Default)]
pub(super) struct LockState {
    pub(super) writer: Option<ThreadId>,
    pub(super) writer_depth: usize,
    pub(super) readers: HashMap<ThreadId, usize>,
    pub(super) pending_writers: usize,
}

impl LockState {
    pub(super) fn owner(&self) -> Option<Owner> {
        if self.writer.is_some() {
            Some(Owner::Writer)
        } else if !self.readers.is_empty() {
            Some(Owner::Reader)
        } else {
            None
        }
    }

    /// New readers wait while a writer holds the lock or is queued for it.
    pub(super) fn blocks_new_readers(&self) -> bool {
        self.writer.is_some() || self.pending_writers > 0
    }

    pub(super) fn blocks_writers(&self) -> bool {
        self.writer.is_some() || !self.readers.is_empty()
    }

    pub(super) fn is_idle(&self) -> bool {
        self.writer.is_none() && self.readers.is_empty() && self.pending_writers == 0
    }
}
