//! In-process reader-writer lock.
//!
//! A reentrant, write-preferring multiple-reader/single-writer lock for
//! threads of one process. It never touches the filesystem.
//!
//! # Reentrancy
//!
//! The same thread may nest read-in-read, write-in-write and read-in-write,
//! releasing once per acquisition. Taking write access while holding only
//! read access fails with [`LockError::Reentrancy`](crate::error::LockError)
//! instead of deadlocking against other readers.
//!
//! # Fairness
//!
//! A thread waiting for write access blocks admission of new readers, so
//! readers cannot starve writers. There is no ordering among waiting writers
//! or among waiting readers.
//!
//! # RAII Guards
//!
//! [`ReaderWriterLock::read_lock`] and [`ReaderWriterLock::write_lock`]
//! return guards that release on drop, including while unwinding from a
//! panic. Guards are tied to the acquiring thread and are not `Send`.

mod guard;
mod lock;
mod state;


pub use guard::{ReadGuard, WriteGuard};
pub use lock::ReaderWriterLock;
pub use state::Owner;
