//! NOTE: this crate is really just a shim for testing
//! the `slotq` crate without weighing the library down.

mod multi_thread;
