//! # stella-gc
//!
//! A precise, generational, moving garbage collector core for the Stella
//! runtime: a bump allocator, a Cheney/Siebert-style copying traversal with
//! the classic iterative "chase" loop, a two-generation extension (young
//! single-space, old two-space) with an inter-generational remembered set,
//! and a precise root registry.
//!
//! ## Scope
//!
//! This crate implements the memory manager only. The object header/tag
//! layout, the compiled mutator code that calls [`gc::Collector::allocate`]
//! and the barriers, and any host-language printing surface beyond the two
//! specified stats printers, are the embedder's responsibility. The
//! collector is generic over the embedder's header format via
//! [`HeapValue`].
//!
//! ## Example
//!
//! ```
//! use stella_gc::{Collector, CollectorConfig, HeapValue, TaggedObject, Word};
//! use stella_gc::gc::header;
//!
//! let mut gc = Collector::<TaggedObject>::new(CollectorConfig::default()).unwrap();
//!
//! // Allocate a 2-field cons cell and initialize it before publishing it
//! // to any root.
//! let cons = gc.allocate(2).unwrap();
//! unsafe {
//!     header::write_header(cons, TaggedObject::encode(0, 2));
//!     header::write_field(cons, 0, 0);
//!     header::write_field(cons, 1, 0);
//! }
//!
//! let mut root: Word = cons;
//! gc.push_root(&mut root as *mut Word).unwrap();
//! gc.pop_root(&mut root as *mut Word).unwrap();
//! ```

#![warn(missing_docs, rust_2018_idioms)]

/// Collector configuration and its builder.
pub mod config;
/// The collector error type.
pub mod error;
/// The garbage collection core: regions, roots, remembered set, forwarding,
/// and the collector driver.
pub mod gc;

pub use config::{CollectorConfig, CollectorConfigBuilder};
pub use error::GcError;
pub use gc::{Collector, GcStats, HeapValue, TaggedObject, Word, WORD_SIZE};
