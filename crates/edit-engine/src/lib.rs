#![warn(missing_docs)]
//! Edit Engine - rope-backed text buffer, live regions and undo history
//!
//! # Overview
//!
//! `edit-engine` is the text core of an editor backend. It owns the document text, keeps cursors
//! and selections valid while the text changes, and records every edit so it can be undone. It
//! has no notion of views, commands, key bindings or rendering; those layers drive it through
//! `insert`/`erase`/`substr` and change subscriptions.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  UndoStack (linear history, glue, hard/soft)│  ← Edit history
//! ├─────────────────────────────────────────────┤
//! │  Action (insert / erase / composite)        │  ← Reversible edits
//! ├─────────────────────────────────────────────┤
//! │  RegionSet (normalized, follows edits)      │  ← Cursors & markers
//! ├─────────────────────────────────────────────┤
//! │  Buffer (queries, search, notifications)    │  ← Document text
//! ├─────────────────────────────────────────────┤
//! │  Rope (weighted binary tree of codepoints)  │  ← Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! All positions are **codepoint offsets** (`usize`) and out-of-range input is clamped rather than
//! rejected.
//!
//! # Quick Start
//!
//! ```rust
//! use edit_engine::{Action, Buffer, Region, RegionSet, UndoStack};
//!
//! let mut buffer = Buffer::from_text("Hello World!");
//! let cursors = RegionSet::from_iter([Region::point(5)]).attach(&mut buffer);
//! let mut history = UndoStack::new();
//!
//! let mut action = Action::insert(&buffer, 0, ">> ");
//! action.apply(&mut buffer);
//! history.add(action, true);
//!
//! assert_eq!(buffer.to_string(), ">> Hello World!");
//! assert_eq!(cursors.borrow().regions(), &[Region::point(8)]);
//!
//! history.undo(&mut buffer, false);
//! assert_eq!(buffer.to_string(), "Hello World!");
//! assert_eq!(cursors.borrow().regions(), &[Region::point(5)]);
//! ```
//!
//! # Module Description
//!
//! - [`rope`] - weighted rope storage
//! - [`buffer`] - text buffer, boundary queries and change notifications
//! - [`region`] / [`region_set`] - intervals and self-adjusting interval sets
//! - [`action`] / [`undo`] - reversible edits and the history that records them
//! - [`search`] - literal and regex search in codepoint offsets
//! - [`config`] - per-instance tuning
//!
//! # Logging
//!
//! The crate emits [`tracing`] events (rope rebalancing, undo/redo steps, glue) and never installs
//! a subscriber itself.

pub mod action;
pub mod buffer;
pub mod config;
pub mod region;
pub mod region_set;
pub mod rope;
pub mod search;
pub mod undo;

pub use action::{Action, CompositeAction, EraseAction, InsertAction};
pub use buffer::{Buffer, ChangeCallback, SubscriptionId};
pub use config::{BufferConfig, ConfigError};
pub use region::{Region, clamp};
pub use region_set::{RegionSet, SharedRegionSet};
pub use rope::Rope;
pub use search::{SearchError, SearchOptions};
pub use undo::UndoStack;
