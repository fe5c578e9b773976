//! showexpr Core Library
//!
//! `show!` prints each argument as `<expression> = <value>` and hands the
//! value back, so it can wrap any expression in place:
//!
//! ```ignore
//! use showexpr_core::show;
//!
//! let x = 5;
//! let y = 10;
//! let z = show!(x + y) * 2; // prints `x + y = 15`
//! ```
//!
//! The expression text is recovered by, in order:
//! - the latest input of an interactive session, when a history is attached
//! - the call's own source, parsed with `syn`
//! - matching the values against a caller-supplied [`Scope`]
//!
//! Anything still unnamed is printed as [`PLACEHOLDER`].

pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod history;
pub mod matcher;
pub mod show;
pub mod source;
pub mod value;

mod macros;

/// Label of a value whose expression could not be recovered
pub const PLACEHOLDER: &str = "<expression>";

pub use config::ShowConfig;
pub use context::{Binding, CallSite, Handle, Probe, Scope};
pub use error::ShowError;
pub use extract::{extract_call_args, CallQuery};
pub use history::{FileHistory, HistoryEntry, HistoryProvider, MemoryHistory};
pub use matcher::match_names;
pub use show::{LabelProvider, LabelRequest, Show};
pub use source::SourceLoader;
pub use value::Value;
