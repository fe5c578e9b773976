//! Call context
//!
//! Rust has no frame introspection, so the context of a `show!` call is made
//! explicit: the macro records where it was invoked ([`CallSite`]) and the
//! caller may pass the bindings it wants the fallback matcher to consider
//! ([`Scope`]).

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

use crate::value::Value;

/// Source location of a `show!` invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// File name as reported by `file!()`, or a synthetic `<...>` name
    pub file: String,
    /// 1-based line
    pub line: u32,
    /// 1-based column, 0 when unknown
    pub column: u32,
    pub module_path: String,
    /// `CARGO_MANIFEST_DIR` of the crate that contains the call
    pub manifest_dir: Option<String>,
}

impl CallSite {
    pub fn new(
        file: &str,
        line: u32,
        column: u32,
        module_path: &str,
        manifest_dir: Option<&str>,
    ) -> Self {
        Self {
            file: file.to_string(),
            line,
            column,
            module_path: module_path.to_string(),
            manifest_dir: manifest_dir.map(str::to_string),
        }
    }

    /// A call site with only a file name and line, e.g. for in-memory sources
    pub fn at(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column: 0,
            module_path: String::new(),
            manifest_dir: None,
        }
    }

    /// Synthetic names like `<repl>` never refer to a file on disk
    pub fn is_synthetic(&self) -> bool {
        self.file.is_empty() || self.file.starts_with('<')
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Snapshot of a value: where it lives, what type it has, and its
/// elementary decoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handle {
    /// Address of the object. `None` for temporaries and zero-sized values.
    pub address: Option<usize>,
    pub type_name: String,
    pub value: Value,
}

impl Handle {
    /// Snapshot a value living at its own address (a binding)
    pub fn of<T: Debug + ?Sized>(value: &T) -> Self {
        Self::capture(value, Some(address_of(value)))
    }

    /// Snapshot a value whose identity is the given place address, or none.
    pub fn capture<T: Debug + ?Sized>(value: &T, address: Option<usize>) -> Self {
        let type_name = std::any::type_name::<T>();
        let address = address.filter(|_| std::mem::size_of_val(value) != 0);
        Self {
            address,
            type_name: type_name.to_string(),
            value: Value::classify(type_name, &format!("{:?}", value)),
        }
    }

    /// Same object: same address and same type
    pub fn is_same_object(&self, other: &Handle) -> bool {
        match (self.address, other.address) {
            (Some(a), Some(b)) => a == b && self.type_name == other.type_name,
            _ => false,
        }
    }
}

/// Address of a place, as recorded for identity matching
pub fn address_of<T: ?Sized>(place: &T) -> usize {
    place as *const T as *const () as usize
}

/// Pointer to a place, taken before its value is moved out.
///
/// Kept generic so a path whose type is only known later (`None`) is inferred
/// together with the moved value through [`place_address`].
#[doc(hidden)]
pub fn place_of<T: ?Sized>(place: &T) -> *const T {
    place
}

/// Address recorded by [`place_of`], typed by the value moved out of it
#[doc(hidden)]
pub fn place_address<T: ?Sized>(place: *const T, _moved: &T) -> usize {
    place as *const () as usize
}

/// A named local visible to the fallback matcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub handle: Handle,
}

impl Binding {
    pub fn new<T: Debug + ?Sized>(name: impl Into<String>, value: &T) -> Self {
        Self {
            name: name.into(),
            handle: Handle::of(value),
        }
    }

    /// Leading underscore marks a binding as private to equality matching
    pub fn is_private(&self) -> bool {
        self.name.starts_with('_')
    }
}

/// Ordered bindings standing in for the caller's locals.
///
/// Iteration order is declaration order. Bindings are snapshots, so the
/// variables may be moved (e.g. into `show!`) after the scope is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    bindings: Vec<Binding>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding, builder style
    pub fn bind<T: Debug + ?Sized>(mut self, name: impl Into<String>, value: &T) -> Self {
        self.insert(name, value);
        self
    }

    /// Add a binding. Rebinding a name keeps its position and replaces the
    /// snapshot, like shadowing a local.
    pub fn insert<T: Debug + ?Sized>(&mut self, name: impl Into<String>, value: &T) {
        let binding = Binding::new(name, value);
        match self.bindings.iter_mut().find(|b| b.name == binding.name) {
            Some(existing) => *existing = binding,
            None => self.bindings.push(binding),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// One argument of a `show!` call
pub struct Probe<'a> {
    value: &'a dyn Debug,
    handle: Handle,
}

impl<'a> Probe<'a> {
    /// `place` is the address of the variable the argument was moved out of,
    /// when the argument is a bare identifier.
    pub fn new<T: Debug>(value: &'a T, place: Option<usize>) -> Self {
        Self {
            value,
            handle: Handle::capture(value, place),
        }
    }

    pub fn value(&self) -> &'a dyn Debug {
        self.value
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Debug for Probe<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probe")
            .field("value", &self.value)
            .field("handle", &self.handle)
            .finish()
    }
}
