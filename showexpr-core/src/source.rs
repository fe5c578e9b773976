//! Source acquisition
//!
//! Finds the text a call site came from. Candidates are returned best first:
//! the enclosing function, then the whole file (or the in-memory source
//! registered under a synthetic name).

use quote::ToTokens;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use syn::visit::{self, Visit};
use syn::{ImplItemFn, ItemFn, TraitItemFn};

use crate::context::CallSite;
use crate::error::ShowError;

/// Where a fragment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOrigin {
    EnclosingFn,
    File,
    Memory,
}

/// A piece of source plus the offsets that map its positions back to the
/// call site's numbering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFragment {
    pub text: String,
    pub line_offset: usize,
    pub column_offset: usize,
    pub origin: SourceOrigin,
}

/// Resolves call sites to source text
#[derive(Debug, Clone, Default)]
pub struct SourceLoader {
    roots: Vec<PathBuf>,
    memory: HashMap<String, String>,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra directories relative `file!()` paths are resolved against
    pub fn with_roots(mut self, roots: impl IntoIterator<Item = PathBuf>) -> Self {
        self.roots.extend(roots);
        self
    }

    /// Register source text for a file name, typically a synthetic one
    /// such as `<repl>` whose text exists nowhere on disk
    pub fn register(&mut self, file: impl Into<String>, text: impl Into<String>) {
        self.memory.insert(file.into(), text.into());
    }

    /// Candidate fragments for a call site, best first. Empty when no source
    /// can be found.
    pub fn acquire(&self, site: &CallSite) -> Vec<SourceFragment> {
        let (text, origin) = match self.read(site) {
            Ok(found) => found,
            Err(e) => {
                log::debug!("{}", e);
                return Vec::new();
            }
        };

        let mut fragments = Vec::with_capacity(2);
        match enclosing_fn(&text, site.line as usize) {
            Ok(Some(fragment)) => fragments.push(fragment),
            Ok(None) => log::trace!("{} is not inside a function", site),
            Err(e) => log::debug!("cannot carve enclosing function for {}: {}", site, e),
        }
        fragments.push(SourceFragment {
            text,
            line_offset: 0,
            column_offset: 0,
            origin,
        });
        fragments
    }

    fn read(&self, site: &CallSite) -> Result<(String, SourceOrigin), ShowError> {
        if !site.is_synthetic() {
            if let Some(path) = self.resolve(site) {
                // Scoped read: the handle is closed before parsing starts
                let text = std::fs::read_to_string(&path)?;
                log::trace!("read {} for {}", path.display(), site);
                return Ok((text, SourceOrigin::File));
            }
        }

        self.memory
            .get(&site.file)
            .map(|text| (text.clone(), SourceOrigin::Memory))
            .ok_or_else(|| ShowError::source_unavailable(&site.file))
    }

    /// Locate the file behind a `file!()` path.
    ///
    /// `file!()` is relative to wherever the compiler was invoked (usually
    /// the workspace root), so the calling crate's manifest dir, the current
    /// directory and their ancestors are all tried.
    pub fn resolve(&self, site: &CallSite) -> Option<PathBuf> {
        let file = Path::new(&site.file);
        if file.is_absolute() {
            return file.is_file().then(|| file.to_path_buf());
        }

        let mut bases: Vec<PathBuf> = Vec::new();
        if let Some(dir) = &site.manifest_dir {
            bases.extend(Path::new(dir).ancestors().map(Path::to_path_buf));
        }
        if let Ok(cwd) = std::env::current_dir() {
            bases.extend(cwd.ancestors().map(Path::to_path_buf));
        }
        bases.extend(self.roots.iter().cloned());

        bases
            .into_iter()
            .map(|base| base.join(file))
            .find(|candidate| candidate.is_file())
    }
}

/// Carve the innermost function containing `line` out of `text`, dedented.
fn enclosing_fn(text: &str, line: usize) -> Result<Option<SourceFragment>, ShowError> {
    let file = syn::parse_file(text.strip_prefix('\u{feff}').unwrap_or(text))?;

    let mut finder = FnFinder { line, best: None };
    finder.visit_file(&file);

    let Some((first, last)) = finder.best else {
        return Ok(None);
    };

    let lines: Vec<&str> = text.lines().skip(first - 1).take(last - first + 1).collect();
    let (text, column_offset) = dedent(&lines);
    Ok(Some(SourceFragment {
        text,
        line_offset: first - 1,
        column_offset,
        origin: SourceOrigin::EnclosingFn,
    }))
}

/// Tracks the smallest function line range that contains the target line
struct FnFinder {
    line: usize,
    best: Option<(usize, usize)>,
}

impl FnFinder {
    fn consider(&mut self, node: &impl ToTokens) {
        let mut trees = node.to_token_stream().into_iter();
        let Some(first) = trees.next() else {
            return;
        };
        let start = first.span().start().line;
        let end = trees.last().map_or(start, |t| t.span().end().line);

        if !(start..=end).contains(&self.line) {
            return;
        }
        let narrower = self.best.map_or(true, |(s, e)| end - start < e - s);
        if narrower {
            self.best = Some((start, end));
        }
    }
}

impl<'ast> Visit<'ast> for FnFinder {
    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        self.consider(node);
        visit::visit_item_fn(self, node);
    }

    fn visit_impl_item_fn(&mut self, node: &'ast ImplItemFn) {
        self.consider(node);
        visit::visit_impl_item_fn(self, node);
    }

    fn visit_trait_item_fn(&mut self, node: &'ast TraitItemFn) {
        if node.default.is_some() {
            self.consider(node);
        }
        visit::visit_trait_item_fn(self, node);
    }
}

/// Remove the space/tab prefix common to all non-blank lines.
///
/// Returns the joined text and the number of characters removed per line.
pub fn dedent(lines: &[&str]) -> (String, usize) {
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    let mut out = String::new();
    for line in lines {
        // Lines shorter than the indent are blank by construction
        out.push_str(line.get(indent..).unwrap_or("").trim_end_matches('\r'));
        out.push('\n');
    }
    // Leading whitespace is ASCII, so bytes == chars
    (out, indent)
}
