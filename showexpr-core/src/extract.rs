//! Expression extractor
//!
//! Finds a call to the target (`show!(..)` or `show(..)`) in a piece of Rust
//! source and returns the literal text of each argument. The text is sliced
//! out of the source, never re-printed from the syntax tree, so spacing and
//! parentheses stay exactly as written.

use proc_macro2::{LineColumn, TokenStream, TokenTree};
use quote::ToTokens;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::visit::{self, Visit};
use syn::{Block, Expr, ExprCall, ExprPath, Macro, Path, Stmt, Token};

use crate::error::ShowError;
use crate::PLACEHOLDER;

/// Which call to look for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallQuery<'a> {
    /// Last path segment of the macro or function, e.g. `show`
    pub name: &'a str,
    /// 1-based line of the call in whole-file numbering
    pub line: Option<usize>,
    /// 1-based column, used to pick between calls sharing a line
    pub column: Option<usize>,
    /// Added to fragment-local line numbers to get whole-file numbers
    pub line_offset: usize,
    /// Added to fragment-local columns (indentation removed by dedenting)
    pub column_offset: usize,
}

impl<'a> CallQuery<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            line: None,
            column: None,
            line_offset: 0,
            column_offset: 0,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn at_column(mut self, column: usize) -> Self {
        self.column = (column > 0).then_some(column);
        self
    }

    pub fn with_offsets(mut self, line_offset: usize, column_offset: usize) -> Self {
        self.line_offset = line_offset;
        self.column_offset = column_offset;
        self
    }
}

/// Extract argument texts of the call to `target` on `target_line`
/// (or of the first call when no line is given).
///
/// Returns an empty vector when the source does not parse or no call with
/// recoverable arguments matches.
pub fn extract_call_args(
    source: &str,
    target: &str,
    target_line: Option<usize>,
    line_offset: usize,
) -> Vec<String> {
    let mut query = CallQuery::new(target).with_offsets(line_offset, 0);
    query.line = target_line;
    extract(source, &query)
}

/// Extract argument texts for a fully specified query
pub fn extract(source: &str, query: &CallQuery<'_>) -> Vec<String> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let calls = match find_calls(source, query.name) {
        Ok(calls) => calls,
        Err(e) => {
            log::debug!("source did not parse: {}", e);
            return Vec::new();
        }
    };

    let index = LineIndex::new(source);
    let recovered: Vec<(&Call, Vec<String>)> = calls
        .iter()
        .map(|call| (call, call.texts(&index)))
        .filter(|(_, texts)| !texts.is_empty())
        .collect();

    let Some(line) = query.line else {
        return recovered
            .into_iter()
            .next()
            .map(|(_, texts)| texts)
            .unwrap_or_default();
    };

    let mut on_line = recovered
        .into_iter()
        .filter(|(call, _)| call.start.line + query.line_offset == line)
        .peekable();

    let first = on_line.peek().map(|(_, texts)| texts.clone());
    if let Some(column) = query.column {
        if let Some((_, texts)) =
            on_line.find(|(call, _)| call.start.column + 1 + query.column_offset == column)
        {
            return texts;
        }
    }
    first.unwrap_or_default()
}

/// Parse the source and collect every call to `name` in traversal order
fn find_calls(source: &str, name: &str) -> Result<Vec<Call>, ShowError> {
    let mut finder = CallFinder {
        name,
        calls: Vec::new(),
    };

    match syn::parse_file(source) {
        Ok(file) => finder.visit_file(&file),
        Err(file_err) => {
            // Not a whole file: try a run of statements, e.g. one REPL line
            let stmts: Vec<Stmt> = Block::parse_within
                .parse_str(source)
                .map_err(|_| ShowError::from(file_err))?;
            for stmt in &stmts {
                finder.visit_stmt(stmt);
            }
        }
    }

    Ok(finder.calls)
}

/// A located call and the spans of its arguments
#[derive(Debug)]
struct Call {
    start: LineColumn,
    args: Vec<(LineColumn, LineColumn)>,
}

impl Call {
    fn texts(&self, index: &LineIndex<'_>) -> Vec<String> {
        self.args
            .iter()
            .map(|(start, end)| {
                index
                    .slice(*start, *end)
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .unwrap_or(PLACEHOLDER)
                    .to_string()
            })
            .collect()
    }
}

struct CallFinder<'a> {
    name: &'a str,
    calls: Vec<Call>,
}

impl CallFinder<'_> {
    fn record<'e>(&mut self, head: &impl ToTokens, args: impl IntoIterator<Item = &'e Expr>) {
        let Some((start, _)) = token_bounds(head) else {
            return;
        };
        let args = args.into_iter().filter_map(token_bounds).collect();
        self.calls.push(Call { start, args });
    }
}

impl<'ast> Visit<'ast> for CallFinder<'_> {
    fn visit_macro(&mut self, mac: &'ast Macro) {
        if path_ends_with(&mac.path, self.name) {
            if let Ok(args) = parse_args(strip_routing(&mac.tokens)) {
                self.record(&mac.path, &args);
                for arg in &args {
                    self.visit_expr(arg);
                }
            }
            return;
        }

        // Other macros (assert_eq!, println!, vec!) often wrap the call;
        // look inside when their body reads as a list of expressions.
        if let Ok(args) = parse_args(mac.tokens.clone()) {
            for arg in &args {
                self.visit_expr(arg);
            }
        }
    }

    fn visit_expr_call(&mut self, call: &'ast ExprCall) {
        if let Expr::Path(ExprPath { path, .. }) = call.func.as_ref() {
            if path_ends_with(path, self.name) {
                self.record(path, &call.args);
            }
        }
        visit::visit_expr_call(self, call);
    }
}

fn path_ends_with(path: &Path, name: &str) -> bool {
    path.segments.last().is_some_and(|seg| seg.ident == name)
}

fn parse_args(tokens: TokenStream) -> syn::Result<Punctuated<Expr, Token![,]>> {
    Punctuated::<Expr, Token![,]>::parse_terminated.parse2(tokens)
}

/// Drop a routing prefix such as `use printer, in scope;` from a macro body.
/// Arguments start after the last top-level `;`.
fn strip_routing(tokens: &TokenStream) -> TokenStream {
    let trees: Vec<TokenTree> = tokens.clone().into_iter().collect();
    let start = trees
        .iter()
        .rposition(|tree| matches!(tree, TokenTree::Punct(p) if p.as_char() == ';'))
        .map_or(0, |i| i + 1);
    trees[start..].iter().cloned().collect()
}

/// Start of the first token and end of the last token
fn token_bounds(node: &impl ToTokens) -> Option<(LineColumn, LineColumn)> {
    let mut trees = node.to_token_stream().into_iter();
    let first = trees.next()?;
    let last = trees.last().unwrap_or_else(|| first.clone());
    Some((first.span().start(), last.span().end()))
}

/// Maps `LineColumn` positions (1-based lines, 0-based char columns) to
/// byte offsets
struct LineIndex<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { source, starts }
    }

    fn offset(&self, pos: LineColumn) -> Option<usize> {
        let line_start = *self.starts.get(pos.line.checked_sub(1)?)?;
        let line = &self.source[line_start..];
        let line = &line[..line.find('\n').unwrap_or(line.len())];
        match line.char_indices().nth(pos.column) {
            Some((i, _)) => Some(line_start + i),
            None if line.chars().count() == pos.column => Some(line_start + line.len()),
            None => None,
        }
    }

    fn slice(&self, start: LineColumn, end: LineColumn) -> Option<&'a str> {
        let (start, end) = (self.offset(start)?, self.offset(end)?);
        self.source.get(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"fn main() {
    let x = 5;
    let y = 10;
    show!(x);
    let total = show!(x + y, add(3, 4));
    show!(
        x  *  (y - 1)
    );
    assert_eq!(show!(y), 10);
}
"#;

    #[test]
    fn test_single_argument_on_line() {
        assert_eq!(extract_call_args(SAMPLE, "show", Some(4), 0), ["x"]);
    }

    #[test]
    fn test_arguments_keep_their_spelling() {
        assert_eq!(
            extract_call_args(SAMPLE, "show", Some(5), 0),
            ["x + y", "add(3, 4)"]
        );
    }

    #[test]
    fn test_multiline_call() {
        assert_eq!(extract_call_args(SAMPLE, "show", Some(6), 0), ["x  *  (y - 1)"]);
    }

    #[test]
    fn test_call_nested_in_other_macro() {
        assert_eq!(extract_call_args(SAMPLE, "show", Some(9), 0), ["y"]);
    }

    #[test]
    fn test_first_call_without_line() {
        assert_eq!(extract_call_args(SAMPLE, "show", None, 0), ["x"]);
    }

    #[test]
    fn test_no_call_on_line() {
        assert!(extract_call_args(SAMPLE, "show", Some(2), 0).is_empty());
    }

    #[test]
    fn test_line_offset() {
        let fragment = "fn inner() {\n    show!(a - b);\n}\n";
        assert_eq!(extract_call_args(fragment, "show", Some(41), 39), ["a - b"]);
        assert!(extract_call_args(fragment, "show", Some(2), 39).is_empty());
    }

    #[test]
    fn test_unparseable_source() {
        assert!(extract_call_args("fn broken( {", "show", None, 0).is_empty());
    }

    #[test]
    fn test_statement_fragment() {
        assert_eq!(
            extract_call_args("show!(a, b, c)", "show", None, 0),
            ["a", "b", "c"]
        );
        assert_eq!(
            extract_call_args("let r = show(v[0] as f64);", "show", None, 0),
            ["v[0] as f64"]
        );
    }

    #[test]
    fn test_routing_prefix_is_skipped() {
        let source = "fn f() { show!(use printer, in scope; a.len(), \"s\"); }";
        assert_eq!(
            extract_call_args(source, "show", Some(1), 0),
            ["a.len()", "\"s\""]
        );
    }

    #[test]
    fn test_qualified_macro_path() {
        let source = "fn f() { showexpr_core::show![1 + 1]; }";
        assert_eq!(extract_call_args(source, "show", None, 0), ["1 + 1"]);
    }

    #[test]
    fn test_call_without_arguments_is_skipped() {
        let source = "fn f() {\n    show!(); show!(z);\n}\n";
        assert_eq!(extract_call_args(source, "show", Some(2), 0), ["z"]);
    }

    #[test]
    fn test_column_picks_between_calls() {
        let source = "fn f() {\n    show!(a); show!(b);\n}\n";
        let query = CallQuery::new("show").at_line(2).at_column(15);
        assert_eq!(extract(source, &query), ["b"]);

        let unknown = CallQuery::new("show").at_line(2).at_column(99);
        assert_eq!(extract(source, &unknown), ["a"]);
    }

    #[test]
    fn test_non_ascii_columns() {
        let source = "fn f() { let s = \"é\"; show!(s.len()); }";
        assert_eq!(extract_call_args(source, "show", Some(1), 0), ["s.len()"]);
    }

    #[test]
    fn test_unsliceable_argument_keeps_its_slot() {
        let source = "show!(a, b)\n";
        let at = |line, column| LineColumn { line, column };
        let call = Call {
            start: at(1, 0),
            args: vec![(at(7, 0), at(7, 1)), (at(1, 9), at(1, 10))],
        };
        assert_eq!(call.texts(&LineIndex::new(source)), [PLACEHOLDER, "b"]);
    }
}
