// Bracket, comment and string handling adapted from Evcxr's fragment
// validation (Apache-2.0 or MIT).

//! Lightweight scan of one history input.
//!
//! Answers two questions without a full parse: is the input a complete
//! fragment, and does it invoke the target outside comments and literals.

use std::iter::Peekable;
use std::str::CharIndices;

/// Completeness of a history input
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FragmentValidity {
    Valid,
    Invalid,
    Incomplete,
}

/// Result of scanning one input for calls to `target`
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct FragmentScan {
    pub validity: FragmentValidity,
    /// `target` followed by an optional `!` and an opening delimiter
    pub mentions_call: bool,
}

impl FragmentScan {
    pub fn is_candidate(&self) -> bool {
        self.validity == FragmentValidity::Valid && self.mentions_call
    }
}

pub fn scan_fragment(source: &str, target: &str) -> FragmentScan {
    let mut stack: Vec<char> = Vec::new();
    let mut mentions_call = false;
    let mut input = source.char_indices().peekable();

    let finish = |validity, mentions_call| FragmentScan {
        validity,
        mentions_call,
    };

    while let Some((i, c)) = input.next() {
        match c {
            '/' => match input.peek() {
                Some((_, '/')) => eat_comment_line(&mut input),
                Some((_, '*')) => {
                    input.next();
                    if !eat_comment_block(&mut input) {
                        return finish(FragmentValidity::Incomplete, mentions_call);
                    }
                }
                _ => {}
            },
            '(' | '[' | '{' => stack.push(c),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.pop() != Some(expected) {
                    return finish(FragmentValidity::Invalid, mentions_call);
                }
            }
            '\'' => {
                if !eat_char_or_lifetime(&mut input) {
                    return finish(FragmentValidity::Incomplete, mentions_call);
                }
            }
            '"' => {
                if !eat_string(&mut input, raw_hashes(source, i)) {
                    return finish(FragmentValidity::Incomplete, mentions_call);
                }
            }
            c if is_ident_start(c) => {
                let end = eat_ident(&mut input, i + c.len_utf8());
                if &source[i..end] == target && !follows_ident(source, i) {
                    mentions_call |= opens_call(&mut input.clone());
                }
            }
            _ => {}
        }
    }

    let validity = if stack.is_empty() {
        FragmentValidity::Valid
    } else {
        FragmentValidity::Incomplete
    };
    finish(validity, mentions_call)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Consume the rest of an identifier and return its end offset
fn eat_ident(input: &mut Peekable<CharIndices<'_>>, mut end: usize) -> usize {
    while let Some(&(i, c)) = input.peek() {
        if !is_ident_continue(c) {
            break;
        }
        end = i + c.len_utf8();
        input.next();
    }
    end
}

/// `x.show(` is a method, not the target; `a::show(` is fine
fn follows_ident(source: &str, start: usize) -> bool {
    source[..start].trim_end().ends_with('.')
}

/// After an identifier: optional `!`, then an opening delimiter
fn opens_call(input: &mut Peekable<CharIndices<'_>>) -> bool {
    let mut bang = false;
    for (_, c) in input {
        match c {
            c if c.is_whitespace() => {}
            '!' if !bang => bang = true,
            '(' => return true,
            '[' | '{' => return bang,
            _ => return false,
        }
    }
    false
}

/// Number of `#`s when the quote at `quote_idx` opens a raw string
fn raw_hashes(s: &str, quote_idx: usize) -> Option<usize> {
    let prefix = s[..quote_idx].as_bytes();
    let hashes = prefix.iter().rev().take_while(|&&b| b == b'#').count();
    let before = prefix.len() - hashes;
    (before > 0 && prefix[before - 1] == b'r').then_some(hashes)
}

fn eat_string(iter: &mut Peekable<CharIndices<'_>>, raw: Option<usize>) -> bool {
    let (hashes, escapes) = match raw {
        None => (0, true),
        Some(hashes) => (hashes, false),
    };

    while let Some((_, c)) = iter.next() {
        match c {
            '"' => {
                if hashes == 0 {
                    return true;
                }
                let mut seen = 0;
                while let Some((_, '#')) = iter.peek() {
                    iter.next();
                    seen += 1;
                    if seen == hashes {
                        return true;
                    }
                }
            }
            '\\' if escapes => {
                iter.next();
            }
            _ => {}
        }
    }
    false
}

fn eat_comment_line(iter: &mut Peekable<CharIndices<'_>>) {
    for (_, c) in iter {
        if c == '\n' {
            break;
        }
    }
}

fn eat_comment_block(iter: &mut Peekable<CharIndices<'_>>) -> bool {
    let mut depth = 1;
    while depth != 0 {
        match iter.next() {
            Some((_, '/')) if iter.peek().map(|p| p.1) == Some('*') => {
                iter.next();
                depth += 1;
            }
            Some((_, '*')) if iter.peek().map(|p| p.1) == Some('/') => {
                iter.next();
                depth -= 1;
            }
            Some(_) => {}
            None => return false,
        }
    }
    true
}

/// Skip a char literal (`'a'`, `'\n'`) or leave a lifetime (`'a`) in place.
/// Returns false when a char literal is cut off.
fn eat_char_or_lifetime(input: &mut Peekable<CharIndices<'_>>) -> bool {
    let mut lookahead = input.clone();
    match lookahead.next() {
        None => false,
        Some((_, '\\')) => {
            // The escaped char itself may be a quote
            lookahead.next();
            let closed = lookahead.by_ref().any(|(_, c)| c == '\'');
            if closed {
                *input = lookahead;
            }
            closed
        }
        Some(_) => {
            if let Some((_, '\'')) = lookahead.next() {
                *input = lookahead;
            }
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_and_function_calls() {
        assert!(scan_fragment("show!(a, b)", "show").is_candidate());
        assert!(scan_fragment("let r = show(x + 1);", "show").is_candidate());
        assert!(scan_fragment("showexpr_core::show![x]", "show").is_candidate());
    }

    #[test]
    fn test_mentions_outside_code_do_not_count() {
        assert!(!scan_fragment("x = 42", "show").mentions_call);
        assert!(!scan_fragment("// show!(x)\nlet y = 1;", "show").mentions_call);
        assert!(!scan_fragment("let s = \"show!(x)\";", "show").mentions_call);
        assert!(!scan_fragment("let s = r#\"show(x)\"#;", "show").mentions_call);
    }

    #[test]
    fn test_similar_identifiers() {
        assert!(!scan_fragment("shows(x)", "show").mentions_call);
        assert!(!scan_fragment("reshow(x)", "show").mentions_call);
        assert!(!scan_fragment("printer.show(x)", "show").mentions_call);
        assert!(!scan_fragment("show[0]", "show").mentions_call);
    }

    #[test]
    fn test_incomplete_input() {
        let scan = scan_fragment("show!(a,", "show");
        assert!(scan.mentions_call);
        assert_eq!(scan.validity, FragmentValidity::Incomplete);
        assert!(!scan.is_candidate());
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(
            scan_fragment("show!(a]", "show").validity,
            FragmentValidity::Invalid
        );
    }

    #[test]
    fn test_chars_and_lifetimes() {
        assert!(scan_fragment("show!('(')", "show").is_candidate());
        assert!(scan_fragment("fn f<'a>(x: &'a str) { show!(x) }", "show").is_candidate());
    }
}
