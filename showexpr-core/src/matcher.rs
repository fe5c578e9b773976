//! Value-to-name matcher
//!
//! Last-resort labels: name each value after a binding that holds it.

use crate::context::{Handle, Scope};
use crate::PLACEHOLDER;

/// Produce one label per handle.
///
/// Identity is tried before equality: a binding holding the very same
/// object wins over one that merely holds an equal value. Equality only
/// applies to elementary values and skips `_`-prefixed bindings.
pub fn match_names<'h, I>(handles: I, scope: &Scope) -> Vec<String>
where
    I: IntoIterator<Item = &'h Handle>,
{
    handles
        .into_iter()
        .map(|handle| match_one(handle, scope).unwrap_or(PLACEHOLDER).to_string())
        .collect()
}

fn match_one<'s>(handle: &Handle, scope: &'s Scope) -> Option<&'s str> {
    if let Some(binding) = scope.iter().find(|b| b.handle.is_same_object(handle)) {
        log::trace!("'{}' matched by identity", binding.name);
        return Some(&binding.name);
    }

    if !handle.value.is_elementary() {
        return None;
    }

    let binding = scope
        .iter()
        .filter(|b| !b.is_private())
        .find(|b| b.handle.value.loosely_equals(&handle.value))?;
    log::trace!(
        "'{}' matched by equality ({}: {})",
        binding.name,
        handle.value,
        handle.value.type_name()
    );
    Some(&binding.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::address_of;

    #[test]
    fn test_identity_beats_equality() {
        let first = String::from("same");
        let second = String::from("same");
        let scope = Scope::new().bind("first", &first).bind("second", &second);

        let probe = Handle::capture(&second, Some(address_of(&second)));
        assert_eq!(match_names([&probe], &scope), ["second"]);
    }

    #[test]
    fn test_equality_for_elementary_values() {
        let x = 42;
        let scope = Scope::new().bind("x", &x);

        let temporary = Handle::capture(&42, None);
        assert_eq!(match_names([&temporary], &scope), ["x"]);
    }

    #[test]
    fn test_equality_skips_private_names() {
        let _hidden = 7;
        let scope = Scope::new().bind("_hidden", &_hidden);

        let probe = Handle::capture(&7, None);
        assert_eq!(match_names([&probe], &scope), [PLACEHOLDER]);
    }

    #[test]
    fn test_identity_allows_private_names() {
        let _hidden = 7;
        let scope = Scope::new().bind("_hidden", &_hidden);

        let probe = Handle::capture(&_hidden, Some(address_of(&_hidden)));
        assert_eq!(match_names([&probe], &scope), ["_hidden"]);
    }

    #[test]
    fn test_no_equality_for_opaque_values() {
        let list = vec![1, 2, 3];
        let scope = Scope::new().bind("list", &list);

        let rebuilt = vec![1, 2, 3];
        let probe = Handle::capture(&rebuilt, None);
        assert_eq!(match_names([&probe], &scope), [PLACEHOLDER]);
    }

    #[test]
    fn test_first_binding_in_declaration_order() {
        let (b, a) = (1, 1);
        let scope = Scope::new().bind("b", &b).bind("a", &a);

        let probe = Handle::capture(&1, None);
        assert_eq!(match_names([&probe], &scope), ["b"]);
    }

    #[test]
    fn test_one_label_per_value() {
        let scope = Scope::new();
        let handles = [Handle::capture(&1, None), Handle::capture(&"two", None)];
        assert_eq!(match_names(&handles, &scope), [PLACEHOLDER, PLACEHOLDER]);
    }
}
