//! `show!` and `scope!`

/// Print each argument as `<source text> = <Debug value>` and return it.
///
/// ```ignore
/// let x = 5;
/// let y = 10;
/// let sum = show!(x + y);      // prints `x + y = 15`
/// let (a, b) = show!(x, y);    // prints `x = 5` then `y = 10`
/// ```
///
/// One argument returns that value, several return a tuple, none returns
/// `()` and prints nothing. Arguments are moved, as with `dbg!`.
///
/// Routing forms:
/// - `show!(in scope; ..)` names values from `scope` when no source text is
///   found;
/// - `show!(use printer; ..)` and `show!(use printer, in scope; ..)` print
///   through a specific [`Show`](crate::Show) instead of the global one.
#[macro_export]
macro_rules! show {
    (use $show:expr, in $scope:expr; $($args:tt)*) => {
        $crate::__show_collect!(($show) (&$scope) [] $($args)*)
    };
    (use $show:expr; $($args:tt)*) => {
        $crate::__show_collect!(($show) (&$crate::Scope::new()) [] $($args)*)
    };
    (in $scope:expr; $($args:tt)*) => {
        $crate::__show_collect!(($crate::Show::global()) (&$scope) [] $($args)*)
    };
    ($($args:tt)*) => {
        $crate::__show_collect!(($crate::Show::global()) (&$crate::Scope::new()) [] $($args)*)
    };
}

/// Evaluates arguments left to right, binding each to a fresh `value`.
/// Bare identifiers also record the address of the place they are moved out
/// of, for identity matching.
#[doc(hidden)]
#[macro_export]
macro_rules! __show_collect {
    ($show:tt $scope:tt [$(($value:ident $address:ident))*]) => {{
        {
            let site = $crate::CallSite::new(
                ::core::file!(),
                ::core::line!(),
                ::core::column!(),
                ::core::module_path!(),
                ::core::option_env!("CARGO_MANIFEST_DIR"),
            );
            let probes: &[$crate::Probe<'_>] = &[$($crate::Probe::new(&$value, $address)),*];
            $show.emit(&site, $scope, probes);
        }
        $crate::__show_return!($($value)*)
    }};
    ($show:tt $scope:tt [$($done:tt)*] $arg:ident , $($rest:tt)*) => {{
        let place = $crate::context::place_of(&$arg);
        match $arg {
            value => {
                let address = ::core::option::Option::Some($crate::context::place_address(place, &value));
                $crate::__show_collect!($show $scope [$($done)* (value address)] $($rest)*)
            }
        }
    }};
    ($show:tt $scope:tt [$($done:tt)*] $arg:ident) => {{
        let place = $crate::context::place_of(&$arg);
        match $arg {
            value => {
                let address = ::core::option::Option::Some($crate::context::place_address(place, &value));
                $crate::__show_collect!($show $scope [$($done)* (value address)])
            }
        }
    }};
    ($show:tt $scope:tt [$($done:tt)*] $arg:expr , $($rest:tt)*) => {{
        let address: ::core::option::Option<usize> = ::core::option::Option::None;
        match $arg {
            value => $crate::__show_collect!($show $scope [$($done)* (value address)] $($rest)*),
        }
    }};
    ($show:tt $scope:tt [$($done:tt)*] $arg:expr) => {{
        let address: ::core::option::Option<usize> = ::core::option::Option::None;
        match $arg {
            value => $crate::__show_collect!($show $scope [$($done)* (value address)]),
        }
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __show_return {
    () => {
        ()
    };
    ($value:ident) => {
        $value
    };
    ($($value:ident)+) => {
        ($($value),+)
    };
}

/// Build a [`Scope`](crate::Scope) from local variables, in the order given.
///
/// ```ignore
/// let scope = scope!(a, b, _tmp);
/// ```
#[macro_export]
macro_rules! scope {
    ($($name:ident),* $(,)?) => {
        $crate::Scope::new()$(.bind(::core::stringify!($name), &$name))*
    };
}

#[cfg(test)]
mod tests {
    use crate::history::MemoryHistory;
    use crate::show::tests::Capture;
    use crate::{Show, ShowConfig, PLACEHOLDER};

    fn printer() -> (Show, Capture) {
        let capture = Capture::default();
        (Show::new().with_writer(capture.clone()), capture)
    }

    #[test]
    fn test_single_value_is_returned() {
        let (printer, out) = printer();
        let x = 42;
        let result = show!(use printer; x);
        assert_eq!(result, 42);
        assert_eq!(out.text(), "x = 42\n");
    }

    #[test]
    fn test_multiple_values_return_tuple() {
        let (printer, out) = printer();
        let (a, b) = (1, 2);
        let result = show!(use printer; a, b);
        assert_eq!(result, (1, 2));
        assert_eq!(out.text(), "a = 1\nb = 2\n");
    }

    #[test]
    fn test_expression_text() {
        let (printer, out) = printer();
        let x = 5;
        let y = 10;
        let result = show!(use printer; x + y);
        assert_eq!(result, 15);
        assert_eq!(out.text(), "x + y = 15\n");
    }

    #[test]
    fn test_zero_arguments() {
        let (printer, out) = printer();
        let unit: () = show!(use printer;);
        assert_eq!(unit, ());
        assert_eq!(out.text(), "");
    }

    #[test]
    fn test_non_copy_values_are_moved_through() {
        let (printer, out) = printer();
        let words = vec!["a".to_string(), "b".to_string()];
        let words = show!(use printer; words);
        assert_eq!(words.len(), 2);
        assert_eq!(out.text(), "words = [\"a\", \"b\"]\n");
    }

    #[test]
    fn test_generic_path_argument() {
        let (printer, out) = printer();
        let v: Option<i32> = show!(use printer; None);
        assert_eq!(v, None);
        assert_eq!(out.text(), "None = None\n");
    }

    #[test]
    fn test_identifier_keeps_its_place() {
        let out = Capture::default();
        let blind = Show::from_config(ShowConfig {
            target: "absent".to_string(),
            ..ShowConfig::default()
        })
        .with_writer(out.clone());
        let (first, second) = (String::from("same"), String::from("same"));
        let scope = scope!(first, second);
        let second = show!(use blind, in scope; second);
        assert_eq!(second, "same");
        assert_eq!(out.text(), "second = \"same\"\n");
    }

    #[test]
    fn test_history_scenario() {
        let history = MemoryHistory::new();
        history.record("show!(a, b, c)");
        let capture = Capture::default();
        let printer = Show::new().with_history(history).with_writer(capture.clone());

        let (a, b, c) = (1, 2, 3);
        let result = show!(use printer; c, b, a);
        assert_eq!(result, (3, 2, 1));
        // History text wins even though the call site says otherwise
        assert_eq!(capture.text(), "a = 3\nb = 2\nc = 1\n");
    }

    #[test]
    fn test_scope_macro_order() {
        let second = 2;
        let first = 1;
        let _hidden = 3;
        let scope = scope!(second, first, _hidden);
        let names: Vec<_> = scope.iter().map(|b| b.name.clone()).collect();
        assert_eq!(names, ["second", "first", "_hidden"]);
        assert_ne!(PLACEHOLDER, names[0]);
    }
}
