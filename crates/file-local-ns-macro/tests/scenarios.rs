//! Several independently written modules, each with its own file-local namespace.

mod example {
    file_local_ns_macro::file_local_namespace! {
        use std::time::*;
    }

    pub fn get_seconds() -> FLN::Duration {
        FLN::Duration::from_millis(3000)
    }

    pub fn namespace_counter() -> u64 {
        FLN::__fln_counter()
    }
}

mod example2 {
    /// Same spelling as the alias below, imported unknowingly.
    #[allow(non_upper_case_globals)]
    pub const fln: u64 = 5;

    file_local_ns_macro::file_local_namespace! {
        as fln;
        use std::time::*;
    }

    // `fln` the module and `fln` the constant live in different namespaces.
    pub fn get_seconds() -> fln::Duration {
        fln::Duration::from_secs(fln)
    }

    pub fn namespace_counter() -> u64 {
        fln::__fln_counter()
    }
}

mod example3_utils {
    file_local_ns_macro::file_local_namespace! {
        use std::string::*;
    }

    pub fn to_string(value: i32) -> FLN::String {
        FLN::ToString::to_string(&(value + 1))
    }

    pub fn namespace_counter() -> u64 {
        FLN::__fln_counter()
    }
}

mod example3 {
    file_local_ns_macro::file_local_namespace! {
        use crate::example3_utils::*;
    }

    pub fn to_string(value: i32) -> String {
        FLN::to_string(value + 1)
    }

    pub fn namespace_counter() -> u64 {
        FLN::__fln_counter()
    }

    pub fn namespace_len() -> usize {
        FLN::__fln_len()
    }
}

mod nested {
    pub mod inner {
        file_local_ns_macro::file_local_namespace! {
            use super::super::super::example::get_seconds;
        }

        pub fn millis() -> u128 {
            FLN::get_seconds().as_millis()
        }

        pub fn namespace_counter() -> u64 {
            FLN::__fln_counter()
        }
    }
}

#[test]
fn duration_alias() {
    assert_eq!(example::get_seconds().as_secs(), 3);
}

#[test]
fn shadowed_constant_survives_alias() {
    assert_eq!(example2::get_seconds().as_secs(), 5);
    assert_eq!(example2::fln, 5);
}

#[test]
fn nested_string_helpers() {
    assert_eq!(example3::to_string(5), "7");
    assert_eq!(example3_utils::to_string(5), "6");
}

#[test]
fn alias_reaches_sibling_module() {
    assert_eq!(nested::inner::millis(), 3000);
}

#[test]
fn generated_modules_are_distinct() {
    let counters = [
        example::namespace_counter(),
        example2::namespace_counter(),
        example3_utils::namespace_counter(),
        example3::namespace_counter(),
        nested::inner::namespace_counter(),
    ];
    for (i, a) in counters.iter().enumerate() {
        for b in &counters[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn accessors_are_stable() {
    let first = example::namespace_counter();
    let second = example::namespace_counter();
    assert_eq!(first, second);
    assert_eq!(example3::namespace_len(), 0);
}

#[test]
fn usable_inside_function_bodies() {
    file_local_ns_macro::file_local_namespace! {
        use std::collections::*;
    }

    let mut map = FLN::HashMap::new();
    map.insert(1, "one");
    assert_eq!(map[&1], "one");
}
