// SPDX-License-Identifier: Apache-2.0 OR MIT
// Call-site source location captured by the logging macros

/// Source location of a log call site.
///
/// All four strings are `'static` literals produced by the compiler, so a
/// record holding them stays trivially copyable: the consumer only ever
/// dereferences pointers with program lifetime.
#[derive(Debug, Clone, Copy)]
pub struct SourceLocation {
    pub file_path: &'static str,
    pub file_name: &'static str,
    pub function_name: &'static str,
    pub pretty_function: &'static str,
    pub line: u32,
    pub column: u32,
}

/// Strip the directory components off a `file!()` path.
pub fn basename(path: &'static str) -> &'static str {
    match path.rfind(|c| c == '/' || c == '\\') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Last path segment of a fully qualified function path.
pub fn short_function_name(pretty: &'static str) -> &'static str {
    match pretty.rfind("::") {
        Some(idx) => &pretty[idx + 2..],
        None => pretty,
    }
}

/// Capture the current source location, including the enclosing function
/// path recovered through a `type_name` probe.
#[macro_export]
macro_rules! source_location {
    () => {{
        fn _here() {}
        fn _type_name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        // type_name of the probe is "path::to::enclosing_fn::_here"
        let _probe = _type_name_of(_here);
        let _pretty = &_probe[.._probe.len() - "::_here".len()];
        $crate::SourceLocation {
            file_path: file!(),
            file_name: $crate::location::basename(file!()),
            function_name: $crate::location::short_function_name(_pretty),
            pretty_function: _pretty,
            line: line!(),
            column: column!(),
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename() {
        assert_eq!(basename("src/sinks/console.rs"), "console.rs");
        assert_eq!(basename("console.rs"), "console.rs");
        assert_eq!(basename("a\\b\\c.rs"), "c.rs");
    }

    #[test]
    fn test_short_function_name() {
        assert_eq!(short_function_name("hotlog::backend::drain"), "drain");
        assert_eq!(short_function_name("main"), "main");
    }

    #[test]
    fn test_capture_macro() {
        let loc = crate::source_location!();
        assert!(loc.file_path.ends_with("location.rs"));
        assert_eq!(loc.file_name, "location.rs");
        assert_eq!(loc.function_name, "test_capture_macro");
        assert!(loc.pretty_function.ends_with("test_capture_macro"));
        assert!(loc.line > 0);
    }
}
