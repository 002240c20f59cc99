//! String typing rules and the closed string-method set.

use mys_core::transpile_source;

#[test]
fn test_iterate_over_range_string() {
    let err = transpile_source(
        "def foo():\n\
         \x20   for i in range(\"a\"):\n\
         \x20       print(i)\n",
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"\", line 2\n\
         \x20       for i in range(\"a\"):\n\
         \x20                      ^\n\
         CompileError: parameter type must be an integer, not 'string'\n"
    );
}

#[test]
fn test_iterate_over_enumerate_string() {
    let err = transpile_source(
        "def foo():\n\
         \x20   for i, j in enumerate(range(2), \"\"):\n\
         \x20       print(i)\n",
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"\", line 2\n\
         \x20       for i, j in enumerate(range(2), \"\"):\n\
         \x20                                       ^\n\
         CompileError: initial value must be an integer, not 'string'\n"
    );
}

#[test]
fn test_global_string() {
    let err = transpile_source("\"Hello!\"\n").unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"\", line 1\n\
         \x20   \"Hello!\"\n\
         \x20   ^\n\
         CompileError: syntax error\n"
    );
}

#[test]
fn test_string_member_access() {
    let err = transpile_source(
        "def foo(v: string):\n\
         \x20   v.a = 1\n",
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"\", line 2\n\
         \x20       v.a = 1\n\
         \x20       ^\n\
         CompileError: 'string' has no member 'a'\n"
    );
}

#[test]
fn test_string_to_utf8_too_many_parameters() {
    let err = transpile_source(
        "def foo():\n\
         \x20   \"\".to_utf8(1)\n",
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"\", line 2\n\
         \x20       \"\".to_utf8(1)\n\
         \x20       ^\n\
         CompileError: expected 0 parameters, got 1\n"
    );
}

#[test]
fn test_string_upper_too_many_parameters() {
    let err = transpile_source(
        "def foo():\n\
         \x20   \"\".upper(1)\n",
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"\", line 2\n\
         \x20       \"\".upper(1)\n\
         \x20       ^\n\
         CompileError: expected 0 parameters, got 1\n"
    );
}

#[test]
fn test_string_lower_too_many_parameters() {
    let err = transpile_source(
        "def foo():\n\
         \x20   \"\".lower(1)\n",
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"\", line 2\n\
         \x20       \"\".lower(1)\n\
         \x20       ^\n\
         CompileError: expected 0 parameters, got 1\n"
    );
}

#[test]
fn test_string_bad_method() {
    let err = transpile_source(
        "def foo():\n\
         \x20   \"\".foobar()\n",
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"\", line 2\n\
         \x20       \"\".foobar()\n\
         \x20       ^\n\
         CompileError: string method not implemented\n"
    );
}

#[test]
fn test_positive_string() {
    let err = transpile_source(
        "def foo():\n\
         \x20   print(+\"hi\")\n",
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"\", line 2\n\
         \x20       print(+\"hi\")\n\
         \x20             ^\n\
         CompileError: unary '+' can only operate on numbers\n"
    );
}

#[test]
fn test_string_methods_lower_to_value_calls() {
    let output = transpile_source(
        "def foo(v: string) -> string:\n\
         \x20   return v.upper()\n",
    )
    .unwrap();

    assert!(output.contains("return v.upper();"));
}

#[test]
fn test_starts_with_takes_a_string() {
    let output = transpile_source(
        "def foo(v: string) -> bool:\n\
         \x20   return v.starts_with(\"x\")\n",
    )
    .unwrap();

    assert!(output.contains("return v.starts_with(String(\"x\"));"));
}

#[test]
fn test_format_string_checks_placeholder_names() {
    let err = transpile_source(
        "def foo() -> string:\n\
         \x20   return f\"hello {name}\"\n",
    )
    .unwrap_err();

    assert!(err
        .to_string()
        .ends_with("CompileError: undefined variable 'name'\n"));
}
