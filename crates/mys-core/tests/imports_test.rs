//! Import resolution rules, asserted against complete rendered
//! diagnostics.

use mys_core::{transpile, transpile_source, Source};

#[test]
fn test_import_in_function_should_fail() {
    let err = transpile(&[Source::new("def main():\n    import foo\n")
        .with_path("<unknown>")])
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"<unknown>\", line 2\n\
         \x20       import foo\n\
         \x20       ^\n\
         CompileError: imports are only allowed on module level\n"
    );
}

#[test]
fn test_import_from_in_function_should_fail() {
    let err = transpile_source("def main():\n    from foo import bar\n").unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"\", line 2\n\
         \x20       from foo import bar\n\
         \x20       ^\n\
         CompileError: imports are only allowed on module level\n"
    );
}

#[test]
fn test_import() {
    let err = transpile_source("import foo\n").unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"\", line 1\n\
         \x20   import foo\n\
         \x20   ^\n\
         CompileError: only 'from <module> import ...' is allowed\n"
    );
}

#[test]
fn test_multiple_imports_failure() {
    let err = transpile(&[Source::new("from foo import bar, fie\n")
        .with_path("<unknown>")])
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"<unknown>\", line 1\n\
         \x20   from foo import bar, fie\n\
         \x20   ^\n\
         CompileError: only one import is allowed, found 2\n"
    );
}

#[test]
fn test_relative_import_outside_package() {
    let err = transpile(&[Source::new("from .. import fie\n")
        .with_path("src/mod.mys")])
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"src/mod.mys\", line 1\n\
         \x20   from .. import fie\n\
         \x20   ^\n\
         CompileError: relative import is outside package\n"
    );
}

#[test]
fn test_imported_variable_usage() {
    let outputs = transpile(&[
        Source::new(
            "from foo import BAR\n\
             \n\
             def fie() -> i32:\n\
             \x20   return 2 * BAR\n",
        )
        .with_module("bar.lib"),
        Source::new("BAR: i32 = 1").with_module("foo.lib"),
    ])
    .unwrap();

    assert!(outputs[0].source.contains("mys::foo::lib::BAR"));
    assert!(outputs[1].source.contains("i32 BAR = 1;"));
}

#[test]
fn test_imported_module_does_not_exist() {
    let err = transpile_source(
        "from kalle import bar\n\
         \n\
         def fie() -> i32:\n\
         \x20   return 2 * bar\n",
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"\", line 1\n\
         \x20   from kalle import bar\n\
         \x20   ^\n\
         CompileError: imported module 'kalle.lib' does not exist\n"
    );
}

#[test]
fn test_imported_module_does_not_contain() {
    let err = transpile(&[
        Source::new(
            "from foo import bar\n\
             \n\
             def fie() -> i32:\n\
             \x20   return 2 * bar\n",
        )
        .with_module("bar.lib"),
        Source::new("BOO: i32 = 1").with_module("foo.lib"),
    ])
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"\", line 1\n\
         \x20   from foo import bar\n\
         \x20   ^\n\
         CompileError: imported module 'foo.lib' does not contain 'bar'\n"
    );
}

#[test]
fn test_import_private_function_fails() {
    let err = transpile(&[
        Source::new(
            "from foo import _BAR\n\
             \n\
             def fie() -> i32:\n\
             \x20   return 2 * _BAR\n",
        )
        .with_module("bar.lib"),
        Source::new("_BAR: i32 = 1").with_module("foo.lib"),
    ])
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"\", line 1\n\
         \x20   from foo import _BAR\n\
         \x20   ^\n\
         CompileError: cannot import private definition '_BAR'\n"
    );
}

#[test]
fn test_import_function_ok() {
    transpile(&[
        Source::new(
            "from foo import bar\n\
             def fie():\n\
             \x20   bar()\n",
        )
        .with_module("bar.lib"),
        Source::new(
            "def bar():\n\
             \x20   pass\n",
        )
        .with_module("foo.lib"),
    ])
    .unwrap();
}

#[test]
fn test_import_after_function_definition() {
    let err = transpile_source(
        "def foo():\n\
         \x20   pass\n\
         from bar import fie\n",
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"\", line 3\n\
         \x20   from bar import fie\n\
         \x20   ^\n\
         CompileError: imports must be at the beginning of the file\n"
    );
}

#[test]
fn test_import_after_variable_definition() {
    let err = transpile_source(
        "V: bool = True\n\
         from bar import fie\n",
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"\", line 2\n\
         \x20   from bar import fie\n\
         \x20   ^\n\
         CompileError: imports must be at the beginning of the file\n"
    );
}

#[test]
fn test_import_after_import() {
    let err = transpile_source(
        "import bar\n\
         from bar import fie\n",
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "  File \"\", line 1\n\
         \x20   import bar\n\
         \x20   ^\n\
         CompileError: only 'from <module> import ...' is allowed\n"
    );
}

#[test]
fn test_import_class_registers_type() {
    let outputs = transpile(&[
        Source::new(
            "from foo import Point\n\
             \n\
             def origin() -> Point:\n\
             \x20   return Point(0, 0)\n",
        )
        .with_module("bar.lib"),
        Source::new(
            "class Point:\n\
             \x20   x: i32\n\
             \x20   y: i32\n",
        )
        .with_module("foo.lib"),
    ])
    .unwrap();

    assert!(outputs[0]
        .source
        .contains("std::make_shared<mys::foo::lib::Point>(0, 0)"));
}

#[test]
fn test_imported_alias_binds_alias_name() {
    let outputs = transpile(&[
        Source::new(
            "from foo import bar as baz\n\
             def fie():\n\
             \x20   baz()\n",
        )
        .with_module("bar.lib"),
        Source::new(
            "def bar():\n\
             \x20   pass\n",
        )
        .with_module("foo.lib"),
    ])
    .unwrap();

    assert!(outputs[0].source.contains("mys::foo::lib::bar()"));
}
