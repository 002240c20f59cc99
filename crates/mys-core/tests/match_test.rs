//! Match-statement lowering: downcast chains, subject caching and arm
//! scoping.

use mys_core::transpile_source;

const TRAIT_SETUP: &str = "@trait\n\
class Base:\n\
\x20   def work(self):\n\
\x20       pass\n\
class Foo(Base):\n\
\x20   def work(self):\n\
\x20       pass\n\
class Bar(Base):\n\
\x20   def work(self):\n\
\x20       pass\n\
class Fie(Base):\n\
\x20   def work(self):\n\
\x20       pass\n";

#[test]
fn test_match_on_trait_subject_lowers_to_downcast_chain() {
    let source = format!(
        "{TRAIT_SETUP}\
         def run(base: Base):\n\
         \x20   match base:\n\
         \x20       case Foo():\n\
         \x20           base.work()\n\
         \x20       case Bar() as value:\n\
         \x20           value.work()\n\
         \x20       case Fie() as value:\n\
         \x20           value.work()\n"
    );

    let output = transpile_source(&source).unwrap();

    assert!(output.contains("std::dynamic_pointer_cast<Foo>(base)"));
    assert!(output.contains("auto value = std::dynamic_pointer_cast<Bar>(base);"));
    assert!(output.contains("auto value = std::dynamic_pointer_cast<Fie>(base);"));
    assert!(output.contains("if (value) {"));
    assert!(output.contains("} else {"));
    assert!(output.contains("value->work()"));
}

#[test]
fn test_match_arms_nest_by_else_chaining() {
    let source = format!(
        "{TRAIT_SETUP}\
         def run(base: Base):\n\
         \x20   match base:\n\
         \x20       case Foo():\n\
         \x20           base.work()\n\
         \x20       case Bar():\n\
         \x20           base.work()\n"
    );

    let output = transpile_source(&source).unwrap();

    // The Bar downcast only happens when the Foo arm failed.
    let foo = output.find("std::dynamic_pointer_cast<Foo>").unwrap();
    let or_else = output[foo..].find("} else {").unwrap();
    let bar = output[foo..].find("std::dynamic_pointer_cast<Bar>").unwrap();
    assert!(or_else < bar);
}

#[test]
fn test_match_as_binding_scoped_to_arm() {
    let source = format!(
        "{TRAIT_SETUP}\
         def run(base: Base):\n\
         \x20   match base:\n\
         \x20       case Foo() as value:\n\
         \x20           value.work()\n\
         \x20   value.work()\n"
    );

    let err = transpile_source(&source).unwrap_err();

    assert!(err
        .to_string()
        .ends_with("CompileError: undefined variable 'value'\n"));
}

#[test]
fn test_match_literal_patterns_on_integers() {
    let output = transpile_source(
        "def run(value: i64):\n\
         \x20   match value:\n\
         \x20       case 0:\n\
         \x20           print(\"zero\")\n\
         \x20       case 10:\n\
         \x20           print(\"ten\")\n\
         \x20       case _:\n\
         \x20           print(\"other\")\n",
    )
    .unwrap();

    assert!(output.contains("if (value == 0) {"));
    assert!(output.contains("if (value == 10) {"));
}

#[test]
fn test_match_literal_patterns_on_strings() {
    let output = transpile_source(
        "def run(value: string):\n\
         \x20   match value:\n\
         \x20       case \"a\":\n\
         \x20           print(1)\n\
         \x20       case _:\n\
         \x20           print(2)\n",
    )
    .unwrap();

    assert!(output.contains("if (value == String(\"a\")) {"));
}

#[test]
fn test_match_non_name_subject_cached_once() {
    let source = format!(
        "{TRAIT_SETUP}\
         def make() -> Base:\n\
         \x20   return Foo()\n\
         def run():\n\
         \x20   match make():\n\
         \x20       case Foo():\n\
         \x20           print(1)\n\
         \x20       case _:\n\
         \x20           print(2)\n"
    );

    let output = transpile_source(&source).unwrap();

    assert!(output.contains("auto mys_match_subject_1 = make();"));
    assert!(output.contains("std::dynamic_pointer_cast<Foo>(mys_match_subject_1)"));
    assert_eq!(output.matches("make();").count(), 1);
}

#[test]
fn test_match_literal_type_mismatch() {
    let err = transpile_source(
        "def run(value: i64):\n\
         \x20   match value:\n\
         \x20       case \"a\":\n\
         \x20           print(1)\n",
    )
    .unwrap_err();

    assert!(err
        .to_string()
        .ends_with("CompileError: types 'i64' and 'string' differ\n"));
}
