//! Enum emission and the from-value conversion.

use mys_core::{transpile, transpile_source, Source};

#[test]
fn test_enum_emission_and_from_value() {
    let outputs = transpile(&[Source::new(
        "@enum\n\
         class E:\n\
         \x20   A = 1\n\
         \x20   B = 2\n",
    )])
    .unwrap();

    let source = &outputs[0].source;
    assert!(source.contains("enum class E : i64 {"));
    assert!(source.contains("    A = 1,"));
    assert!(source.contains("    B = 2,"));
    assert!(source.contains("i64 enum_E_from_value(i64 value)"));
    assert!(source.contains("    case 1:"));
    assert!(source.contains("        return (i64)E::A;"));
    assert!(source.contains("    case 2:"));
    assert!(source.contains("        return (i64)E::B;"));
    assert!(source.contains("    default:"));
    assert!(source.contains("        throw ValueError(\"bad enum value\");"));

    let header = &outputs[0].header;
    assert!(header.contains("enum class E : i64;"));
    assert!(header.contains("i64 enum_E_from_value(i64 value);"));
}

#[test]
fn test_enum_with_declared_underlying_type() {
    let outputs = transpile(&[Source::new(
        "@enum(u8)\n\
         class Color:\n\
         \x20   RED = 0\n\
         \x20   GREEN = 1\n",
    )])
    .unwrap();

    assert!(outputs[0].source.contains("enum class Color : u8 {"));
    assert!(outputs[0]
        .source
        .contains("u8 enum_Color_from_value(u8 value)"));
}

#[test]
fn test_enum_member_access_spells_scoped_enumerator() {
    let output = transpile_source(
        "@enum\n\
         class E:\n\
         \x20   A = 1\n\
         \n\
         def foo() -> E:\n\
         \x20   return E.A\n",
    )
    .unwrap();

    assert!(output.contains("return E::A;"));
}

#[test]
fn test_enum_unknown_member() {
    let err = transpile_source(
        "@enum\n\
         class E:\n\
         \x20   A = 1\n\
         \n\
         def foo() -> E:\n\
         \x20   return E.B\n",
    )
    .unwrap_err();

    assert!(err
        .to_string()
        .ends_with("CompileError: 'E' has no member 'B'\n"));
}

#[test]
fn test_enum_values_keep_declaration_order() {
    let output = transpile_source(
        "@enum\n\
         class E:\n\
         \x20   B = 2\n\
         \x20   A = 1\n",
    )
    .unwrap();

    let b = output.find("B = 2,").unwrap();
    let a = output.find("A = 1,").unwrap();
    assert!(b < a);
}
