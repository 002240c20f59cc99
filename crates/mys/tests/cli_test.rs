//! Driver behavior: artifact placement and exit codes.

use std::fs;
use std::process::Command;

#[test]
fn test_transpiles_package_to_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("lib.mys");
    fs::write(&source_path, "def add(a: i32, b: i32) -> i32:\n    return a + b\n").unwrap();

    let outdir = dir.path().join("out");
    let status = Command::new(env!("CARGO_BIN_EXE_mys"))
        .arg(&source_path)
        .args(["--package", "calc"])
        .arg("--outdir")
        .arg(&outdir)
        .status()
        .unwrap();

    assert!(status.success());

    let header = fs::read_to_string(outdir.join("calc/lib.mys.hpp")).unwrap();
    let source = fs::read_to_string(outdir.join("calc/lib.mys.cpp")).unwrap();
    assert!(header.contains("namespace mys::calc::lib"));
    assert!(source.contains("i32 add(i32 a, i32 b)"));
}

#[test]
fn test_diagnostic_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("lib.mys");
    fs::write(&source_path, "import foo\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_mys"))
        .arg(&source_path)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CompileError: only 'from <module> import ...' is allowed"));
}
