use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::process::Output;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use rocks_lang::rocks;

/// Runs `source` through the full scan/parse/resolve/interpret pipeline
/// in-process and returns everything it printed. A script that is meant
/// to fail belongs in [`run_file_process`] instead, where exit codes and
/// stderr are observable.
#[allow(dead_code)]
pub fn run(source: &str) -> String {
    let output = Rc::new(RefCell::new(Vec::new()));
    let mut interpreter = rocks::new(Rc::clone(&output) as Rc<RefCell<dyn Write>>);
    interpreter.run(source);

    let bytes = output.borrow();
    String::from_utf8(bytes.clone()).expect("script output should be valid utf-8")
}

/// Writes `source` to a throwaway `.rocks` file and runs it through the
/// `rocks` binary as a subprocess, for tests that care about the process's
/// exit code or stderr rather than what it printed.
#[allow(dead_code)]
pub fn run_file_process(source: &str) -> Output {
    let path = write_temp_script(source);

    let output = assert_cmd::Command::cargo_bin("rocks")
        .unwrap()
        .arg(&path)
        .output()
        .expect("the rocks binary should run");

    let _ = std::fs::remove_file(&path);
    output
}

fn write_temp_script(source: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let path = std::env::temp_dir().join(format!("rocks-test-{nanos}.rocks"));
    std::fs::write(&path, source).expect("should be able to write a temp script");
    path
}
