#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

const CHUNKLOCK: &str = env!("CARGO_BIN_EXE_chunklock");
const TMP_DIR: &str = env!("CARGO_TARGET_TMPDIR");

#[derive(Debug)]
pub struct Output {
    pub exit_code: i32,
    pub stdout: String,
    pub stdout_bytes: Vec<u8>,
    pub stderr: String,
}

/// Write `size` bytes of deterministic, non-repeating content to a fresh
/// file under the test binary's tmp dir.
pub fn make_test_file(file_name: &str, size: usize) -> PathBuf {
    let path = Path::new(TMP_DIR).join(file_name);
    let content: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
    std::fs::write(&path, content).unwrap();
    path
}

pub fn run(args: &[&str]) -> Output {
    run_with_key(None, args)
}

pub fn run_with_key(key: Option<&str>, args: &[&str]) -> Output {
    let mut command = Command::new(CHUNKLOCK);
    command.env("NO_COLOR", "1");
    command.env_remove("PAGER");
    match key {
        Some(key) => {
            command.env("CHUNKLOCK_KEY", key);
        }
        None => {
            command.env_remove("CHUNKLOCK_KEY");
        }
    }

    for arg in args {
        command.arg(arg);
    }

    let output = command.output().unwrap();

    Output {
        exit_code: output.status.code().unwrap(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stdout_bytes: output.stdout,
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

pub fn checksum(path: &Path) -> String {
    let payload = std::fs::read(path).unwrap();
    let hash = blake3::hash(&payload);
    // Hexadecimal is nicer to debug than plain bytes.
    hash.to_hex().to_string()
}
