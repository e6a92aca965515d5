pub mod cli;
mod ui;

use std::env;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};

use rand::RngCore;

use chunklock::chunk::{FileKey, KEY_LEN};
use chunklock::nonce::IV_LEN;
use chunklock::{reader, stream};

use ui::color::Color;

const KEY_ENV_VAR: &str = "CHUNKLOCK_KEY";

pub fn genkey() -> Result<(), i32> {
    let mut key = [0u8; KEY_LEN];
    rand::rng().fill_bytes(&mut key);
    println!("{}", hex::encode(key));
    Ok(())
}

pub fn encrypt(input: &str, output: &str) -> Result<(), i32> {
    let key = key_from_env()?;

    let mut iv = [0u8; IV_LEN];
    rand::rng().fill_bytes(&mut iv);

    let mut in_file = open_input(input)?;
    let mut out_file = create_output(output)?;

    match stream::encrypt(&key, iv, &mut in_file, &mut out_file) {
        Ok(digests) => {
            eprintln!(
                "{} {input} -> {output} (sha256 {})",
                Color::none("encrypted"),
                digests.out_sha256
            );
            Ok(())
        }
        Err(err) => fail(&err.to_string()),
    }
}

pub fn decrypt(input: &str, output: &str) -> Result<(), i32> {
    let key = key_from_env()?;

    let mut in_file = open_input(input)?;
    let mut out_file = create_output(output)?;

    match stream::decrypt(&key, &mut in_file, &mut out_file) {
        Ok(digests) => {
            eprintln!(
                "{} {input} -> {output} (sha256 {})",
                Color::none("decrypted"),
                digests.out_sha256
            );
            Ok(())
        }
        Err(err) => fail(&err.to_string()),
    }
}

pub fn cat(file: &str, offset: Option<u64>, length: Option<u64>) -> Result<(), i32> {
    let key = key_from_env()?;
    let backing = open_input(file)?;

    let mut reader = match reader::DecryptingReader::new(key, backing) {
        Ok(reader) => reader,
        Err(err) => return fail(&err.to_string()),
    };

    if let Some(offset) = offset
        && reader.seek(SeekFrom::Start(offset)).is_err()
    {
        return fail("invalid seek offset");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut buf = [0u8; 64 * 1024];

    let mut remaining = length;
    loop {
        let want = remaining.map_or(buf.len(), |r| buf.len().min(r as usize));
        if want == 0 {
            break;
        }
        let n = match reader.read(&mut buf[..want]) {
            Ok(n) => n,
            Err(err) => return fail(&err.to_string()),
        };
        if n == 0 {
            break;
        }
        if out.write_all(&buf[..n]).is_err() {
            return fail("could not write to stdout");
        }
        if let Some(r) = remaining.as_mut() {
            *r -= n as u64;
        }
    }

    Ok(())
}

fn key_from_env() -> Result<FileKey, i32> {
    let Ok(hex_key) = env::var(KEY_ENV_VAR) else {
        return fail(&format!(
            "missing key: set {KEY_ENV_VAR} to a 64-character hex key"
        ));
    };
    let Ok(bytes) = hex::decode(&hex_key) else {
        return fail(&format!("{KEY_ENV_VAR} is not valid hex"));
    };
    let Ok(key): Result<[u8; KEY_LEN], _> = bytes.try_into() else {
        return fail(&format!("{KEY_ENV_VAR} must decode to {KEY_LEN} bytes"));
    };
    Ok(FileKey::new(key))
}

fn open_input(path: &str) -> Result<File, i32> {
    File::open(path).map_err(|err| {
        eprintln!("{}: {path}: {err}", Color::error("fatal"));
        1
    })
}

fn create_output(path: &str) -> Result<File, i32> {
    File::create(path).map_err(|err| {
        eprintln!("{}: {path}: {err}", Color::error("fatal"));
        1
    })
}

fn fail<T>(message: &str) -> Result<T, i32> {
    eprintln!("{}: {message}", Color::error("fatal"));
    Err(1)
}
