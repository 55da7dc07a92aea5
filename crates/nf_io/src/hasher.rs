//! crates/nf_io/src/hasher.rs
//!
//! Deterministic hashing and ID builders.
//!
//! - `STD:<hex>` names a standards table: SHA-256 over the canonical JSON of its
//!   accepted typed rows, in source order.
//! - `RES:<hex>` names a result document: SHA-256 over its canonical JSON.
//! - Raw digests of input files use `sha256_file`.
//!
//! Hex digests are lowercase.

#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use nf_core::StandardRow;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical_json::canonical_bytes_of;
use crate::{IoError, IoResult};

/* ---------------------------------- Helpers ---------------------------------- */

/// Encode bytes as lowercase hex.
fn to_lower_hex(bytes: &[u8]) -> String {
    const LUT: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(LUT[(b >> 4) as usize] as char);
        out.push(LUT[(b & 0x0F) as usize] as char);
    }
    out
}

/// Validate a lowercase 64-hex string and shorten it to `n` chars.
pub fn short_hex(hex64: &str, n: usize) -> IoResult<String> {
    if hex64.len() != 64 || !hex64.bytes().all(|c| matches!(c, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(IoError::Hash(format!("invalid hex (expected lowercase 64-hex): {hex64}")));
    }
    Ok(hex64[..n.min(64)].to_string())
}

/* ------------------------------- Raw hashing ------------------------------- */

pub fn sha256_hex(bytes: &[u8]) -> String {
    to_lower_hex(&Sha256::digest(bytes))
}

/// SHA-256 over a file's raw bytes.
pub fn sha256_file(path: &Path) -> IoResult<String> {
    let f = File::open(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let mut r = BufReader::new(f);
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = r.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(to_lower_hex(&hasher.finalize()))
}

/* ---------------------------- Canonical hashing ---------------------------- */

/// SHA-256 over canonical JSON bytes of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> IoResult<String> {
    Ok(sha256_hex(&canonical_bytes_of(value)?))
}

/* ---------------------------- Artifact ID builders ---------------------------- */

/// `STD:<hex>` for a standards table.
pub fn std_id_from_rows(rows: &[StandardRow]) -> IoResult<String> {
    Ok(format!("STD:{}", sha256_canonical(&rows)?))
}

/// `RES:<hex>` for a result document.
pub fn res_id_from_canonical<T: Serialize>(value: &T) -> IoResult<String> {
    Ok(format!("RES:{}", sha256_canonical(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_core::{Band, Grade, Level, Sex, Station};
    use serde_json::json;

    #[test]
    fn known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn canonical_hash_ignores_key_order() {
        let a = json!({"x": 1, "y": [1, 2]});
        let b = json!({"y": [1, 2], "x": 1});
        assert_eq!(sha256_canonical(&a).unwrap(), sha256_canonical(&b).unwrap());
        let id = res_id_from_canonical(&a).unwrap();
        assert!(id.starts_with("RES:"));
        assert_eq!(id.len(), 4 + 64);
    }

    #[test]
    fn table_id_changes_with_rows() {
        let row = StandardRow {
            level: Level::Primary,
            sex: Sex::Female,
            age_min: 10,
            age_max: 10,
            station: Station::SitUps,
            grade: Grade::A,
            points: 5,
            band: Band::new(Some(30.0), None),
            run_km: None,
        };
        let mut other = row.clone();
        other.points = 4;
        let a = std_id_from_rows(&[row.clone()]).unwrap();
        assert_eq!(a, std_id_from_rows(&[row]).unwrap());
        assert_ne!(a, std_id_from_rows(&[other]).unwrap());
        assert_eq!(short_hex(&a[4..], 12).unwrap().len(), 12);
    }
}
