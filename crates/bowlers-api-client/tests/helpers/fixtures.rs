//! Test fixtures: local files of a given size with a plausible header.

#![allow(dead_code)]

use std::path::PathBuf;
use tempfile::TempDir;

const JPEG_MAGIC: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];
const MP4_FTYP: [u8; 8] = [0x00, 0x00, 0x00, 0x18, b'f', b't', b'y', b'p'];

/// Write `size` bytes starting with `header` to `dir/name`.
pub fn write_file(dir: &TempDir, name: &str, header: &[u8], size: usize) -> PathBuf {
    let mut data = vec![0u8; size];
    let n = header.len().min(size);
    data[..n].copy_from_slice(&header[..n]);
    let path = dir.path().join(name);
    std::fs::write(&path, data).expect("write fixture");
    path
}

pub fn jpeg(dir: &TempDir, name: &str, size: usize) -> PathBuf {
    write_file(dir, name, &JPEG_MAGIC, size)
}

pub fn mp4(dir: &TempDir, name: &str, size: usize) -> PathBuf {
    write_file(dir, name, &MP4_FTYP, size)
}
