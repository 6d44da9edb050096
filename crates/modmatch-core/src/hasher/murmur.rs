use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// 64-bit content fingerprint understood by the catalog's matching service.
pub type Fingerprint = u64;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Fingerprint a file by streaming its bytes through MurmurHash3 x64/128.
pub fn fingerprint_file(path: &Path) -> io::Result<Fingerprint> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    fingerprint_reader(&mut reader)
}

pub fn fingerprint_reader<R: Read>(reader: &mut R) -> io::Result<Fingerprint> {
    let digest = murmur3::murmur3_x64_128(reader, 0)?;
    Ok(reduce_digest(digest))
}

pub fn fingerprint_bytes(data: &[u8]) -> Fingerprint {
    let mut cursor = io::Cursor::new(data);
    // Reading from an in-memory cursor cannot fail.
    murmur3::murmur3_x64_128(&mut cursor, 0)
        .map(reduce_digest)
        .unwrap_or_default()
}

/// The service expects the first 8 bytes of the digest as serialized
/// (`h1` then `h2`, each big-endian) read back in little-endian order.
fn reduce_digest(digest: u128) -> Fingerprint {
    let h1 = digest as u64;
    u64::from_le_bytes(h1.to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_fingerprint_is_zero() {
        assert_eq!(fingerprint_bytes(&[]), 0);
    }

    #[test]
    fn test_reader_and_bytes_agree() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let mut cursor = io::Cursor::new(data.clone());
        assert_eq!(fingerprint_reader(&mut cursor).unwrap(), fingerprint_bytes(&data));
    }

    #[test]
    fn test_reduce_digest_uses_first_half_byte_swapped() {
        let h1: u64 = 0x0102_0304_0506_0708;
        let h2: u64 = 0xffff_ffff_ffff_ffff;
        let digest = ((h2 as u128) << 64) | h1 as u128;
        assert_eq!(reduce_digest(digest), 0x0807_0605_0403_0201);
    }

    #[test]
    fn test_single_byte_change_changes_fingerprint() {
        assert_ne!(fingerprint_bytes(b"mod content v1"), fingerprint_bytes(b"mod content v2"));
    }

    // Values the matching service computes for the same bytes.
    #[test]
    fn test_known_fingerprints() {
        assert_eq!(fingerprint_bytes(b"hello"), 187951899350653131);
        assert_eq!(fingerprint_bytes(b"hair content"), 1124873683619444160);
    }

    #[test]
    fn test_known_fingerprint_of_file_spanning_buffers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("large.package");
        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &data).unwrap();

        assert_eq!(fingerprint_file(&path).unwrap(), 4657937961874401125);
    }
}
