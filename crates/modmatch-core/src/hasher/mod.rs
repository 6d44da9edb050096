pub mod murmur;

pub use murmur::{fingerprint_bytes, fingerprint_file, fingerprint_reader, Fingerprint};
