//! On-disk form of [`VectorIndex`].
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! magic "TSRX" | version u32 | dimension u64 | ntotal u64 | ntotal*dimension f32 | blake3(all previous bytes)
//! ```
//!
//! A dimension of `0` means the index never received a vector.

use std::io::{Read, Write};
use std::path::Path;

use crate::error::{Result, StoreError};
use crate::index::VectorIndex;

const MAGIC: &[u8; 4] = b"TSRX";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 8 + 8;
const DIGEST_LEN: usize = 32;

impl VectorIndex {
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write_to(&mut file)?;
        file.flush()?;
        tracing::debug!(path = %path.display(), vectors = self.len(), "vector index saved");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::read_from(std::io::BufReader::new(file))
    }

    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.raw().len() * 4 + DIGEST_LEN);
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&VERSION.to_le_bytes());
        buf.extend_from_slice(&(self.dimension().unwrap_or(0) as u64).to_le_bytes());
        buf.extend_from_slice(&(self.len() as u64).to_le_bytes());
        for x in self.raw() {
            buf.extend_from_slice(&x.to_le_bytes());
        }
        let digest = blake3::hash(&buf);
        buf.extend_from_slice(digest.as_bytes());
        writer.write_all(&buf)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Checksum`] if the digest does not match, and
    /// [`StoreError::Corrupt`] for a bad header or truncated row data.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        if bytes.len() < HEADER_LEN + DIGEST_LEN {
            return Err(StoreError::Corrupt(format!(
                "file too short: {} bytes",
                bytes.len()
            )));
        }

        let (body, digest) = bytes.split_at(bytes.len() - DIGEST_LEN);
        if blake3::hash(body).as_bytes() != digest {
            return Err(StoreError::Checksum);
        }
        if &body[..4] != MAGIC {
            return Err(StoreError::Corrupt("bad magic".into()));
        }
        let version = u32::from_le_bytes(le_array(&body[4..8]));
        if version != VERSION {
            return Err(StoreError::Corrupt(format!(
                "unsupported version {version}"
            )));
        }
        let dimension = to_usize(u64::from_le_bytes(le_array(&body[8..16])))?;
        let ntotal = to_usize(u64::from_le_bytes(le_array(&body[16..24])))?;
        if dimension == 0 && ntotal > 0 {
            return Err(StoreError::Corrupt(
                "rows present without a dimension".into(),
            ));
        }

        let payload = &body[HEADER_LEN..];
        let expected = dimension
            .checked_mul(ntotal)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| StoreError::Corrupt("row count overflows".into()))?;
        if payload.len() != expected {
            return Err(StoreError::Corrupt(format!(
                "expected {expected} bytes of row data, found {}",
                payload.len()
            )));
        }

        let data = payload
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes(le_array(b)))
            .collect();
        let dimension = (dimension > 0).then_some(dimension);
        Ok(Self::from_raw(dimension, data))
    }
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

fn to_usize(v: u64) -> Result<usize> {
    usize::try_from(v).map_err(|e| StoreError::Corrupt(e.to_string()))
}
