//! Minimal reader/writer for one-dimensional NumPy `.npy` arrays.
//!
//! Only what the id artifact needs: little-endian integer arrays (and the
//! `<f8` dtype NumPy picks for an empty Python list). Layout reference:
//! magic `\x93NUMPY`, version bytes, header length, an ASCII dict header
//! padded with spaces and a trailing newline, then the raw data.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

const MAGIC: &[u8] = b"\x93NUMPY";
const ALIGN: usize = 64;

static DESCR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'descr'\s*:\s*'([^']+)'").unwrap());
static FORTRAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'fortran_order'\s*:\s*(True|False)").unwrap());
static SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'shape'\s*:\s*\(([^)]*)\)").unwrap());

#[derive(Debug, Error)]
pub enum NpyError {
    #[error("missing .npy magic string")]
    BadMagic,
    #[error("unsupported .npy format version {0}.{1}")]
    UnsupportedVersion(u8, u8),
    #[error("truncated .npy file")]
    Truncated,
    #[error("malformed .npy header: {0}")]
    Header(String),
    #[error("unsupported dtype {0:?}")]
    Dtype(String),
    #[error("expected a 1-d array, got shape ({0})")]
    Shape(String),
    #[error("value {0} at position {1} is not an integer id")]
    NotInteger(f64, usize),
    #[error("value {0} at position {1} does not fit an id")]
    OutOfRange(String, usize),
}

#[derive(Debug, Clone, Copy)]
enum Dtype {
    I4,
    U4,
    I8,
    U8,
    F8,
}

impl Dtype {
    fn parse(descr: &str) -> Result<Self, NpyError> {
        match descr {
            "<i4" => Ok(Self::I4),
            "<u4" => Ok(Self::U4),
            "<i8" => Ok(Self::I8),
            "<u8" => Ok(Self::U8),
            "<f8" => Ok(Self::F8),
            other => Err(NpyError::Dtype(other.to_string())),
        }
    }

    fn width(self) -> usize {
        match self {
            Self::I4 | Self::U4 => 4,
            Self::I8 | Self::U8 | Self::F8 => 8,
        }
    }
}

/// Encode ids as a version 1.0 `.npy` file with dtype `<i8`.
pub fn encode_i64(values: &[i64]) -> Vec<u8> {
    let mut header = format!(
        "{{'descr': '<i8', 'fortran_order': False, 'shape': ({},), }}",
        values.len()
    );
    // magic + 2 version bytes + 2 length bytes + header + '\n'
    let unpadded = MAGIC.len() + 4 + header.len() + 1;
    let padding = (ALIGN - unpadded % ALIGN) % ALIGN;
    header.push_str(&" ".repeat(padding));
    header.push('\n');

    let mut out = Vec::with_capacity(MAGIC.len() + 4 + header.len() + values.len() * 8);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Decode a one-dimensional integer `.npy` array into ids.
pub fn decode_i64(bytes: &[u8]) -> Result<Vec<i64>, NpyError> {
    if !bytes.starts_with(MAGIC) {
        return Err(NpyError::BadMagic);
    }
    let rest = &bytes[MAGIC.len()..];
    let (major, minor) = match rest {
        [major, minor, ..] => (*major, *minor),
        _ => return Err(NpyError::Truncated),
    };

    let (header_len, header_start) = match major {
        1 => {
            let len = rest.get(2..4).ok_or(NpyError::Truncated)?;
            (u16::from_le_bytes([len[0], len[1]]) as usize, MAGIC.len() + 4)
        }
        2 | 3 => {
            let len = rest.get(2..6).ok_or(NpyError::Truncated)?;
            (
                u32::from_le_bytes([len[0], len[1], len[2], len[3]]) as usize,
                MAGIC.len() + 6,
            )
        }
        _ => return Err(NpyError::UnsupportedVersion(major, minor)),
    };

    let header_end = header_start + header_len;
    let header = bytes
        .get(header_start..header_end)
        .ok_or(NpyError::Truncated)?;
    let header = std::str::from_utf8(header)
        .map_err(|e| NpyError::Header(e.to_string()))?;

    let descr = DESCR_RE
        .captures(header)
        .ok_or_else(|| NpyError::Header("no 'descr' key".into()))?[1]
        .to_string();
    let dtype = Dtype::parse(&descr)?;

    if !FORTRAN_RE.is_match(header) {
        return Err(NpyError::Header("no 'fortran_order' key".into()));
    }

    let shape = SHAPE_RE
        .captures(header)
        .ok_or_else(|| NpyError::Header("no 'shape' key".into()))?[1]
        .to_string();
    let dims: Vec<&str> = shape
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .collect();
    let len: usize = match dims.as_slice() {
        [n] => n.parse().map_err(|_| NpyError::Shape(shape.clone()))?,
        _ => return Err(NpyError::Shape(shape.clone())),
    };

    let data = &bytes[header_end..];
    let width = dtype.width();
    let needed = len
        .checked_mul(width)
        .ok_or_else(|| NpyError::Shape(shape.clone()))?;
    if data.len() < needed {
        return Err(NpyError::Truncated);
    }

    data.chunks_exact(width)
        .take(len)
        .enumerate()
        .map(|(i, chunk)| read_value(dtype, chunk, i))
        .collect()
}

fn read_value(dtype: Dtype, chunk: &[u8], position: usize) -> Result<i64, NpyError> {
    let mut buf4 = [0u8; 4];
    let mut buf8 = [0u8; 8];
    match dtype {
        Dtype::I4 => {
            buf4.copy_from_slice(chunk);
            Ok(i32::from_le_bytes(buf4) as i64)
        }
        Dtype::U4 => {
            buf4.copy_from_slice(chunk);
            Ok(u32::from_le_bytes(buf4) as i64)
        }
        Dtype::I8 => {
            buf8.copy_from_slice(chunk);
            Ok(i64::from_le_bytes(buf8))
        }
        Dtype::U8 => {
            buf8.copy_from_slice(chunk);
            let v = u64::from_le_bytes(buf8);
            i64::try_from(v).map_err(|_| NpyError::OutOfRange(v.to_string(), position))
        }
        Dtype::F8 => {
            buf8.copy_from_slice(chunk);
            let v = f64::from_le_bytes(buf8);
            if !v.is_finite() || v.fract() != 0.0 {
                Err(NpyError::NotInteger(v, position))
            } else if !(i64::MIN as f64..i64::MAX as f64).contains(&v) {
                Err(NpyError::OutOfRange(v.to_string(), position))
            } else {
                Ok(v as i64)
            }
        }
    }
}
