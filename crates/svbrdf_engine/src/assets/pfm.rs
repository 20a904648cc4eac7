//! Portable float map (PFM) images
//!
//! A PFM file is a three-line ASCII header followed by raw 32-bit floats:
//!
//! ```text
//! PF            (RGB; "Pf" for one channel)
//! <width> <height>
//! <scale>       (negative: little-endian data, positive: big-endian)
//! ```
//!
//! Rows are kept in stored order. Single-channel images are widened to RGB
//! so every map uploads the same way.

use std::io::{Cursor, Write};
use std::path::Path;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

use super::LoadError;

/// Decoding failures, reported as [`LoadError::MalformedTexture`] by [`PfmImage::load`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PfmError {
    /// First line is neither `PF` nor `Pf`
    #[error("unknown magic '{0}'")]
    BadMagic(String),

    /// Header line missing or not numeric
    #[error("invalid header: {0}")]
    BadHeader(String),

    /// Fewer floats than the header promises
    #[error("expected {expected} floats, found {found}")]
    Truncated {
        /// Floats promised by the header
        expected: usize,
        /// Floats present
        found: usize,
    },
}

/// Decoded RGB float image
#[derive(Debug, Clone, PartialEq)]
pub struct PfmImage {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
    /// Row-major RGB pixels in stored order
    pub pixels: Vec<[f32; 3]>,
}

impl PfmImage {
    /// Read and decode a PFM file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoadError::MissingPath { path: path.to_path_buf() });
        }
        let bytes = std::fs::read(path)?;
        let image = Self::decode(&bytes).map_err(|err| LoadError::MalformedTexture {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        log::debug!("Loaded {} ({}x{})", path.display(), image.width, image.height);
        Ok(image)
    }

    /// Decode PFM bytes
    pub fn decode(bytes: &[u8]) -> Result<Self, PfmError> {
        let (magic, rest) = split_line(bytes)?;
        let channels = match magic.as_str() {
            "PF" => 3,
            "Pf" => 1,
            _ => return Err(PfmError::BadMagic(magic)),
        };

        let (dims, rest) = split_line(rest)?;
        let mut dims_iter = dims.split_whitespace().map(str::parse::<usize>);
        let (Some(Ok(width)), Some(Ok(height)), None) = (dims_iter.next(), dims_iter.next(), dims_iter.next()) else {
            return Err(PfmError::BadHeader(format!("dimensions '{}'", dims)));
        };

        let (scale, data) = split_line(rest)?;
        let scale: f32 = scale
            .parse()
            .map_err(|_| PfmError::BadHeader(format!("scale '{}'", scale)))?;

        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(|| PfmError::BadHeader(format!("dimensions '{}' overflow", dims)))?;
        let found = data.len() / 4;
        if found < expected {
            return Err(PfmError::Truncated { expected, found });
        }

        let mut floats = vec![0.0f32; expected];
        let mut cursor = Cursor::new(data);
        let read = if scale < 0.0 {
            cursor.read_f32_into::<LittleEndian>(&mut floats)
        } else {
            cursor.read_f32_into::<BigEndian>(&mut floats)
        };
        read.map_err(|_| PfmError::Truncated { expected, found })?;

        let pixels = if channels == 3 {
            floats.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
        } else {
            floats.iter().map(|&v| [v, v, v]).collect()
        };

        Ok(Self { width, height, pixels })
    }

    /// Encode as a little-endian RGB PFM
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(32 + self.pixels.len() * 12);
        // Writes into a Vec cannot fail
        let _ = write!(out, "PF\n{} {}\n-1.0\n", self.width, self.height);
        for value in self.pixels.iter().flatten() {
            let _ = out.write_f32::<LittleEndian>(*value);
        }
        out
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Pixel at column `x` of stored row `y`
    pub fn pixel(&self, x: usize, y: usize) -> Option<[f32; 3]> {
        if x >= self.width {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// Pixels as a flat float slice
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Split off one header line, returning it trimmed along with the rest
fn split_line(bytes: &[u8]) -> Result<(String, &[u8]), PfmError> {
    let end = bytes
        .iter()
        .position(|&b| b == b'\n')
        .ok_or_else(|| PfmError::BadHeader("unterminated header line".to_string()))?;
    let line = std::str::from_utf8(&bytes[..end])
        .map_err(|_| PfmError::BadHeader("header is not text".to_string()))?;
    Ok((line.trim().to_string(), &bytes[end + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(magic: &str, width: usize, height: usize, scale: &str) -> Vec<u8> {
        format!("{}\n{} {}\n{}\n", magic, width, height, scale).into_bytes()
    }

    #[test]
    fn test_decode_rgb_little_endian() {
        let mut bytes = header("PF", 2, 1, "-1.0");
        for v in [0.5f32, 1.0, 2.0, -3.0, 0.25, 8.0] {
            bytes.write_f32::<LittleEndian>(v).unwrap();
        }
        let image = PfmImage::decode(&bytes).unwrap();
        assert_eq!(image.dimensions(), (2, 1));
        assert_eq!(image.pixel(0, 0), Some([0.5, 1.0, 2.0]));
        assert_eq!(image.pixel(1, 0), Some([-3.0, 0.25, 8.0]));
        assert_eq!(image.pixel(2, 0), None);
    }

    #[test]
    fn test_decode_big_endian() {
        let mut bytes = header("PF", 1, 1, "1.0");
        for v in [1.5f32, 2.5, 3.5] {
            bytes.write_f32::<BigEndian>(v).unwrap();
        }
        let image = PfmImage::decode(&bytes).unwrap();
        assert_eq!(image.pixels, vec![[1.5, 2.5, 3.5]]);
    }

    #[test]
    fn test_grayscale_widened() {
        let mut bytes = header("Pf", 1, 2, "-1");
        bytes.write_f32::<LittleEndian>(0.75).unwrap();
        bytes.write_f32::<LittleEndian>(0.125).unwrap();
        let image = PfmImage::decode(&bytes).unwrap();
        assert_eq!(image.pixel(0, 1), Some([0.125, 0.125, 0.125]));
        assert_eq!(image.as_floats().len(), 6);
    }

    #[test]
    fn test_truncated_data() {
        let mut bytes = header("PF", 2, 2, "-1.0");
        bytes.write_f32::<LittleEndian>(1.0).unwrap();
        assert_eq!(PfmImage::decode(&bytes), Err(PfmError::Truncated { expected: 12, found: 1 }));
    }

    #[test]
    fn test_bad_headers() {
        assert!(matches!(PfmImage::decode(b"P6\n1 1\n255\n"), Err(PfmError::BadMagic(_))));
        assert!(matches!(PfmImage::decode(b"PF\n1\n-1\n"), Err(PfmError::BadHeader(_))));
        assert!(matches!(PfmImage::decode(b"PF\n1 1\nabc\n"), Err(PfmError::BadHeader(_))));
        assert!(matches!(PfmImage::decode(b"PF"), Err(PfmError::BadHeader(_))));
    }

    #[test]
    fn test_overflowing_dimensions_rejected() {
        let bytes = format!("PF\n{} 4\n-1.0\n", usize::MAX / 2);
        assert!(matches!(PfmImage::decode(bytes.as_bytes()), Err(PfmError::BadHeader(_))));

        let bytes = format!("Pf\n{} 2\n-1.0\n", usize::MAX / 2 + 1);
        assert!(matches!(PfmImage::decode(bytes.as_bytes()), Err(PfmError::BadHeader(_))));
    }

    #[test]
    fn test_encoded_file_loads() {
        let image = PfmImage {
            width: 2,
            height: 2,
            pixels: vec![[0.0, 0.1, 0.2], [1.0, 1.1, 1.2], [2.0, 2.1, 2.2], [3.0, 3.1, 3.2]],
        };
        let path = std::env::temp_dir().join(format!("svbrdf_pfm_{}.pfm", std::process::id()));
        std::fs::write(&path, image.encode()).unwrap();

        let loaded = PfmImage::load(&path).unwrap();
        assert_eq!(loaded, image);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let path = std::env::temp_dir().join(format!("svbrdf_bad_{}.pfm", std::process::id()));
        std::fs::write(&path, b"nonsense\n").unwrap();
        let err = PfmImage::load(&path).unwrap_err();
        assert!(matches!(err, LoadError::MalformedTexture { path: ref p, .. } if *p == path));
        std::fs::remove_file(&path).unwrap();
    }
}
