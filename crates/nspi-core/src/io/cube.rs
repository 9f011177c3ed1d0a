use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use memmap2::Mmap;
use ndarray::{Array2, Array3};

use crate::error::{NspiError, Result};
use crate::raster::{CloudMask, Image};

use super::dim_u32;

pub const CUBE_HEADER_SIZE: usize = 24;
pub const CUBE_MAGIC: &[u8; 8] = b"NSPICUBE";
pub const CUBE_VERSION: u16 = 1;

/// Sample encoding of a cube file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleType {
    /// f64 DN samples (images).
    F64,
    /// i32 region codes (masks).
    I32,
}

impl SampleType {
    fn id(self) -> u16 {
        match self {
            Self::F64 => 1,
            Self::I32 => 2,
        }
    }

    fn from_id(id: u16) -> Result<Self> {
        match id {
            1 => Ok(Self::F64),
            2 => Ok(Self::I32),
            other => Err(NspiError::InvalidCube(format!("unknown sample type {other}"))),
        }
    }

    pub fn byte_size(self) -> usize {
        match self {
            Self::F64 => 8,
            Self::I32 => 4,
        }
    }
}

/// Cube file header (24 bytes, little-endian).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CubeHeader {
    pub sample_type: SampleType,
    pub rows: u32,
    pub cols: u32,
    pub bands: u32,
}

impl CubeHeader {
    pub fn sample_count(&self) -> Result<usize> {
        (self.rows as usize)
            .checked_mul(self.cols as usize)
            .and_then(|n| n.checked_mul(self.bands as usize))
            .ok_or_else(|| NspiError::InvalidCube("dimensions overflow".into()))
    }

    /// Bytes of sample data following the header.
    pub fn data_byte_size(&self) -> Result<usize> {
        self.sample_count()?
            .checked_mul(self.sample_type.byte_size())
            .ok_or_else(|| NspiError::InvalidCube("data size overflow".into()))
    }
}

/// Memory-mapped cube file reader.
pub struct CubeReader {
    mmap: Mmap,
    pub header: CubeHeader,
}

impl CubeReader {
    /// Open a cube file and validate its header and length.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < CUBE_HEADER_SIZE {
            return Err(NspiError::InvalidCube("file too small for header".into()));
        }
        if &mmap[0..8] != CUBE_MAGIC {
            return Err(NspiError::InvalidCube("missing NSPICUBE magic".into()));
        }

        let header = parse_header(&mmap[..CUBE_HEADER_SIZE])?;
        let expected = CUBE_HEADER_SIZE + header.data_byte_size()?;
        if mmap.len() < expected {
            return Err(NspiError::InvalidCube(format!(
                "file truncated: expected at least {} bytes, got {}",
                expected,
                mmap.len()
            )));
        }

        Ok(Self { mmap, header })
    }

    fn data(&self) -> Result<&[u8]> {
        let end = CUBE_HEADER_SIZE + self.header.data_byte_size()?;
        Ok(&self.mmap[CUBE_HEADER_SIZE..end])
    }

    fn dims(&self) -> (usize, usize, usize) {
        (
            self.header.rows as usize,
            self.header.cols as usize,
            self.header.bands as usize,
        )
    }

    /// Decode an f64 cube into an [`Image`].
    pub fn read_image(&self) -> Result<Image> {
        if self.header.sample_type != SampleType::F64 {
            return Err(NspiError::InvalidCube(format!(
                "expected f64 samples, found {:?}",
                self.header.sample_type
            )));
        }
        let mut samples = vec![0.0f64; self.header.sample_count()?];
        LittleEndian::read_f64_into(self.data()?, &mut samples);
        let data = Array3::from_shape_vec(self.dims(), samples)
            .map_err(|e| NspiError::InvalidCube(e.to_string()))?;
        Ok(Image::new(data))
    }

    /// Decode a single-band i32 cube into a [`CloudMask`].
    pub fn read_mask(&self) -> Result<CloudMask> {
        if self.header.sample_type != SampleType::I32 || self.header.bands != 1 {
            return Err(NspiError::InvalidCube(format!(
                "expected single-band i32 mask, found {:?} with {} bands",
                self.header.sample_type, self.header.bands
            )));
        }
        let mut codes = vec![0i32; self.header.sample_count()?];
        LittleEndian::read_i32_into(self.data()?, &mut codes);
        let (rows, cols, _) = self.dims();
        let data = Array2::from_shape_vec((rows, cols), codes)
            .map_err(|e| NspiError::InvalidCube(e.to_string()))?;
        Ok(CloudMask::new(data))
    }
}

fn parse_header(mut buf: &[u8]) -> Result<CubeHeader> {
    let mut magic = [0u8; 8];
    std::io::Read::read_exact(&mut buf, &mut magic)?;

    let version = buf.read_u16::<LittleEndian>()?;
    if version != CUBE_VERSION {
        return Err(NspiError::InvalidCube(format!(
            "unsupported version {version}"
        )));
    }
    let sample_type = SampleType::from_id(buf.read_u16::<LittleEndian>()?)?;
    let rows = buf.read_u32::<LittleEndian>()?;
    let cols = buf.read_u32::<LittleEndian>()?;
    let bands = buf.read_u32::<LittleEndian>()?;

    Ok(CubeHeader {
        sample_type,
        rows,
        cols,
        bands,
    })
}

fn write_header(w: &mut impl Write, header: &CubeHeader) -> Result<()> {
    w.write_all(CUBE_MAGIC)?;
    w.write_u16::<LittleEndian>(CUBE_VERSION)?;
    w.write_u16::<LittleEndian>(header.sample_type.id())?;
    w.write_u32::<LittleEndian>(header.rows)?;
    w.write_u32::<LittleEndian>(header.cols)?;
    w.write_u32::<LittleEndian>(header.bands)?;
    Ok(())
}

/// Write an image as an f64 cube.
pub fn write_image_cube(image: &Image, path: &Path) -> Result<()> {
    let (rows, cols, bands) = image.dims();
    let header = CubeHeader {
        sample_type: SampleType::F64,
        rows: dim_u32(rows, "rows")?,
        cols: dim_u32(cols, "cols")?,
        bands: dim_u32(bands, "bands")?,
    };

    let mut writer = BufWriter::new(File::create(path)?);
    write_header(&mut writer, &header)?;
    // Iteration follows logical (row, col, band) order regardless of layout.
    for &v in image.data.iter() {
        writer.write_f64::<LittleEndian>(v)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a mask as a single-band i32 cube.
pub fn write_mask_cube(mask: &CloudMask, path: &Path) -> Result<()> {
    let (rows, cols) = mask.dims();
    let header = CubeHeader {
        sample_type: SampleType::I32,
        rows: dim_u32(rows, "rows")?,
        cols: dim_u32(cols, "cols")?,
        bands: 1,
    };

    let mut writer = BufWriter::new(File::create(path)?);
    write_header(&mut writer, &header)?;
    for &code in mask.data.iter() {
        writer.write_i32::<LittleEndian>(code)?;
    }
    writer.flush()?;
    Ok(())
}
