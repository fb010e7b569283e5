//! Native .jyoti binary format for visibility map persistence.
//!
//! Format (all multi-byte values little-endian):
//! - Header (48 bytes):
//!   - Magic: "JYOTI" (5 bytes)
//!   - Version: u8 (1 byte)
//!   - Voxel counts x, y, z: 3 × u32 (12 bytes)
//!   - Bounds min x, y, z: 3 × f32 (12 bytes)
//!   - Bounds max x, y, z: 3 × f32 (12 bytes)
//!   - Sensor count: u32 (4 bytes)
//!   - Flags: u8 (1 byte): bit 0: per-sensor efficiency block present,
//!     bit 1: scalar efficiency present, bit 2: compression block present
//!   - Reserved: 1 byte
//! - Optional efficiency block: 1 f32 (scalar) or sensor-count f32
//! - Optional compression block: vmax f32, eps f32, sin_out u8
//! - Visibility data: num_voxels × num_sensors f32, row order = flat
//!   voxel id (x fastest-varying)
//!
//! The compression block persists the codec triple alongside compressed
//! values so they can be inverted after a round trip.

use std::io::{Read, Write};
use std::path::Path;

use log::info;

use crate::core::{Bounds, Point3};
use crate::error::{Error, Result};
use crate::field::{Efficiency, VisibilityField};
use crate::grid::GridSpec;
use crate::transform::LogCompression;

/// Magic bytes for the .jyoti format
const MAGIC: &[u8; 5] = b"JYOTI";

/// Current format version
const VERSION: u8 = 1;

/// Header size in bytes
const HEADER_SIZE: usize = 48;

/// Flag bit: per-sensor efficiency block follows the header
const FLAG_EFF_PER_SENSOR: u8 = 0x01;
/// Flag bit: scalar efficiency follows the header
const FLAG_EFF_SCALAR: u8 = 0x02;
/// Flag bit: compression block follows the efficiency block
const FLAG_COMPRESSION: u8 = 0x04;

/// Save a visibility field to a .jyoti file
pub fn save(field: &VisibilityField, path: &Path) -> Result<()> {
    info!("saving visibility map to {}", path.display());
    let mut file = std::fs::File::create(path)?;
    write_to(field, &mut file)?;
    info!("visibility map saved");
    Ok(())
}

/// Write a visibility field to a writer in .jyoti format
pub fn write_to<W: Write>(field: &VisibilityField, writer: &mut W) -> Result<()> {
    let spec = field.spec();
    let shape = spec.shape();
    let bounds = spec.bounds();

    let mut header = [0u8; HEADER_SIZE];
    header[0..5].copy_from_slice(MAGIC);
    header[5] = VERSION;

    for (i, &n) in shape.iter().enumerate() {
        let off = 6 + i * 4;
        header[off..off + 4].copy_from_slice(&(n as u32).to_le_bytes());
    }
    write_point(&mut header[18..30], bounds.min);
    write_point(&mut header[30..42], bounds.max);
    header[42..46].copy_from_slice(&(field.num_sensors() as u32).to_le_bytes());

    let mut flags = 0u8;
    match field.efficiency() {
        Efficiency::Uniform(v) if *v != 1.0 => flags |= FLAG_EFF_SCALAR,
        Efficiency::Uniform(_) => {}
        Efficiency::PerSensor(_) => flags |= FLAG_EFF_PER_SENSOR,
    }
    if field.compression().is_some() {
        flags |= FLAG_COMPRESSION;
    }
    header[46] = flags;

    writer.write_all(&header)?;

    match field.efficiency() {
        Efficiency::Uniform(v) if flags & FLAG_EFF_SCALAR != 0 => {
            writer.write_all(&v.to_le_bytes())?;
        }
        Efficiency::PerSensor(values) => {
            for v in values {
                writer.write_all(&v.to_le_bytes())?;
            }
        }
        Efficiency::Uniform(_) => {}
    }

    if let Some(codec) = field.compression() {
        writer.write_all(&codec.vmax.to_le_bytes())?;
        writer.write_all(&codec.eps.to_le_bytes())?;
        writer.write_all(&[codec.sin_out as u8])?;
    }

    // Visibility rows in flat voxel id order; stored as-is (compressed
    // values stay compressed, the codec block says how to invert them).
    let mut buf = Vec::with_capacity(field.values().len() * 4);
    for v in field.values() {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    writer.write_all(&buf)?;

    Ok(())
}

/// Load a visibility field from a .jyoti file
pub fn load(path: &Path) -> Result<VisibilityField> {
    info!("loading visibility map from {}", path.display());
    let mut file = std::fs::File::open(path)?;
    let field = read_from(&mut file)?;
    info!(
        "visibility map loaded: {} voxels, {} sensors",
        field.num_voxels(),
        field.num_sensors()
    );
    Ok(field)
}

/// Load a visibility field and finish constructing it from configuration:
/// batch backend, optional load-time compression, optional sensor table.
///
/// Compression is only applied when the file does not already carry a
/// codec block; stored-compressed values are never compressed twice.
pub fn load_with(path: &Path, config: &crate::config::JyotiConfig) -> Result<VisibilityField> {
    let mut field = load(path)?.with_backend(config.query.backend);

    if field.compression().is_none() {
        if let Some(codec) = config.compression.codec() {
            field = field.compress(codec);
        }
    }

    if let Some(table) = &config.sensors.positions {
        let positions = super::sensors::load_sensor_positions(table)?;
        field = field.with_sensor_positions(positions)?;
    }

    Ok(field)
}

/// Read a visibility field from a reader in .jyoti format
pub fn read_from<R: Read>(reader: &mut R) -> Result<VisibilityField> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    if &header[0..5] != MAGIC {
        return Err(Error::InvalidFormat("invalid magic bytes".to_string()));
    }
    let version = header[5];
    if version != VERSION {
        return Err(Error::VersionMismatch {
            expected: VERSION,
            found: version,
        });
    }

    let mut shape = [0usize; 3];
    for (i, n) in shape.iter_mut().enumerate() {
        let off = 6 + i * 4;
        *n = u32::from_le_bytes([header[off], header[off + 1], header[off + 2], header[off + 3]])
            as usize;
    }
    let min = read_point(&header[18..30]);
    let max = read_point(&header[30..42]);
    let num_sensors =
        u32::from_le_bytes([header[42], header[43], header[44], header[45]]) as usize;
    let flags = header[46];

    let spec = GridSpec::new(shape, Bounds::new(min, max))?;

    let eff = if flags & FLAG_EFF_PER_SENSOR != 0 {
        Efficiency::PerSensor(read_f32_vec(reader, num_sensors)?)
    } else if flags & FLAG_EFF_SCALAR != 0 {
        Efficiency::Uniform(read_f32(reader)?)
    } else {
        Efficiency::default()
    };

    let compression = if flags & FLAG_COMPRESSION != 0 {
        let vmax = read_f32(reader)?;
        let eps = read_f32(reader)?;
        let mut sin_out = [0u8; 1];
        reader.read_exact(&mut sin_out)?;
        Some(LogCompression::new(vmax, eps, sin_out[0] != 0))
    } else {
        None
    };

    let vis = read_f32_vec(reader, spec.num_voxels() * num_sensors)?;

    let mut field = VisibilityField::new(spec, vis, num_sensors)?.with_efficiency(eff)?;
    if let Some(codec) = compression {
        field = field.assume_compressed(codec);
    }
    Ok(field)
}

fn write_point(buf: &mut [u8], p: Point3) {
    buf[0..4].copy_from_slice(&p.x.to_le_bytes());
    buf[4..8].copy_from_slice(&p.y.to_le_bytes());
    buf[8..12].copy_from_slice(&p.z.to_le_bytes());
}

fn read_point(buf: &[u8]) -> Point3 {
    Point3::new(
        f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
        f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
        f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
    )
}

fn read_f32<R: Read>(reader: &mut R) -> Result<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

fn read_f32_vec<R: Read>(reader: &mut R, count: usize) -> Result<Vec<f32>> {
    let mut buf = vec![0u8; count * 4];
    reader.read_exact(&mut buf)?;
    Ok(buf
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_field() -> VisibilityField {
        let spec =
            GridSpec::from_ranges([3, 2, 2], [(-1.0, 1.0), (0.0, 4.0), (0.0, 1.0)]).unwrap();
        let n = spec.num_voxels();
        let vis: Vec<f32> = (0..n * 2).map(|i| i as f32 * 0.01).collect();
        VisibilityField::new(spec, vis, 2).unwrap()
    }

    #[test]
    fn test_round_trip_plain() {
        let field = sample_field();

        let mut buffer = Vec::new();
        write_to(&field, &mut buffer).unwrap();

        let loaded = read_from(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(loaded.spec(), field.spec());
        assert_eq!(loaded.num_sensors(), 2);
        assert_eq!(loaded.values(), field.values());
        assert_eq!(loaded.efficiency(), &Efficiency::Uniform(1.0));
        assert!(loaded.compression().is_none());
    }

    #[test]
    fn test_round_trip_efficiency_scalar() {
        let field = sample_field()
            .with_efficiency(Efficiency::Uniform(0.85))
            .unwrap();

        let mut buffer = Vec::new();
        write_to(&field, &mut buffer).unwrap();
        let loaded = read_from(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(loaded.efficiency(), &Efficiency::Uniform(0.85));
    }

    #[test]
    fn test_round_trip_efficiency_per_sensor() {
        let field = sample_field()
            .with_efficiency(Efficiency::PerSensor(vec![0.9, 1.1]))
            .unwrap();

        let mut buffer = Vec::new();
        write_to(&field, &mut buffer).unwrap();
        let loaded = read_from(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(loaded.efficiency(), &Efficiency::PerSensor(vec![0.9, 1.1]));
    }

    #[test]
    fn test_round_trip_compressed() {
        let codec = LogCompression::new(1.0, 1e-7, true);
        let field = sample_field().compress(codec);
        let stored = field.values().to_vec();

        let mut buffer = Vec::new();
        write_to(&field, &mut buffer).unwrap();
        let loaded = read_from(&mut Cursor::new(buffer)).unwrap();

        // Values round-trip still compressed, with the codec available to
        // invert them.
        assert_eq!(loaded.values(), &stored[..]);
        assert_eq!(loaded.compression(), Some(&codec));
        let raw = loaded.value_raw(1, 0);
        assert!((raw - 0.02).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_magic() {
        let mut data = Vec::new();
        data.extend_from_slice(b"WRONG");
        data.push(VERSION);
        data.extend([0u8; HEADER_SIZE - 6]);

        let result = read_from(&mut Cursor::new(data));
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_version_mismatch() {
        let mut data = Vec::new();
        data.extend_from_slice(MAGIC);
        data.push(99);
        data.extend([0u8; HEADER_SIZE - 6]);

        let result = read_from(&mut Cursor::new(data));
        assert!(matches!(result, Err(Error::VersionMismatch { .. })));
    }

    #[test]
    fn test_truncated_payload() {
        let field = sample_field();
        let mut buffer = Vec::new();
        write_to(&field, &mut buffer).unwrap();
        buffer.truncate(buffer.len() - 8);

        let result = read_from(&mut Cursor::new(buffer));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
