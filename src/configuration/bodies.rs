//! Plain-text body lists.
//!
//! One body per line, whitespace separated:
//!
//! ```text
//! mass px py pz vx vy vz
//! ```
//!
//! A six-field line (`px py pz vx vy vz`) is a unit-mass body. Blank lines
//! and lines starting with `#` are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::simulation::states::{Body, NVec3};

pub fn read_bodies<R: BufRead>(reader: R) -> Result<Vec<Body>> {
    let mut bodies = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields = trimmed
            .split_whitespace()
            .map(|f| {
                f.parse::<f64>().map_err(|e| Error::Parse {
                    line: i + 1,
                    msg: format!("{f:?}: {e}"),
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        let (m, rest) = match fields.len() {
            7 => (fields[0], &fields[1..]),
            6 => (1.0, &fields[..]),
            n => {
                return Err(Error::Parse {
                    line: i + 1,
                    msg: format!("expected 6 or 7 fields, found {n}"),
                })
            }
        };

        bodies.push(Body {
            m,
            x: NVec3::new(rest[0], rest[1], rest[2]),
            v: NVec3::new(rest[3], rest[4], rest[5]),
        });
    }

    Ok(bodies)
}

pub fn load_bodies(path: &Path) -> Result<Vec<Body>> {
    read_bodies(BufReader::new(File::open(path)?))
}

/// Write seven-field lines in `{:.6e}` notation.
pub fn write_bodies<W: Write>(mut writer: W, bodies: &[Body]) -> Result<()> {
    for b in bodies {
        writeln!(
            writer,
            "{:.6e} {:.6e} {:.6e} {:.6e} {:.6e} {:.6e} {:.6e}",
            b.m, b.x.x, b.x.y, b.x.z, b.v.x, b.v.y, b.v.z
        )?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_bodies(path: &Path, bodies: &[Body]) -> Result<()> {
    write_bodies(BufWriter::new(File::create(path)?), bodies)
}
