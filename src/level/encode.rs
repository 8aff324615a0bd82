//! Level table encoding
//!
//! The producer side of [`super::decode`]. Anything the format cannot hold
//! (a count over one byte, a coordinate over five bits, a table over 64 KiB)
//! is rejected rather than truncated.

use super::bits::{BitWriter, COORD_BITS};
use super::decode::{RECORD_STREAM, SPAWN_RECORD_BYTES};
use super::{Level, LevelError, SpawnParams};

/// Largest value a packed coordinate can carry
const MAX_COORD: usize = (1 << COORD_BITS) - 1;

fn check(field: &'static str, value: usize, max: usize) -> Result<(), LevelError> {
    if value > max {
        log::warn!("Cannot encode {} = {} (max {})", field, value, max);
        return Err(LevelError::OutOfRange { field, value, max });
    }
    Ok(())
}

fn count_byte(field: &'static str, len: usize) -> Result<u8, LevelError> {
    check(field, len, u8::MAX as usize)?;
    Ok(len as u8)
}

/// Coordinate stream writer that refuses values over five bits
struct Coords(BitWriter);

impl Coords {
    fn put(&mut self, field: &'static str, values: &[u8]) -> Result<(), LevelError> {
        for &v in values {
            check(field, v as usize, MAX_COORD)?;
            self.0.coord(v);
        }
        Ok(())
    }
}

impl Level {
    /// Serialize this level as one table record
    pub fn encode(&self) -> Result<Vec<u8>, LevelError> {
        let mut out = Vec::with_capacity(RECORD_STREAM + 32);
        out.push(self.theme);
        out.extend_from_slice(&self.time_bonus.to_le_bytes());

        for params in self.players.iter().chain(self.monsters.iter()) {
            let start = out.len();
            write_spawn(&mut out, params);
            debug_assert_eq!(out.len() - start, SPAWN_RECORD_BYTES);
        }

        out.extend_from_slice(self.bitmap.as_bytes());
        out.push(count_byte("treasure count", self.treasures.len())?);
        out.push(count_byte("one-way count", self.one_ways.len())?);
        out.push(count_byte("ladder count", self.ladders.len())?);
        out.push(count_byte("fire count", self.fires.len())?);
        debug_assert_eq!(out.len(), RECORD_STREAM);

        let mut bits = Coords(BitWriter::new());
        for params in self.players.iter().chain(self.monsters.iter()) {
            bits.put("spawn", &[params.x, params.y])?;
        }
        for &(x, y) in &self.treasures {
            bits.put("treasure", &[x, y])?;
        }
        for span in &self.one_ways {
            bits.put("one-way", &[span.row, span.x1, span.x2])?;
        }
        for ladder in &self.ladders {
            bits.put("ladder", &[ladder.column, ladder.y1, ladder.y2])?;
        }
        for span in &self.fires {
            bits.put("fire", &[span.row, span.x1, span.x2])?;
        }
        out.extend_from_slice(&bits.0.into_bytes());
        Ok(out)
    }
}

fn write_spawn(out: &mut Vec<u8>, params: &SpawnParams) {
    out.push(params.flags.bits());
    out.push(params.speed);
    out.extend_from_slice(&params.impulse.to_le_bytes());
    out.push(params.input);
    out.push(params.update);
    out.push(params.render);
}

/// Build a complete level table from a list of levels
pub fn encode_table(levels: &[Level]) -> Result<Vec<u8>, LevelError> {
    let records = levels.iter().map(Level::encode).collect::<Result<Vec<_>, _>>()?;

    let mut out = vec![count_byte("level count", records.len())?];

    let mut offset = 1 + 2 * records.len();
    for record in &records {
        check("record offset", offset, u16::MAX as usize)?;
        out.extend_from_slice(&(offset as u16).to_le_bytes());
        offset += record.len();
    }
    for record in &records {
        out.extend_from_slice(record);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::decode::stream_len;
    use crate::level::{LadderSpan, LevelTable, Span};

    #[test]
    fn test_record_length_matches_counts() {
        let mut level = Level::blank(0);
        level.treasures = vec![(1, 1), (2, 2), (3, 3)];
        level.fires = vec![Span { row: 5, x1: 0, x2: 4 }];
        let record = level.encode().unwrap();
        assert_eq!(record.len(), RECORD_STREAM + stream_len(3, 0, 0, 1));
    }

    #[test]
    fn test_reencode_is_byte_identical() {
        let mut level = Level::blank(3);
        level.time_bonus = 0xbeef;
        level.players[0].x = 7;
        level.players[0].y = 19;
        level.treasures = vec![(0, 0), (29, 27)];
        level.one_ways = vec![Span { row: 10, x1: 2, x2: 28 }];
        let blob = encode_table(&[level.clone(), level]).unwrap();

        let table = LevelTable::new(&blob);
        let decoded: Vec<Level> = (0..table.count()).map(|i| table.load(i).unwrap()).collect();
        assert_eq!(encode_table(&decoded).unwrap(), blob);
    }

    #[test]
    fn test_too_many_treasures_is_rejected() {
        let mut level = Level::blank(0);
        level.treasures = vec![(1, 1); 256];
        assert_eq!(
            level.encode(),
            Err(LevelError::OutOfRange {
                field: "treasure count",
                value: 256,
                max: 255,
            })
        );

        level.treasures.truncate(255);
        let blob = encode_table(&[level]).unwrap();
        assert_eq!(LevelTable::new(&blob).load(0).unwrap().treasures.len(), 255);
    }

    #[test]
    fn test_wide_coordinate_is_rejected() {
        let mut level = Level::blank(0);
        level.ladders = vec![LadderSpan { column: 3, y1: 2, y2: 40 }];
        assert!(matches!(
            level.encode(),
            Err(LevelError::OutOfRange { field: "ladder", value: 40, .. })
        ));
    }

    #[test]
    fn test_absent_spawn_coordinates_fit() {
        // Unused slots are stored as 31, the largest packed coordinate
        assert!(Level::blank(0).encode().is_ok());
    }

    #[test]
    fn test_too_many_levels_is_rejected() {
        let levels = vec![Level::blank(0); 256];
        assert!(matches!(
            encode_table(&levels),
            Err(LevelError::OutOfRange { field: "level count", .. })
        ));
    }
}
