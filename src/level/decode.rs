//! Level table decoding
//!
//! Table layout:
//!
//! | offset        | size      | field                                  |
//! |---------------|-----------|----------------------------------------|
//! | 0             | 1         | level count                            |
//! | 1             | 2 × count | little-endian absolute record offsets  |
//!
//! Record layout (offsets relative to the record):
//!
//! | offset | size   | field                                                   |
//! |--------|--------|---------------------------------------------------------|
//! | 0      | 1      | theme                                                   |
//! | 1      | 2      | time bonus, little-endian                               |
//! | 3      | 8 × 7  | spawn records (players, then monsters)                  |
//! | 59     | 105    | solidity bitmap                                         |
//! | 164    | 4      | treasure, one-way, ladder and fire counts               |
//! | 168    | varies | 5-bit coordinate stream                                 |
//!
//! A spawn record is `flags, speed, impulse lo, impulse hi, input id,
//! update id, render id`. The coordinate stream holds, with no padding
//! between groups: `(x, y)` per player and monster slot, `(x, y)` per
//! treasure, `(row, x1, x2)` per one-way, `(column, y1, y2)` per ladder and
//! `(row, x1, x2)` per fire strip. It is zero-padded to a whole byte.

use crate::consts::{BITMAP_BYTES, MAX_ENTITIES, MAX_PLAYERS, THEME_COUNT};

use super::bits::{BitReader, COORD_BITS};
use super::{LadderSpan, Level, LevelError, SolidityBitmap, Span, SpawnFlags, SpawnParams};

pub const RECORD_THEME: usize = 0;
pub const RECORD_TIME_BONUS: usize = 1;
pub const RECORD_SPAWNS: usize = 3;
pub const SPAWN_RECORD_BYTES: usize = 7;
pub const RECORD_BITMAP: usize = RECORD_SPAWNS + MAX_ENTITIES * SPAWN_RECORD_BYTES;
pub const RECORD_COUNTS: usize = RECORD_BITMAP + BITMAP_BYTES;
pub const RECORD_STREAM: usize = RECORD_COUNTS + 4;

/// Bytes taken by the coordinate stream for the given overlay counts
pub fn stream_len(treasures: usize, one_ways: usize, ladders: usize, fires: usize) -> usize {
    let coords = 2 * MAX_ENTITIES + 2 * treasures + 3 * (one_ways + ladders + fires);
    (coords * COORD_BITS as usize).div_ceil(8)
}

/// The cheap part of a level record, available without decoding the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelHeader {
    /// Absolute offset of the record in the table
    pub offset: usize,
    pub theme: u8,
    pub time_bonus: u16,
    pub treasure_count: u8,
}

/// A borrowed, ROM-style level table
#[derive(Debug, Clone, Copy)]
pub struct LevelTable<'a> {
    data: &'a [u8],
}

impl<'a> LevelTable<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Number of levels declared by the table
    pub fn count(&self) -> usize {
        self.data.first().copied().unwrap_or(0) as usize
    }

    fn record_offset(&self, index: usize) -> Result<usize, LevelError> {
        let at = 1 + index * 2;
        match self.data.get(at..at + 2) {
            Some(&[lo, hi]) => Ok(u16::from_le_bytes([lo, hi]) as usize),
            _ => Err(LevelError::BadTable),
        }
    }

    /// Slice `len` bytes of a record, or report how far short the table is
    fn record_bytes(&self, index: usize, offset: usize, len: usize) -> Result<&'a [u8], LevelError> {
        self.data
            .get(offset..offset + len)
            .ok_or(LevelError::Truncated {
                index,
                offset,
                needed: len,
                len: self.data.len(),
            })
    }

    /// Validate a level index and read its fixed header
    pub fn locate(&self, index: usize) -> Result<LevelHeader, LevelError> {
        let count = self.count();
        if index >= count {
            return Err(LevelError::IndexOutOfRange { index, count });
        }

        let offset = self.record_offset(index)?;
        let head = self.record_bytes(index, offset, RECORD_STREAM)?;

        let theme = head[RECORD_THEME];
        if theme as usize >= THEME_COUNT {
            return Err(LevelError::UnknownTheme { index, theme });
        }

        Ok(LevelHeader {
            offset,
            theme,
            time_bonus: u16::from_le_bytes([head[RECORD_TIME_BONUS], head[RECORD_TIME_BONUS + 1]]),
            treasure_count: head[RECORD_COUNTS],
        })
    }

    /// Decode a full level descriptor
    pub fn load(&self, index: usize) -> Result<Level, LevelError> {
        let header = self.locate(index)?;
        let head = self.record_bytes(index, header.offset, RECORD_STREAM)?;

        let counts = &head[RECORD_COUNTS..RECORD_STREAM];
        let (treasures, one_ways, ladders, fires) = (
            counts[0] as usize,
            counts[1] as usize,
            counts[2] as usize,
            counts[3] as usize,
        );
        let stream = self.record_bytes(
            index,
            header.offset + RECORD_STREAM,
            stream_len(treasures, one_ways, ladders, fires),
        )?;

        let mut level = Level::blank(header.theme);
        level.index = index;
        level.time_bonus = header.time_bonus;
        level.bitmap = SolidityBitmap::from_bytes(&head[RECORD_BITMAP..RECORD_COUNTS])
            .ok_or(LevelError::BadTable)?;

        for slot in 0..MAX_ENTITIES {
            let at = RECORD_SPAWNS + slot * SPAWN_RECORD_BYTES;
            let params = read_spawn(&head[at..at + SPAWN_RECORD_BYTES]);
            if slot < MAX_PLAYERS {
                level.players[slot] = params;
            } else {
                level.monsters[slot - MAX_PLAYERS] = params;
            }
        }

        // Length was checked above, so the stream cannot run dry
        let mut bits = BitReader::new(stream);
        let mut coord = || bits.coord().unwrap_or(SpawnParams::ABSENT);

        for params in level.players.iter_mut().chain(level.monsters.iter_mut()) {
            params.x = coord();
            params.y = coord();
        }
        level.treasures = (0..treasures).map(|_| (coord(), coord())).collect();
        level.one_ways = (0..one_ways)
            .map(|_| Span {
                row: coord(),
                x1: coord(),
                x2: coord(),
            })
            .collect();
        level.ladders = (0..ladders)
            .map(|_| LadderSpan {
                column: coord(),
                y1: coord(),
                y2: coord(),
            })
            .collect();
        level.fires = (0..fires)
            .map(|_| Span {
                row: coord(),
                x1: coord(),
                x2: coord(),
            })
            .collect();

        log::debug!(
            "Decoded level {} (theme {}, {} treasures, {} monsters placed)",
            index,
            level.theme,
            level.treasures.len(),
            level.monsters.iter().filter(|m| m.on_grid()).count(),
        );
        Ok(level)
    }
}

fn read_spawn(bytes: &[u8]) -> SpawnParams {
    SpawnParams {
        flags: SpawnFlags::from_bits_truncate(bytes[0]),
        speed: bytes[1],
        impulse: u16::from_le_bytes([bytes[2], bytes[3]]),
        input: bytes[4],
        update: bytes[5],
        render: bytes[6],
        x: SpawnParams::ABSENT,
        y: SpawnParams::ABSENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::encode_table;

    fn sample_level() -> Level {
        let mut level = Level::blank(2);
        level.time_bonus = 300;
        level.bitmap.set(0, 27, true);
        level.bitmap.set(29, 27, true);
        level.players[0] = SpawnParams {
            flags: SpawnFlags::INTERACTS | SpawnFlags::VISIBLE,
            speed: 60,
            impulse: 600,
            input: 1,
            update: 1,
            render: 1,
            x: 3,
            y: 26,
        };
        level.monsters[1] = SpawnParams {
            flags: SpawnFlags::INTERACTS | SpawnFlags::AUTORESPAWN,
            speed: 30,
            impulse: 0x0a02,
            input: 6,
            update: 2,
            render: 4,
            x: 12,
            y: 4,
        };
        level.treasures = vec![(5, 20), (31, 0)];
        level.one_ways = vec![Span { row: 20, x1: 4, x2: 9 }];
        level.ladders = vec![LadderSpan { column: 10, y1: 20, y2: 26 }];
        level.fires = vec![Span { row: 26, x1: 14, x2: 16 }];
        level
    }

    #[test]
    fn test_layout_offsets() {
        assert_eq!(RECORD_BITMAP, 59);
        assert_eq!(RECORD_COUNTS, 164);
        assert_eq!(RECORD_STREAM, 168);
        // 16 spawn coordinates, no overlays: 80 bits
        assert_eq!(stream_len(0, 0, 0, 0), 10);
        // plus one treasure: 90 bits -> 12 bytes
        assert_eq!(stream_len(1, 0, 0, 0), 12);
    }

    #[test]
    fn test_decode_round_trip() {
        let mut level = sample_level();
        let blob = encode_table(std::slice::from_ref(&level)).unwrap();
        let table = LevelTable::new(&blob);
        assert_eq!(table.count(), 1);

        let header = table.locate(0).unwrap();
        assert_eq!(header.offset, 3);
        assert_eq!(header.theme, 2);
        assert_eq!(header.time_bonus, 300);
        assert_eq!(header.treasure_count, 2);

        let decoded = table.load(0).unwrap();
        level.index = 0;
        assert_eq!(decoded, level);
    }

    #[test]
    fn test_index_out_of_range() {
        let blob = encode_table(&[sample_level()]).unwrap();
        let table = LevelTable::new(&blob);
        assert_eq!(
            table.locate(1),
            Err(LevelError::IndexOutOfRange { index: 1, count: 1 })
        );
        assert!(table.load(7).is_err());
    }

    #[test]
    fn test_unknown_theme() {
        let mut level = sample_level();
        level.theme = THEME_COUNT as u8;
        let blob = encode_table(&[level]).unwrap();
        let table = LevelTable::new(&blob);
        assert_eq!(
            table.locate(0),
            Err(LevelError::UnknownTheme {
                index: 0,
                theme: THEME_COUNT as u8
            })
        );
    }

    #[test]
    fn test_truncated_stream() {
        let blob = encode_table(&[sample_level()]).unwrap();
        let short = &blob[..blob.len() - 1];
        let table = LevelTable::new(short);
        // The header is intact, the coordinate stream is not
        assert!(table.locate(0).is_ok());
        assert!(matches!(table.load(0), Err(LevelError::Truncated { .. })));
    }

    #[test]
    fn test_empty_and_garbage_tables() {
        assert_eq!(LevelTable::new(&[]).count(), 0);
        assert!(LevelTable::new(&[]).load(0).is_err());
        // Claims two levels but has no offsets
        assert_eq!(LevelTable::new(&[2]).locate(0), Err(LevelError::BadTable));
    }

    #[test]
    fn test_second_level_offset() {
        let a = sample_level();
        let mut b = Level::blank(1);
        b.time_bonus = 9;
        let blob = encode_table(&[a, b]).unwrap();
        let table = LevelTable::new(&blob);
        let first = table.locate(0).unwrap();
        let second = table.locate(1).unwrap();
        assert!(second.offset > first.offset);
        assert_eq!(second.theme, 1);
        assert_eq!(table.load(1).unwrap().time_bonus, 9);
    }
}
