use memchr::memchr;

use crate::evidence::ByteSource;
use crate::header::BMP_MAGIC;

/// Lazy iterator over every offset where the two-byte BMP magic appears.
///
/// Offsets come out in strictly increasing order. Adjacent and overlapping
/// occurrences are all reported; a hit never suppresses a later one. The
/// final byte of the buffer is excluded from the scan because the second
/// magic byte would fall outside it.
pub struct MagicScanner<'a> {
    data: &'a [u8],
    pos: usize,
}

pub fn scan(source: &ByteSource) -> MagicScanner<'_> {
    MagicScanner {
        data: source.as_bytes(),
        pos: 0,
    }
}

impl Iterator for MagicScanner<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        while self.pos + 1 < self.data.len() {
            let idx = match memchr(BMP_MAGIC[0], &self.data[self.pos..]) {
                Some(i) => self.pos + i,
                None => return None,
            };
            if idx + 1 >= self.data.len() {
                return None;
            }
            self.pos = idx + 1;
            if self.data[idx + 1] == BMP_MAGIC[1] {
                return Some(idx as u64);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::scan;
    use crate::evidence::ByteSource;

    fn offsets(data: Vec<u8>) -> Vec<u64> {
        scan(&ByteSource::new(data)).collect()
    }

    #[test]
    fn finds_every_occurrence() {
        assert_eq!(offsets(b"BMxxBMx".to_vec()), vec![0, 4]);
        assert_eq!(offsets(b"xBMBMx".to_vec()), vec![1, 3]);
    }

    #[test]
    fn reports_adjacent_first_bytes() {
        // 0x42 0x42 0x4D: only the second pair is the magic.
        assert_eq!(offsets(vec![0x42, 0x42, 0x4D]), vec![1]);
    }

    #[test]
    fn empty_and_single_byte_buffers_scan_empty() {
        assert_eq!(offsets(Vec::new()), Vec::<u64>::new());
        assert_eq!(offsets(vec![0x42]), Vec::<u64>::new());
    }

    #[test]
    fn final_byte_has_no_lookahead() {
        // A trailing 0x42 cannot start a magic pair.
        assert_eq!(offsets(vec![0x00, 0x00, 0x42]), Vec::<u64>::new());
        // But a pair ending exactly at the last byte is in range.
        assert_eq!(offsets(vec![0x00, 0x42, 0x4D]), vec![1]);
    }

    #[test]
    fn plain_data_scans_empty() {
        assert_eq!(offsets(vec![0u8; 256]), Vec::<u64>::new());
    }
}
