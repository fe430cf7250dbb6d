//! Minimal zip codec for `.mar` archives.
//!
//! Writing produces a deterministic archive: entries are stored
//! uncompressed with zeroed timestamps, so identical input bytes yield
//! identical archive bytes. Reading walks the central directory and accepts
//! stored and deflate entries; anything structurally broken is simply not
//! returned, leaving the caller to report whatever entry it misses.

use flate2::read::DeflateDecoder;
use flate2::Crc;
use std::io::Read;

const LOCAL_FILE_HEADER_SIG: u32 = 0x0403_4b50;
const CENTRAL_DIR_HEADER_SIG: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIR_SIG: u32 = 0x0605_4b50;

/// EOCD is 22 bytes plus a comment of at most 65535 bytes.
const EOCD_SCAN_LIMIT: usize = 22 + 65_535;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATE: u16 = 8;

pub(crate) struct ZipEntry {
    pub(crate) name: String,
    pub(crate) data: Vec<u8>,
}

/// Builds an archive holding `entries` in order. Names ending in `/` are
/// directory markers and should carry empty data.
pub(crate) fn build(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut central = Vec::new();

    for (name, data) in entries {
        let offset = out.len() as u32;
        let mut crc = Crc::new();
        crc.update(data);
        let crc = crc.sum();
        let size = data.len() as u32;
        let name_len = name.len() as u16;

        put_u32(&mut out, LOCAL_FILE_HEADER_SIG);
        put_u16(&mut out, 20); // version needed
        put_u16(&mut out, 0); // flags
        put_u16(&mut out, METHOD_STORED);
        put_u16(&mut out, 0); // mod time
        put_u16(&mut out, 0); // mod date
        put_u32(&mut out, crc);
        put_u32(&mut out, size);
        put_u32(&mut out, size);
        put_u16(&mut out, name_len);
        put_u16(&mut out, 0); // extra length
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(data);

        put_u32(&mut central, CENTRAL_DIR_HEADER_SIG);
        put_u16(&mut central, 20); // version made by
        put_u16(&mut central, 20); // version needed
        put_u16(&mut central, 0); // flags
        put_u16(&mut central, METHOD_STORED);
        put_u16(&mut central, 0); // mod time
        put_u16(&mut central, 0); // mod date
        put_u32(&mut central, crc);
        put_u32(&mut central, size);
        put_u32(&mut central, size);
        put_u16(&mut central, name_len);
        put_u16(&mut central, 0); // extra length
        put_u16(&mut central, 0); // comment length
        put_u16(&mut central, 0); // disk number start
        put_u16(&mut central, 0); // internal attributes
        put_u32(&mut central, if name.ends_with('/') { 0x10 } else { 0 });
        put_u32(&mut central, offset);
        central.extend_from_slice(name.as_bytes());
    }

    let central_offset = out.len() as u32;
    let central_size = central.len() as u32;
    let count = entries.len() as u16;
    out.extend_from_slice(&central);
    put_u32(&mut out, END_OF_CENTRAL_DIR_SIG);
    put_u16(&mut out, 0); // this disk
    put_u16(&mut out, 0); // central directory disk
    put_u16(&mut out, count);
    put_u16(&mut out, count);
    put_u32(&mut out, central_size);
    put_u32(&mut out, central_offset);
    put_u16(&mut out, 0); // comment length
    out
}

/// Extracts the file entries of `data`. Directory markers are dropped, and
/// malformed structures truncate the result rather than failing.
pub(crate) fn parse(data: &[u8]) -> Vec<ZipEntry> {
    let mut entries = Vec::new();
    let Some(eocd) = find_eocd(data) else {
        return entries;
    };
    let Some(count) = read_u16(data, eocd + 10) else {
        return entries;
    };
    let Some(central_offset) = read_u32(data, eocd + 16) else {
        return entries;
    };

    let mut pos = central_offset as usize;
    for _ in 0..count {
        let Some(entry_end) = parse_central_entry(data, pos, &mut entries) else {
            break;
        };
        pos = entry_end;
    }
    entries
}

/// Parses one central directory record at `pos`, appending the decoded
/// entry, and returns the offset of the next record.
fn parse_central_entry(data: &[u8], pos: usize, entries: &mut Vec<ZipEntry>) -> Option<usize> {
    if read_u32(data, pos)? != CENTRAL_DIR_HEADER_SIG {
        return None;
    }
    let method = read_u16(data, pos + 10)?;
    let compressed_size = read_u32(data, pos + 20)? as usize;
    let name_len = read_u16(data, pos + 28)? as usize;
    let extra_len = read_u16(data, pos + 30)? as usize;
    let comment_len = read_u16(data, pos + 32)? as usize;
    let header_offset = read_u32(data, pos + 42)? as usize;
    let name = data.get(pos + 46..pos + 46 + name_len)?;
    let next = pos + 46 + name_len + extra_len + comment_len;

    let name = std::str::from_utf8(name).ok()?.to_owned();
    if name.ends_with('/') {
        return Some(next);
    }

    // Sizes in the local header may be deferred to a data descriptor, so
    // trust the central directory and only take the lengths from the local
    // header to locate the payload.
    if read_u32(data, header_offset)? != LOCAL_FILE_HEADER_SIG {
        return None;
    }
    let local_name_len = read_u16(data, header_offset + 26)? as usize;
    let local_extra_len = read_u16(data, header_offset + 28)? as usize;
    let start = header_offset + 30 + local_name_len + local_extra_len;
    let payload = data.get(start..start + compressed_size)?;

    let data = match method {
        METHOD_STORED => payload.to_vec(),
        METHOD_DEFLATE => {
            let mut decoded = Vec::new();
            DeflateDecoder::new(payload).read_to_end(&mut decoded).ok()?;
            decoded
        }
        _ => return Some(next),
    };
    entries.push(ZipEntry { name, data });
    Some(next)
}

fn find_eocd(data: &[u8]) -> Option<usize> {
    if data.len() < 22 {
        return None;
    }
    let lowest = data.len().saturating_sub(EOCD_SCAN_LIMIT);
    (lowest..=data.len() - 22)
        .rev()
        .find(|&pos| read_u32(data, pos) == Some(END_OF_CENTRAL_DIR_SIG))
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn read_u16(data: &[u8], pos: usize) -> Option<u16> {
    let bytes = data.get(pos..pos + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32(data: &[u8], pos: usize) -> Option<u32> {
    let bytes = data.get(pos..pos + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_round_trip_in_order() {
        let archive = build(&[
            ("a.txt".to_owned(), b"alpha".to_vec()),
            ("dir/".to_owned(), Vec::new()),
            ("dir/b.bin".to_owned(), vec![0, 1, 2, 255]),
        ]);
        let entries = parse(&archive);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a.txt");
        assert_eq!(entries[0].data, b"alpha");
        assert_eq!(entries[1].name, "dir/b.bin");
        assert_eq!(entries[1].data, [0, 1, 2, 255]);
    }

    #[test]
    fn building_is_deterministic() {
        let entries = vec![("x".to_owned(), b"payload".to_vec())];
        assert_eq!(build(&entries), build(&entries));
    }

    #[test]
    fn garbage_input_yields_no_entries() {
        assert!(parse(b"").is_empty());
        assert!(parse(b"not a zip file at all").is_empty());
        assert!(parse(&[0x50, 0x4b, 0x03, 0x04, 1, 2, 3]).is_empty());
    }

    #[test]
    fn truncated_central_directory_stops_cleanly() {
        let mut archive = build(&[("a".to_owned(), b"data".to_vec())]);
        // Corrupt the central directory signature.
        let pos = archive.len() - 22 - 47;
        archive[pos] ^= 0xff;
        assert!(parse(&archive).is_empty());
    }
}
