//! GPS coordinate extraction from JPEG/EXIF payloads.
//!
//! Walks the JPEG segment list to the `Exif` APP1 block, reads the TIFF
//! header, follows IFD0's GPS pointer and decodes the latitude/longitude
//! rational triples. No image library involved: the input is an untrusted
//! byte buffer and every malformed shape resolves to `None`.

use serde::Serialize;

const MARKER_PREFIX: u8 = 0xFF;
const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const APP1: u8 = 0xE1;
const EXIF_SIGNATURE: &[u8; 6] = b"Exif\0\0";

const TAG_GPS_IFD: u16 = 0x8825;
const TAG_GPS_LAT_REF: u16 = 0x0001;
const TAG_GPS_LAT: u16 = 0x0002;
const TAG_GPS_LON_REF: u16 = 0x0003;
const TAG_GPS_LON: u16 = 0x0004;

const IFD_ENTRY_SIZE: usize = 12;

/// Decimal-degree coordinates recovered from image metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Extract GPS coordinates from a JPEG buffer.
///
/// Returns `None` when the buffer is not a JPEG, carries no EXIF block,
/// has no GPS directory, or any field is truncated or degenerate.
pub fn extract_gps(bytes: &[u8]) -> Option<GpsCoordinates> {
    let tiff = find_exif_tiff(bytes)?;
    let reader = TiffReader::new(tiff)?;

    let ifd0 = reader.u32_at(4)? as usize;
    let gps_pointer = reader.find_entry(ifd0, TAG_GPS_IFD)?;
    let gps_ifd = reader.u32_at(gps_pointer.value_offset)? as usize;

    let lat_ref = reader.find_entry(gps_ifd, TAG_GPS_LAT_REF)?;
    let lat = reader.find_entry(gps_ifd, TAG_GPS_LAT)?;
    let lon_ref = reader.find_entry(gps_ifd, TAG_GPS_LON_REF)?;
    let lon = reader.find_entry(gps_ifd, TAG_GPS_LON)?;

    let latitude = match reader.ascii_head(&lat_ref)? {
        b'N' => reader.dms_degrees(&lat)?,
        b'S' => -reader.dms_degrees(&lat)?,
        _ => return None,
    };
    let longitude = match reader.ascii_head(&lon_ref)? {
        b'E' => reader.dms_degrees(&lon)?,
        b'W' => -reader.dms_degrees(&lon)?,
        _ => return None,
    };

    if !latitude.is_finite() || !longitude.is_finite() || latitude.abs() > 90.0 || longitude.abs() > 180.0 {
        return None;
    }

    Some(GpsCoordinates { latitude, longitude })
}

// ─── JPEG segment walk ──────────────────────────────────────────

/// Locate the TIFF block inside the first `Exif` APP1 segment.
fn find_exif_tiff(bytes: &[u8]) -> Option<&[u8]> {
    if bytes.get(..2)? != [MARKER_PREFIX, SOI] {
        return None;
    }

    let mut offset = 2usize;
    loop {
        if *bytes.get(offset)? != MARKER_PREFIX {
            return None;
        }
        // Skip fill bytes between segments.
        let mut marker_at = offset + 1;
        while *bytes.get(marker_at)? == MARKER_PREFIX {
            marker_at += 1;
        }
        let marker = bytes[marker_at];
        if marker == SOS || marker == EOI {
            return None;
        }

        let len_bytes = bytes.get(marker_at + 1..marker_at + 3)?;
        let seg_len = u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize;
        if seg_len < 2 {
            return None;
        }
        let payload_start = marker_at + 3;
        let payload_end = (marker_at + 1).checked_add(seg_len)?;

        if marker == APP1 {
            if let Some(payload) = bytes.get(payload_start..payload_end.min(bytes.len())) {
                if payload.len() >= EXIF_SIGNATURE.len() && &payload[..EXIF_SIGNATURE.len()] == EXIF_SIGNATURE {
                    return Some(&payload[EXIF_SIGNATURE.len()..]);
                }
            }
        }

        offset = payload_end;
    }
}

// ─── TIFF / IFD reader ──────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct IfdEntry {
    count: u32,
    /// Offset (relative to the TIFF header) of the 4-byte value/offset field.
    value_offset: usize,
}

struct TiffReader<'a> {
    data: &'a [u8],
    little_endian: bool,
}

impl<'a> TiffReader<'a> {
    fn new(data: &'a [u8]) -> Option<Self> {
        let little_endian = match data.get(..2)? {
            b"II" => true,
            b"MM" => false,
            _ => return None,
        };
        Some(Self { data, little_endian })
    }

    fn u16_at(&self, offset: usize) -> Option<u16> {
        let b = self.data.get(offset..offset.checked_add(2)?)?;
        let raw = [b[0], b[1]];
        Some(if self.little_endian { u16::from_le_bytes(raw) } else { u16::from_be_bytes(raw) })
    }

    fn u32_at(&self, offset: usize) -> Option<u32> {
        let b = self.data.get(offset..offset.checked_add(4)?)?;
        let raw = [b[0], b[1], b[2], b[3]];
        Some(if self.little_endian { u32::from_le_bytes(raw) } else { u32::from_be_bytes(raw) })
    }

    /// Linear scan of one IFD for `tag`.
    fn find_entry(&self, ifd_offset: usize, tag: u16) -> Option<IfdEntry> {
        let count = self.u16_at(ifd_offset)? as usize;
        let first = ifd_offset.checked_add(2)?;
        for i in 0..count {
            let entry = first.checked_add(i.checked_mul(IFD_ENTRY_SIZE)?)?;
            if self.u16_at(entry)? == tag {
                return Some(IfdEntry {
                    count: self.u32_at(entry + 4)?,
                    value_offset: entry + 8,
                });
            }
        }
        None
    }

    /// First character of an ASCII entry (inline when it fits in 4 bytes).
    fn ascii_head(&self, entry: &IfdEntry) -> Option<u8> {
        if entry.count == 0 {
            return None;
        }
        let at = if entry.count <= 4 {
            entry.value_offset
        } else {
            self.u32_at(entry.value_offset)? as usize
        };
        self.data.get(at).copied()
    }

    fn rational_at(&self, offset: usize) -> Option<f64> {
        let num = self.u32_at(offset)?;
        let den = self.u32_at(offset.checked_add(4)?)?;
        if den == 0 {
            return None;
        }
        Some(num as f64 / den as f64)
    }

    /// Degrees/minutes/seconds rational triple → decimal degrees.
    fn dms_degrees(&self, entry: &IfdEntry) -> Option<f64> {
        if entry.count < 3 {
            return None;
        }
        let base = self.u32_at(entry.value_offset)? as usize;
        let deg = self.rational_at(base)?;
        let min = self.rational_at(base.checked_add(8)?)?;
        let sec = self.rational_at(base.checked_add(16)?)?;
        Some(deg + min / 60.0 + sec / 3600.0)
    }
}
