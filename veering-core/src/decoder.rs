//! Reader frame decoding
//!
//! The reader answers an inventory command with a run of fixed-length frames, one per tag in
//! range. This module turns such a buffer into [`TagReading`]s. Decoding is pure: it never
//! fails, and trailing bytes that do not fill a whole frame are dropped.

use crate::types::TagReading;
use std::slice::ChunksExact;

/// Length of one tag frame in bytes
pub const FRAME_LEN: usize = 22;

/// Offset of the packed signal-quality byte
pub const SIGNAL_BYTE_OFFSET: usize = 3;

/// Identifier bytes span this range of the frame
pub const ID_RANGE: std::ops::Range<usize> = 10..FRAME_LEN;

/// Stateless frame decoder
pub struct FrameDecoder;

impl FrameDecoder {
    /// Decode a buffer into a lazy sequence of readings
    ///
    /// # Arguments
    /// * `buffer` - Raw bytes as read from the reader
    ///
    /// # Returns
    /// * Iterator over one reading per complete frame, in input order
    ///
    /// # Example
    /// ```
    /// use veering_core::FrameDecoder;
    ///
    /// let buffer = [0u8; 44];
    /// assert_eq!(FrameDecoder::decode(&buffer).count(), 2);
    /// ```
    pub fn decode(buffer: &[u8]) -> FrameIterator<'_> {
        let trailing = Self::trailing_bytes(buffer);
        if trailing != 0 {
            log::debug!(
                "Dropping {} trailing byte(s) from {}-byte buffer (incomplete frame)",
                trailing,
                buffer.len()
            );
        }

        FrameIterator {
            frames: buffer.chunks_exact(FRAME_LEN),
        }
    }

    /// Number of bytes at the end of `buffer` that do not form a complete frame
    pub fn trailing_bytes(buffer: &[u8]) -> usize {
        buffer.len() % FRAME_LEN
    }

    /// Decode exactly one frame
    pub fn decode_frame(frame: &[u8; FRAME_LEN]) -> TagReading {
        TagReading {
            id: format_tag_id(&frame[ID_RANGE]),
            signal_score: signal_score(frame[SIGNAL_BYTE_OFFSET]),
        }
    }
}

/// Iterator over the readings of a single buffer
pub struct FrameIterator<'a> {
    frames: ChunksExact<'a, u8>,
}

impl<'a> Iterator for FrameIterator<'a> {
    type Item = TagReading;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = self.frames.next()?;
        // chunks_exact only yields FRAME_LEN slices
        let frame: &[u8; FRAME_LEN] = chunk.try_into().ok()?;
        let reading = FrameDecoder::decode_frame(frame);
        log::trace!("{}", reading);
        Some(reading)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.frames.size_hint()
    }
}

impl<'a> ExactSizeIterator for FrameIterator<'a> {}

/// Render identifier bytes in the canonical `-xx-xx-...` form
///
/// Every byte becomes two lowercase hex digits preceded by `-`. Tag configuration files
/// must use the same form since ids are compared as strings.
pub fn format_tag_id(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("-{:02x}", byte)).collect()
}

/// Raw signal strength for a packed quality byte
///
/// The high nibble and low nibble are the Q and I channel strengths. The stronger channel
/// dominates and an imbalance between the two is penalized:
///
/// `raw = 2*high + 10*log10(1 + 10^(-delta/10))`
pub fn raw_signal_strength(packed: u8) -> f64 {
    let q = (packed >> 4) & 0x0F;
    let i = packed & 0x0F;
    let high = q.max(i);
    let low = q.min(i);
    let delta = f64::from(high - low);

    2.0 * f64::from(high) + 10.0 * (1.0 + 10f64.powf(-delta / 10.0)).log10()
}

/// Normalized signal score in `[0, 100]`
///
/// Scales [`raw_signal_strength`] by `100/15`. Strong readings (roughly a high nibble above 6)
/// exceed the scale and saturate at 100.
pub fn signal_score(packed: u8) -> f64 {
    (raw_signal_strength(packed) / 15.0 * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(quality: u8, id: [u8; 12]) -> [u8; FRAME_LEN] {
        let mut f = [0u8; FRAME_LEN];
        f[SIGNAL_BYTE_OFFSET] = quality;
        f[ID_RANGE].copy_from_slice(&id);
        f
    }

    #[test]
    fn test_format_tag_id_pads_each_byte() {
        assert_eq!(format_tag_id(&[0x4c, 0x65, 0x05, 0x00]), "-4c-65-05-00");
        assert_eq!(format_tag_id(&[]), "");
    }

    #[test]
    fn test_decode_frame_fields() {
        let id = [0xe2, 0x00, 0x10, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0xff];
        let reading = FrameDecoder::decode_frame(&frame(0x22, id));
        assert_eq!(reading.id, "-e2-00-10-01-02-03-04-05-06-07-08-ff");
        // Balanced nibbles: 2*2 + 10*log10(2)
        let expected = (4.0 + 10.0 * 2f64.log10()) / 15.0 * 100.0;
        assert_eq!(reading.signal_score, expected);
    }

    #[test]
    fn test_signal_score_is_symmetric_in_nibbles() {
        assert_eq!(signal_score(0x3a), signal_score(0xa3));
        assert_eq!(raw_signal_strength(0x3a), raw_signal_strength(0xa3));
    }

    #[test]
    fn test_imbalance_is_penalized() {
        assert!(raw_signal_strength(0xf0) < raw_signal_strength(0xff));
        assert!(signal_score(0x10) < signal_score(0x11));
    }

    #[test]
    fn test_signal_score_extremes() {
        assert_eq!(signal_score(0x00), 10.0 * 2f64.log10() / 15.0 * 100.0);
        assert_eq!(signal_score(0xff), 100.0);
        assert_eq!(raw_signal_strength(0xff), 30.0 + 10.0 * 2f64.log10());
    }

    #[test]
    fn test_decode_drops_trailing_bytes() {
        let mut buffer = frame(0x11, [1; 12]).to_vec();
        buffer.extend_from_slice(&[0xAA; 5]);
        assert_eq!(FrameDecoder::trailing_bytes(&buffer), 5);

        let readings: Vec<_> = FrameDecoder::decode(&buffer).collect();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].id, format_tag_id(&[1; 12]));
    }

    #[test]
    fn test_decode_short_or_empty_buffer() {
        assert_eq!(FrameDecoder::decode(&[]).count(), 0);
        assert_eq!(FrameDecoder::decode(&[0u8; FRAME_LEN - 1]).count(), 0);
    }

    #[test]
    fn test_decode_preserves_order() {
        let mut buffer = Vec::new();
        for n in 0..3u8 {
            buffer.extend_from_slice(&frame(0x10 * n, [n; 12]));
        }
        let ids: Vec<_> = FrameDecoder::decode(&buffer).map(|r| r.id).collect();
        assert_eq!(
            ids,
            vec![format_tag_id(&[0; 12]), format_tag_id(&[1; 12]), format_tag_id(&[2; 12])]
        );
    }
}
