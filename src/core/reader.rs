//! Sentence framing for the GPS byte stream
//!
//! Accumulates incoming bytes into discrete newline-terminated lines. The
//! receiver side of a serial link delivers bytes in arbitrary chunks, so a
//! partial line at the end of a read is retained and completed by a later
//! read. Line growth is bounded: past [`MAX_SENTENCE_LEN`] the codec drops
//! the line and resynchronizes at the next newline.

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

/// Maximum accepted sentence length in bytes.
///
/// NMEA 0183 caps sentences at 82 characters; the slack covers proprietary
/// talkers. Anything longer is treated as corruption on the wire.
pub const MAX_SENTENCE_LEN: usize = 128;

/// Line codec with drop-and-resync overflow handling
#[derive(Debug)]
pub struct SentenceCodec {
    max_len: usize,
    /// Set after an overlong line; bytes are discarded until the next
    /// newline restores sentence alignment.
    discarding: bool,
}

impl SentenceCodec {
    /// Create a codec with the default length bound
    pub fn new() -> Self {
        Self {
            max_len: MAX_SENTENCE_LEN,
            discarding: false,
        }
    }

    /// Create a codec with an explicit length bound
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len,
            discarding: false,
        }
    }
}

impl Default for SentenceCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for SentenceCodec {
    type Item = String;
    type Error = std::io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, Self::Error> {
        loop {
            if self.discarding {
                match buf.iter().position(|&b| b == b'\n') {
                    Some(offset) => {
                        buf.advance(offset + 1);
                        self.discarding = false;
                    }
                    None => {
                        buf.clear();
                        return Ok(None);
                    }
                }
            }

            match buf.iter().position(|&b| b == b'\n') {
                Some(offset) if offset <= self.max_len => {
                    let line = buf.split_to(offset + 1);
                    let line = &line[..offset];
                    let line = line.strip_suffix(b"\r").unwrap_or(line);
                    return Ok(Some(String::from_utf8_lossy(line).into_owned()));
                }
                Some(offset) => {
                    // Overlong line: drop it whole and realign.
                    buf.advance(offset + 1);
                }
                None if buf.len() > self.max_len => {
                    self.discarding = true;
                }
                None => return Ok(None),
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, Self::Error> {
        match self.decode(buf)? {
            Some(line) => Ok(Some(line)),
            None => {
                // A partial sentence at end of stream carries no value.
                buf.clear();
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(codec: &mut SentenceCodec, buf: &mut BytesMut) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(Some(line)) = codec.decode(buf) {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn splits_complete_lines() {
        let mut codec = SentenceCodec::new();
        let mut buf = BytesMut::from(&b"$GPGGA,1\r\n$GPRMC,2\n"[..]);
        assert_eq!(drain(&mut codec, &mut buf), vec!["$GPGGA,1", "$GPRMC,2"]);
    }

    #[test]
    fn retains_partial_line_across_reads() {
        let mut codec = SentenceCodec::new();
        let mut buf = BytesMut::from(&b"$GPRMC,123"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"519,A\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "$GPRMC,123519,A");
    }

    #[test]
    fn overlong_line_is_dropped_and_stream_resyncs() {
        let mut codec = SentenceCodec::with_max_len(16);
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&[b'X'; 40]);
        buf.extend_from_slice(b"\n$GPGGA,ok\n");

        assert_eq!(drain(&mut codec, &mut buf), vec!["$GPGGA,ok"]);
    }

    #[test]
    fn resync_spans_chunk_boundaries() {
        let mut codec = SentenceCodec::with_max_len(8);
        let mut buf = BytesMut::new();

        buf.extend_from_slice(&[b'X'; 20]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(&[b'X'; 20]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"\nshort\n");
        assert_eq!(drain(&mut codec, &mut buf), vec!["short"]);
    }

    #[test]
    fn binary_garbage_never_panics() {
        let mut codec = SentenceCodec::new();
        let mut buf = BytesMut::from(&[0xff, 0xfe, 0x00, b'\n', b'o', b'k', b'\n'][..]);
        let lines = drain(&mut codec, &mut buf);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "ok");
    }
}
