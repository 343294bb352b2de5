//! Frame codec
//!
//! A frame is `STX + ASCII-hex payload + ETX`. `encode_frame`/`decode_frame`
//! handle single frames; the `Decoder`/`Encoder` impls split a byte stream into
//! frames for the device simulator.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use super::constants::{ETX, MAX_FRAME_LEN, MIN_FRAME_LEN, STX};

/// Codec for the STX/ASCII-hex/ETX wire frame
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameCodec;

impl FrameCodec {
    /// Wrap an ASCII-hex payload in start/end markers
    pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
        let mut frame = Vec::with_capacity(payload.len() + 2);
        frame.push(STX);
        frame.extend_from_slice(payload);
        frame.push(ETX);
        frame
    }

    /// Unwrap a frame and hex-decode its payload
    ///
    /// Returns `None` if the frame is shorter than 3 bytes, lacks either
    /// marker, or the payload is not valid ASCII hex.
    pub fn decode_frame(frame: &[u8]) -> Option<Vec<u8>> {
        if frame.len() < MIN_FRAME_LEN {
            return None;
        }
        if frame[0] != STX || frame[frame.len() - 1] != ETX {
            return None;
        }

        common::hex::decode(&frame[1..frame.len() - 1])
    }
}

impl Decoder for FrameCodec {
    /// One raw frame, markers included
    type Item = BytesMut;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Drop anything before the next start marker
        match src.iter().position(|&b| b == STX) {
            Some(0) => {},
            Some(start) => {
                trace!("Discarding {} bytes before STX", start);
                src.advance(start);
            },
            None => {
                src.clear();
                return Ok(None);
            },
        }

        match src.iter().position(|&b| b == ETX) {
            Some(end) => Ok(Some(src.split_to(end + 1))),
            None if src.len() > MAX_FRAME_LEN => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("frame exceeds {} bytes without ETX", MAX_FRAME_LEN),
            )),
            None => Ok(None),
        }
    }
}

impl Encoder<&[u8]> for FrameCodec {
    type Error = std::io::Error;

    fn encode(&mut self, payload: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(payload.len() + 2);
        dst.put_u8(STX);
        dst.extend_from_slice(payload);
        dst.put_u8(ETX);
        Ok(())
    }
}
