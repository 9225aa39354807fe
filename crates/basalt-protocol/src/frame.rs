use std::io::{Read, Write};

use basalt_common::constants::MAX_FRAME_LENGTH;
use basalt_common::{BasaltError, PacketBuffer, Result};
use bytes::{BufMut, BytesMut};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tokio_util::codec::{Decoder, Encoder};

use crate::cipher::CipherPair;
use crate::packet::RawPacket;

/// Upper bound for a decompressed packet body.
pub const MAX_DECOMPRESSED_LENGTH: usize = 8 * 1024 * 1024;

/// Frames packets on a connection, with optional zlib compression and
/// AES-128-CFB8 encryption. Both layers can be enabled once and never turned
/// off again.
#[derive(Debug, Default)]
pub struct FrameCodec {
    compression_threshold: Option<usize>,
    cipher: Option<CipherPair>,
    inbound: PacketBuffer,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compression_threshold(&self) -> Option<usize> {
        self.compression_threshold
    }

    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_some()
    }

    pub fn enable_compression(&mut self, threshold: usize) -> Result<()> {
        if self.compression_threshold.is_some() {
            return Err(BasaltError::Protocol(
                "compression is already enabled".to_owned(),
            ));
        }
        self.compression_threshold = Some(threshold);
        Ok(())
    }

    /// Encrypts everything written and decrypts everything fed from now on.
    /// Bytes already buffered were sent in the clear and stay as they are.
    pub fn enable_encryption(&mut self, shared_secret: &[u8]) -> Result<()> {
        if self.cipher.is_some() {
            return Err(BasaltError::Protocol(
                "encryption is already enabled".to_owned(),
            ));
        }
        self.cipher = Some(CipherPair::new(shared_secret)?);
        Ok(())
    }

    /// Builds the wire bytes of one frame.
    pub fn encode_frame(&mut self, id: i32, payload: &[u8]) -> Result<Vec<u8>> {
        let mut body = PacketBuffer::with_capacity(payload.len() + 5);
        body.write_varint(id);
        body.write_bytes(payload);

        let body = match self.compression_threshold {
            None => body.into_inner(),
            Some(threshold) => {
                let mut compressed = PacketBuffer::new();
                if body.write_offset() < threshold {
                    compressed.write_varint(0);
                    compressed.write_bytes(body.as_slice());
                } else {
                    compressed.write_varint(body.write_offset() as i32);
                    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                    encoder.write_all(body.as_slice())?;
                    compressed.write_bytes(&encoder.finish()?);
                }
                compressed.into_inner()
            }
        };

        if body.len() > MAX_FRAME_LENGTH {
            return Err(BasaltError::FrameTooLarge(body.len()));
        }

        let mut frame = PacketBuffer::with_capacity(body.len() + 3);
        frame.write_varint(body.len() as i32);
        frame.write_bytes(&body);
        let mut frame = frame.into_inner();
        if let Some(cipher) = self.cipher.as_mut() {
            cipher.encrypt(&mut frame);
        }
        Ok(frame)
    }

    /// Appends bytes read from the socket to the reassembly buffer.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.inbound.compact();
        match self.cipher.as_mut() {
            None => self.inbound.write_bytes(bytes),
            Some(cipher) => {
                let mut plain = bytes.to_vec();
                cipher.decrypt(&mut plain);
                self.inbound.write_bytes(&plain);
            }
        }
    }

    /// Bytes fed but not yet consumed by a complete frame.
    pub fn buffered(&self) -> usize {
        self.inbound.remaining()
    }

    /// Takes the next complete frame. `Ok(None)` means more bytes are needed;
    /// nothing is consumed in that case.
    pub fn next_frame(&mut self) -> Result<Option<RawPacket>> {
        let start = self.inbound.read_offset();
        let length = match self.inbound.read_varint() {
            Ok(length) => length,
            Err(e) if e.is_recoverable() => return Ok(None),
            Err(e) => return Err(e),
        };
        if length < 0 {
            return Err(BasaltError::Protocol(format!(
                "negative frame length {}",
                length
            )));
        }
        let length = length as usize;
        if length > MAX_FRAME_LENGTH {
            return Err(BasaltError::FrameTooLarge(length));
        }
        if self.inbound.remaining() < length {
            self.inbound.set_read_offset(start);
            return Ok(None);
        }
        let body = self.inbound.read_bytes(length)?;
        self.decode_body(body).map(Some)
    }

    fn decode_body(&self, body: Vec<u8>) -> Result<RawPacket> {
        let mut body = PacketBuffer::from_bytes(body);
        let mut body = match self.compression_threshold {
            None => body,
            Some(_) => {
                let data_length = body.read_varint()?;
                if data_length < 0 {
                    return Err(BasaltError::Protocol(format!(
                        "negative data length {}",
                        data_length
                    )));
                }
                if data_length == 0 {
                    PacketBuffer::from_bytes(body.read_remaining())
                } else {
                    let expected = data_length as usize;
                    if expected > MAX_DECOMPRESSED_LENGTH {
                        return Err(BasaltError::FrameTooLarge(expected));
                    }
                    let compressed = body.read_remaining();
                    let mut inflated = Vec::with_capacity(expected);
                    ZlibDecoder::new(compressed.as_slice())
                        .take(MAX_DECOMPRESSED_LENGTH as u64 + 1)
                        .read_to_end(&mut inflated)?;
                    if inflated.len() != expected {
                        return Err(BasaltError::DecompressedLengthMismatch {
                            expected,
                            actual: inflated.len(),
                        });
                    }
                    PacketBuffer::from_bytes(inflated)
                }
            }
        };
        let id = body.read_varint().map_err(|e| match e {
            BasaltError::OutOfBounds { .. } => BasaltError::Protocol("empty frame".to_owned()),
            other => other,
        })?;
        Ok(RawPacket::new(id, body.read_remaining()))
    }
}

impl Decoder for FrameCodec {
    type Item = RawPacket;
    type Error = BasaltError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<RawPacket>> {
        if !src.is_empty() {
            let bytes = src.split();
            self.feed(&bytes);
        }
        self.next_frame()
    }
}

impl Encoder<RawPacket> for FrameCodec {
    type Error = BasaltError;

    fn encode(&mut self, packet: RawPacket, dst: &mut BytesMut) -> Result<()> {
        let frame = self.encode_frame(packet.id, &packet.payload)?;
        dst.put_slice(&frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::Rng;

    const SECRET: [u8; 16] = [0x42; 16];

    fn random_payload(length: usize) -> Vec<u8> {
        let mut rng = rand::thread_rng();
        (0..length).map(|_| rng.gen()).collect()
    }

    fn pair(compression: Option<usize>, encrypted: bool) -> (FrameCodec, FrameCodec) {
        let mut sender = FrameCodec::new();
        let mut receiver = FrameCodec::new();
        for codec in [&mut sender, &mut receiver] {
            if let Some(threshold) = compression {
                codec.enable_compression(threshold).unwrap();
            }
            if encrypted {
                codec.enable_encryption(&SECRET).unwrap();
            }
        }
        (sender, receiver)
    }

    #[test]
    fn test_uncompressed_layout() {
        let mut codec = FrameCodec::new();
        let frame = codec.encode_frame(0x01, &[0xAA, 0xBB]).unwrap();
        assert_eq!(frame, vec![0x03, 0x01, 0xAA, 0xBB]);
    }

    #[test]
    fn test_below_threshold_layout() {
        let mut codec = FrameCodec::new();
        codec.enable_compression(256).unwrap();
        let frame = codec.encode_frame(0x01, &[0xAA]).unwrap();
        assert_eq!(frame, vec![0x03, 0x00, 0x01, 0xAA]);
    }

    #[test]
    fn test_round_trip_all_modes() {
        for compression in [None, Some(0), Some(64), Some(100_000)] {
            for encrypted in [false, true] {
                let (mut sender, mut receiver) = pair(compression, encrypted);
                for length in [0, 1, 63, 64, 1000, 70_000] {
                    let payload = random_payload(length);
                    let frame = sender.encode_frame(0x22, &payload).unwrap();
                    receiver.feed(&frame);
                    let packet = receiver.next_frame().unwrap().unwrap();
                    assert_eq!(packet, RawPacket::new(0x22, payload));
                    assert_eq!(receiver.buffered(), 0);
                }
            }
        }
    }

    #[test]
    fn test_partial_frame_resumption() {
        for encrypted in [false, true] {
            let (mut sender, _) = pair(Some(16), encrypted);
            let payload = random_payload(300);
            let frame = sender.encode_frame(0x10, &payload).unwrap();

            for split in [0, 1, 2, 3, 150, frame.len() - 1, frame.len()] {
                let (_, mut receiver) = pair(Some(16), encrypted);
                receiver.feed(&frame[..split]);
                if split < frame.len() {
                    assert_eq!(receiver.next_frame().unwrap(), None);
                    assert_eq!(receiver.buffered(), split);
                }
                receiver.feed(&frame[split..]);
                let packet = receiver.next_frame().unwrap().unwrap();
                assert_eq!(packet, RawPacket::new(0x10, payload.clone()));
                assert_eq!(receiver.next_frame().unwrap(), None);
            }
        }
    }

    #[test]
    fn test_multiple_frames_in_one_feed() {
        let (mut sender, mut receiver) = pair(None, false);
        let mut bytes = sender.encode_frame(0x00, &[1]).unwrap();
        bytes.extend(sender.encode_frame(0x01, &[2, 3]).unwrap());
        bytes.extend(sender.encode_frame(0x02, &[]).unwrap());
        receiver.feed(&bytes);

        let ids: Vec<i32> = std::iter::from_fn(|| receiver.next_frame().unwrap())
            .map(|packet| packet.id)
            .collect();
        assert_eq!(ids, vec![0x00, 0x01, 0x02]);
    }

    #[test]
    fn test_frame_too_large() {
        let mut receiver = FrameCodec::new();
        let mut length = PacketBuffer::new();
        length.write_varint(MAX_FRAME_LENGTH as i32 + 1);
        receiver.feed(length.as_slice());
        assert_matches!(receiver.next_frame(), Err(BasaltError::FrameTooLarge(_)));

        let mut sender = FrameCodec::new();
        assert_matches!(
            sender.encode_frame(0x22, &vec![0; MAX_FRAME_LENGTH]),
            Err(BasaltError::FrameTooLarge(_))
        );
    }

    #[test]
    fn test_negative_length_is_fatal() {
        let mut receiver = FrameCodec::new();
        receiver.feed(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
        assert_matches!(receiver.next_frame(), Err(BasaltError::Protocol(_)));
    }

    #[test]
    fn test_decompressed_length_mismatch() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[0x05, 1, 2, 3]).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut body = PacketBuffer::new();
        body.write_varint(10);
        body.write_bytes(&compressed);
        let mut frame = PacketBuffer::new();
        frame.write_byte_array(body.as_slice());

        let mut receiver = FrameCodec::new();
        receiver.enable_compression(0).unwrap();
        receiver.feed(frame.as_slice());
        assert_matches!(
            receiver.next_frame(),
            Err(BasaltError::DecompressedLengthMismatch {
                expected: 10,
                actual: 4
            })
        );
    }

    #[test]
    fn test_layers_enable_once() {
        let mut codec = FrameCodec::new();
        codec.enable_compression(256).unwrap();
        assert!(codec.enable_compression(64).is_err());
        assert_eq!(codec.compression_threshold(), Some(256));

        codec.enable_encryption(&SECRET).unwrap();
        assert!(codec.enable_encryption(&SECRET).is_err());
        assert!(codec.is_encrypted());
    }

    #[test]
    fn test_tokio_codec() {
        let (mut sender, mut receiver) = pair(Some(8), true);
        let mut wire = BytesMut::new();
        sender
            .encode(RawPacket::new(0x03, b"hello there".to_vec()), &mut wire)
            .unwrap();

        let mut first = wire.split_to(4);
        assert_eq!(receiver.decode(&mut first).unwrap(), None);
        assert!(first.is_empty());
        let packet = receiver.decode(&mut wire).unwrap().unwrap();
        assert_eq!(packet.payload, b"hello there");
    }

    #[tokio::test]
    async fn test_framed_over_socket() {
        use futures::{SinkExt, StreamExt};
        use tokio_util::codec::Framed;

        let mut client = FrameCodec::new();
        let request = client.encode_frame(0x00, &[]).unwrap();
        let response = client.encode_frame(0x01, &[0, 0, 0, 0, 0, 0, 0, 42]).unwrap();
        let socket = tokio_test::io::Builder::new()
            .read(&request)
            .write(&response)
            .build();

        let mut framed = Framed::new(socket, FrameCodec::new());
        let packet = framed.next().await.unwrap().unwrap();
        assert_eq!(packet, RawPacket::new(0x00, Vec::new()));
        framed
            .send(RawPacket::new(0x01, vec![0, 0, 0, 0, 0, 0, 0, 42]))
            .await
            .unwrap();
    }
}
