//! Game coordinator packet framing.
//!
//! A GC payload starts with one of two little-endian headers:
//!
//! - protobuf: `u32 msgtype | PROTO_MASK`, `i32 header_len`, then a
//!   `CMsgProtoBufHeader` of `header_len` bytes;
//! - plain: `u16 version`, `u64 target_job`, `u64 source_job`.
//!
//! The remaining bytes are the message body.

use crate::messages::{CMsgGcClient, CMsgProtoBufHeader};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use prost::Message;
use thiserror::Error;

/// Bit 31 of a message type marks a protobuf-encoded message.
pub const PROTO_MASK: u32 = 0x8000_0000;
/// Plain header version written by [`GcMsg`].
pub const GC_HEADER_VERSION: u16 = 1;
/// Job id meaning "no job".
pub const NO_JOB: u64 = u64::MAX;

const PLAIN_HEADER_LEN: usize = 2 + 8 + 8;

pub fn is_proto(msg_type: u32) -> bool {
    msg_type & PROTO_MASK != 0
}

#[derive(Debug, Error)]
pub enum PacketDecodeError {
    #[error("malformed GC envelope: {0}")]
    Envelope(#[source] prost::DecodeError),

    #[error("GC payload truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("negative GC proto header length {0}")]
    NegativeHeaderLength(i32),

    #[error("malformed GC proto header: {0}")]
    Header(#[source] prost::DecodeError),
}

/// Inbound game coordinator message.
#[derive(Debug, Clone, PartialEq)]
pub struct GcPacket {
    pub app_id: u32,
    /// Message type with [`PROTO_MASK`] cleared.
    pub msg_type: u32,
    pub is_proto: bool,
    pub source_job: u64,
    pub target_job: u64,
    /// Present for protobuf messages only.
    pub header: Option<CMsgProtoBufHeader>,
    pub body: Bytes,
}

impl GcPacket {
    /// Decode the payload of a `CMsgGcClient` envelope.
    pub fn from_envelope(envelope: &CMsgGcClient) -> Result<Self, PacketDecodeError> {
        let raw_type = envelope.msgtype.unwrap_or_default();
        let mut payload = envelope.payload.clone().unwrap_or_default();
        let app_id = envelope.appid.unwrap_or_default();

        if is_proto(raw_type) {
            ensure(&payload, 8)?;
            // The inner type repeats the envelope's; the envelope wins.
            let _inner_type = payload.get_u32_le();
            let header_len = payload.get_i32_le();
            let header_len = usize::try_from(header_len)
                .map_err(|_| PacketDecodeError::NegativeHeaderLength(header_len))?;
            ensure(&payload, header_len)?;
            let header = CMsgProtoBufHeader::decode(payload.split_to(header_len))
                .map_err(PacketDecodeError::Header)?;

            Ok(Self {
                app_id,
                msg_type: raw_type & !PROTO_MASK,
                is_proto: true,
                source_job: header.jobid_source.unwrap_or(NO_JOB),
                target_job: header.jobid_target.unwrap_or(NO_JOB),
                header: Some(header),
                body: payload,
            })
        } else {
            ensure(&payload, PLAIN_HEADER_LEN)?;
            let _version = payload.get_u16_le();
            let target_job = payload.get_u64_le();
            let source_job = payload.get_u64_le();

            Ok(Self {
                app_id,
                msg_type: raw_type,
                is_proto: false,
                source_job,
                target_job,
                header: None,
                body: payload,
            })
        }
    }

    /// Decode the body as a protobuf message.
    pub fn decode_body<M: Message + Default>(&self) -> Result<M, prost::DecodeError> {
        M::decode(self.body.clone())
    }
}

fn ensure(buf: &Bytes, needed: usize) -> Result<(), PacketDecodeError> {
    if buf.remaining() < needed {
        return Err(PacketDecodeError::Truncated {
            needed,
            available: buf.remaining(),
        });
    }
    Ok(())
}

/// Outbound game coordinator message.
pub trait GcMessage {
    fn app_id(&self) -> u32;
    /// Message type without [`PROTO_MASK`].
    fn msg_type(&self) -> u32;
    fn is_proto(&self) -> bool;
    /// Write header and body.
    fn serialize(&self, buf: &mut BytesMut);
}

/// Protobuf game coordinator message.
#[derive(Debug, Clone, PartialEq)]
pub struct GcProtoMsg<M: Message> {
    pub app_id: u32,
    pub msg_type: u32,
    pub header: CMsgProtoBufHeader,
    pub body: M,
}

impl<M: Message> GcProtoMsg<M> {
    pub fn new(app_id: u32, msg_type: u32, body: M) -> Self {
        Self {
            app_id,
            msg_type,
            header: CMsgProtoBufHeader::default(),
            body,
        }
    }

    /// Mark the message as a reply to `job`.
    pub fn reply_to(mut self, job: u64) -> Self {
        self.header.jobid_target = Some(job);
        self
    }
}

impl<M: Message> GcMessage for GcProtoMsg<M> {
    fn app_id(&self) -> u32 {
        self.app_id
    }

    fn msg_type(&self) -> u32 {
        self.msg_type
    }

    fn is_proto(&self) -> bool {
        true
    }

    fn serialize(&self, buf: &mut BytesMut) {
        let header_len = self.header.encoded_len();
        buf.reserve(8 + header_len + self.body.encoded_len());
        buf.put_u32_le(self.msg_type | PROTO_MASK);
        buf.put_i32_le(header_len as i32);
        // Encoding into BytesMut cannot fail after the reserve above.
        let _ = self.header.encode(buf);
        let _ = self.body.encode(buf);
    }
}

/// Plain (non-protobuf) game coordinator message with a raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcMsg {
    pub app_id: u32,
    pub msg_type: u32,
    pub target_job: u64,
    pub source_job: u64,
    pub body: Bytes,
}

impl GcMsg {
    pub fn new(app_id: u32, msg_type: u32, body: impl Into<Bytes>) -> Self {
        Self {
            app_id,
            msg_type,
            target_job: NO_JOB,
            source_job: NO_JOB,
            body: body.into(),
        }
    }
}

impl GcMessage for GcMsg {
    fn app_id(&self) -> u32 {
        self.app_id
    }

    fn msg_type(&self) -> u32 {
        self.msg_type
    }

    fn is_proto(&self) -> bool {
        false
    }

    fn serialize(&self, buf: &mut BytesMut) {
        buf.reserve(PLAIN_HEADER_LEN + self.body.len());
        buf.put_u16_le(GC_HEADER_VERSION);
        buf.put_u64_le(self.target_job);
        buf.put_u64_le(self.source_job);
        buf.put_slice(&self.body);
    }
}
