//! Steam client messages used by the game coordinator channel.
//!
//! Field numbers follow `steammessages_clientserver.proto` and
//! `steammessages_base.proto`; only the fields this crate reads or writes are
//! declared, unknown fields are skipped on decode.

use std::fmt;

/// Steam client message identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EMsg(pub u32);

impl EMsg {
    pub const CLIENT_GAMES_PLAYED: EMsg = EMsg(742);
    pub const CLIENT_TO_GC: EMsg = EMsg(5452);
    pub const CLIENT_FROM_GC: EMsg = EMsg(5453);
}

impl fmt::Debug for EMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            EMsg::CLIENT_GAMES_PLAYED => f.write_str("EMsg::ClientGamesPlayed"),
            EMsg::CLIENT_TO_GC => f.write_str("EMsg::ClientToGC"),
            EMsg::CLIENT_FROM_GC => f.write_str("EMsg::ClientFromGC"),
            EMsg(other) => write!(f, "EMsg({other})"),
        }
    }
}

/// Envelope carrying a game coordinator message through the Steam connection.
#[derive(Clone, PartialEq, prost::Message)]
pub struct CMsgGcClient {
    #[prost(uint32, optional, tag = "1")]
    pub appid: Option<u32>,
    /// Game coordinator message type; bit 31 marks a protobuf payload.
    #[prost(uint32, optional, tag = "2")]
    pub msgtype: Option<u32>,
    #[prost(bytes = "bytes", optional, tag = "3")]
    pub payload: Option<bytes::Bytes>,
    #[prost(fixed64, optional, tag = "4")]
    pub steamid: Option<u64>,
    #[prost(string, optional, tag = "5")]
    pub gcname: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CMsgClientGamesPlayed {
    #[prost(message, repeated, tag = "1")]
    pub games_played: Vec<GamePlayed>,
    #[prost(uint32, optional, tag = "2")]
    pub client_os_type: Option<u32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GamePlayed {
    #[prost(uint64, optional, tag = "1")]
    pub steam_id_gs: Option<u64>,
    #[prost(fixed64, optional, tag = "2")]
    pub game_id: Option<u64>,
    #[prost(string, optional, tag = "6")]
    pub game_extra_info: Option<String>,
}

/// Header preceding the body of a protobuf game coordinator message.
#[derive(Clone, PartialEq, prost::Message)]
pub struct CMsgProtoBufHeader {
    #[prost(fixed64, optional, tag = "1")]
    pub steamid: Option<u64>,
    #[prost(int32, optional, tag = "2")]
    pub client_sessionid: Option<i32>,
    #[prost(fixed64, optional, tag = "10")]
    pub jobid_source: Option<u64>,
    #[prost(fixed64, optional, tag = "11")]
    pub jobid_target: Option<u64>,
    #[prost(string, optional, tag = "12")]
    pub target_job_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn emsg_debug_names_known_values() {
        assert_eq!(format!("{:?}", EMsg::CLIENT_FROM_GC), "EMsg::ClientFromGC");
        assert_eq!(format!("{:?}", EMsg(1)), "EMsg(1)");
    }

    #[test]
    fn gc_client_wire_layout() {
        let msg = CMsgGcClient {
            appid: Some(570),
            msgtype: Some(0x8000_0fa4),
            payload: Some(bytes::Bytes::from_static(b"\x01")),
            ..CMsgGcClient::default()
        };
        let encoded = msg.encode_to_vec();
        // appid (field 1, varint) comes first.
        assert_eq!(&encoded[..3], &[0x08, 0xba, 0x04]);
        assert_eq!(CMsgGcClient::decode(encoded.as_slice()).unwrap(), msg);
    }
}
