// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Length-prefixed framing for the Rithmic wire protocol.
//!
//! ```text
//! ┌──────────────────────┬───────────────────┐
//! │ Length               │ Payload           │
//! │ 4 bytes, int32 BE    │ Length bytes      │
//! └──────────────────────┴───────────────────┘
//! ```
//!
//! On receive the WebSocket message boundary decides where a unit ends, so the
//! declared length is reported but never used for buffering.

use prost::Message;

use super::error::{RithmicWsError, RithmicWsResult};

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// One decoded wire unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Length taken from the prefix.
    pub declared_length: i32,
    /// Bytes following the prefix, as delimited by the transport.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Returns `true` when the declared length matches the received payload.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        usize::try_from(self.declared_length).is_ok_and(|len| len == self.payload.len())
    }
}

/// Prepends the big-endian signed length of `payload`.
#[must_use]
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    debug_assert!(payload.len() <= i32::MAX as usize);
    let length = payload.len() as i32;

    let mut buf = Vec::with_capacity(LENGTH_PREFIX_LEN + payload.len());
    buf.extend_from_slice(&length.to_be_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Serializes a protobuf message and frames it.
#[must_use]
pub fn encode_message<M: Message>(message: &M) -> Vec<u8> {
    encode_frame(&message.encode_to_vec())
}

/// Splits a wire unit into its declared length and payload.
///
/// # Errors
///
/// Returns [`RithmicWsError::MalformedFrame`] if fewer than 4 bytes are supplied.
pub fn decode_frame(wire: &[u8]) -> RithmicWsResult<Frame> {
    if wire.len() < LENGTH_PREFIX_LEN {
        return Err(RithmicWsError::MalformedFrame { len: wire.len() });
    }

    let (prefix, payload) = wire.split_at(LENGTH_PREFIX_LEN);
    let declared_length = i32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);

    Ok(Frame {
        declared_length,
        payload: payload.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(vec![])]
    #[case(vec![0x01])]
    #[case(vec![0xB8, 0xC3, 0x49, 0x0A, 0xFF, 0x00])]
    fn test_roundtrip(#[case] payload: Vec<u8>) {
        let frame = decode_frame(&encode_frame(&payload)).unwrap();

        assert_eq!(frame.declared_length as usize, payload.len());
        assert_eq!(frame.payload, payload);
        assert!(frame.is_well_formed());
    }

    #[rstest]
    fn test_encode_prefix_is_big_endian() {
        let payload = vec![0u8; 258];
        let wire = encode_frame(&payload);

        assert_eq!(&wire[..4], &[0x00, 0x00, 0x01, 0x02]);
        assert_eq!(wire.len(), 262);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[0x00])]
    #[case(&[0x00, 0x00, 0x00])]
    fn test_decode_short_input_is_malformed(#[case] wire: &[u8]) {
        let err = decode_frame(wire).unwrap_err();
        assert!(matches!(err, RithmicWsError::MalformedFrame { len } if len == wire.len()));
    }

    #[rstest]
    fn test_decode_tolerates_length_mismatch() {
        let wire = [0x00, 0x00, 0x00, 0x09, 0xAA, 0xBB];
        let frame = decode_frame(&wire).unwrap();

        assert_eq!(frame.declared_length, 9);
        assert_eq!(frame.payload, vec![0xAA, 0xBB]);
        assert!(!frame.is_well_formed());
    }

    #[rstest]
    fn test_decode_negative_length_is_not_well_formed() {
        let wire = [0xFF, 0xFF, 0xFF, 0xFF];
        let frame = decode_frame(&wire).unwrap();

        assert_eq!(frame.declared_length, -1);
        assert!(frame.payload.is_empty());
        assert!(!frame.is_well_formed());
    }
}
