//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! VSCP node identifiers

use crate::consts::GUID_LEN;
use crate::{VscpError, VscpResult};
use std::fmt;
use std::str::FromStr;

/// 16 byte VSCP globally unique node identifier
///
/// The textual form is 16 colon separated hexadecimal octets, e.g.
/// `FF:FF:FF:FF:FF:FF:FF:FE:00:00:00:00:00:00:00:01`. Parsing accepts one or
/// two digits per octet in either case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Guid([u8; GUID_LEN]);

impl Guid {
    /// Create a GUID from its raw bytes
    pub const fn new(bytes: [u8; GUID_LEN]) -> Self {
        Self(bytes)
    }

    /// Create a GUID from a slice, which must be exactly 16 bytes long
    pub fn from_slice(bytes: &[u8]) -> VscpResult<Self> {
        let bytes: [u8; GUID_LEN] = bytes
            .try_into()
            .map_err(|_| VscpError::InvalidGuid(format!("{} bytes", bytes.len())))?;
        Ok(Self(bytes))
    }

    /// Raw GUID bytes
    pub const fn as_bytes(&self) -> &[u8; GUID_LEN] {
        &self.0
    }

    /// The node byte (the last GUID byte, the nickname on the bus)
    pub const fn node_id(&self) -> u8 {
        self.0[GUID_LEN - 1]
    }

    /// Copy of this GUID with the node byte replaced
    pub const fn with_node_id(mut self, node_id: u8) -> Self {
        self.0[GUID_LEN - 1] = node_id;
        self
    }

    /// Check whether both GUIDs name the same interface, ignoring the node byte
    pub fn same_interface(&self, other: &Guid) -> bool {
        self.0[..GUID_LEN - 1] == other.0[..GUID_LEN - 1]
    }
}

impl From<[u8; GUID_LEN]> for Guid {
    fn from(bytes: [u8; GUID_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, byte) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for Guid {
    type Err = VscpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VscpError::InvalidGuid(s.to_string());
        let mut bytes = [0u8; GUID_LEN];
        let mut count = 0;

        for octet in s.trim().split(':') {
            if count == GUID_LEN
                || octet.is_empty()
                || octet.len() > 2
                || !octet.bytes().all(|b| b.is_ascii_hexdigit())
            {
                return Err(invalid());
            }
            bytes[count] = u8::from_str_radix(octet, 16).map_err(|_| invalid())?;
            count += 1;
        }

        if count != GUID_LEN {
            return Err(invalid());
        }
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guid_display() {
        let guid = Guid::new([
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE, 0, 0, 0, 0, 0, 0, 0x0A, 0x01,
        ]);
        assert_eq!(
            guid.to_string(),
            "FF:FF:FF:FF:FF:FF:FF:FE:00:00:00:00:00:00:0A:01"
        );
    }

    #[test]
    fn test_guid_parse_short_octets() {
        let guid: Guid = "0:1:2:3:4:5:6:7:8:9:a:b:c:d:e:F".parse().unwrap();
        assert_eq!(
            guid.as_bytes(),
            &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]
        );
    }

    #[test]
    fn test_guid_parse_rejects_malformed() {
        // 15 octets
        assert!("0:1:2:3:4:5:6:7:8:9:a:b:c:d:e".parse::<Guid>().is_err());
        // 17 octets
        assert!("0:1:2:3:4:5:6:7:8:9:a:b:c:d:e:f:0".parse::<Guid>().is_err());
        // three digit octet
        assert!("100:1:2:3:4:5:6:7:8:9:a:b:c:d:e:f".parse::<Guid>().is_err());
        // empty octet from doubled separator
        assert!("0::2:3:4:5:6:7:8:9:a:b:c:d:e:f".parse::<Guid>().is_err());
        // wrong separator
        assert!("0-1-2-3-4-5-6-7-8-9-a-b-c-d-e-f".parse::<Guid>().is_err());
        // non hex digit
        assert!("0:1:2:3:4:5:6:7:8:9:a:b:c:d:e:g".parse::<Guid>().is_err());
        assert!("".parse::<Guid>().is_err());
    }

    #[test]
    fn test_guid_text_round_trip() {
        let guid = Guid::new([0xAB; GUID_LEN]).with_node_id(0x42);
        let parsed: Guid = guid.to_string().parse().unwrap();
        assert_eq!(parsed, guid);
        assert_eq!(parsed.node_id(), 0x42);
    }

    #[test]
    fn test_guid_same_interface() {
        let a = Guid::new([1; GUID_LEN]);
        let b = a.with_node_id(99);
        assert!(a.same_interface(&b));
        assert!(!a.same_interface(&Guid::default()));
    }

    #[test]
    fn test_guid_from_slice() {
        assert!(Guid::from_slice(&[0u8; 16]).is_ok());
        assert!(Guid::from_slice(&[0u8; 15]).is_err());
    }
}
