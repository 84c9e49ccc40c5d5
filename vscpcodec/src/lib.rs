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

//! # VSCP Event Codec
//!
//! Conversions between the three forms a VSCP event takes inside the gateway:
//!
//! - [`VscpMessage`], the structured event
//! - [`CanFrame`], the extended identifier bus frame ([`encode_frame`] /
//!   [`decode_frame`])
//! - the comma separated text line of the client protocol
//!   ([`parse_message`] / [`format_line`])
//!
//! [`ResponseCodec`] implements [`tokio_util::codec::Encoder`] for the lines
//! the gateway writes back to its clients.
//!
//! ## Example
//!
//! ```
//! use uvscp_vscpcodec::{Guid, decode_frame, encode_frame, parse_message};
//!
//! let node: Guid = "FF:FF:FF:FF:FF:FF:FF:FE:00:00:00:00:00:00:00:01".parse().unwrap();
//! let msg = parse_message("0x60,20,3,,,,-,1,2", &node).unwrap();
//! let frame = encode_frame(&msg);
//! let echoed = decode_frame(&frame, 0, &node).unwrap();
//! assert_eq!(echoed.class, 20);
//! assert_eq!(echoed.data(), &[1, 2]);
//! ```

pub mod consts;
mod frame;
mod guid;
mod message;
mod response;
mod result;
mod text;

pub use self::frame::{CanFrame, decode_frame, encode_frame, pack_id, unpack_id};
pub use self::guid::Guid;
pub use self::message::VscpMessage;
pub use self::response::{Response, ResponseCodec};
pub use self::result::{VscpError, VscpResult};
pub use self::text::{format_line, parse_message, parse_number};
