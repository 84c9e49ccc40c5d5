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

//! Lines written from the gateway to a client

use crate::VscpMessage;
use crate::consts::LINE_TERMINATOR;
use bytes::BytesMut;
use std::fmt::{self, Write};
use tokio_util::codec::Encoder;

/// One line of server output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Positive status line, `+OK` or `+OK - <message>`
    Success(Option<String>),
    /// Negative status line, `-OK - <message>`
    Failure(String),
    /// Informational line preceding a status line
    Text(String),
    /// An event in text form
    Event(VscpMessage),
}

impl Response {
    /// Bare `+OK`, used as keepalive in receive loop mode
    pub fn ok() -> Self {
        Response::Success(None)
    }

    /// `+OK - <message>`
    pub fn success(message: impl Into<String>) -> Self {
        Response::Success(Some(message.into()))
    }

    /// `-OK - <message>`
    pub fn failure(message: impl fmt::Display) -> Self {
        Response::Failure(message.to_string())
    }

    /// A plain informational line
    pub fn text(line: impl Into<String>) -> Self {
        Response::Text(line.into())
    }

    /// Check if this line terminates a command reply
    pub fn is_status(&self) -> bool {
        matches!(self, Response::Success(_) | Response::Failure(_))
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Success(None) => f.write_str("+OK"),
            Response::Success(Some(message)) => write!(f, "+OK - {}", message),
            Response::Failure(message) => write!(f, "-OK - {}", message),
            Response::Text(line) => f.write_str(line),
            Response::Event(msg) => write!(f, "{}", msg),
        }
    }
}

/// Encoder for [`Response`] lines, each terminated with CR LF
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseCodec;

impl ResponseCodec {
    /// Create a new response encoder
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<Response> for ResponseCodec {
    type Error = std::io::Error;

    fn encode(&mut self, item: Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        write!(dst, "{}{}", item, LINE_TERMINATOR).map_err(std::io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(response: Response) -> String {
        let mut buffer = BytesMut::new();
        ResponseCodec::new().encode(response, &mut buffer).unwrap();
        String::from_utf8(buffer.to_vec()).unwrap()
    }

    #[test]
    fn test_status_lines() {
        assert_eq!(encode(Response::ok()), "+OK\r\n");
        assert_eq!(encode(Response::success("Success.")), "+OK - Success.\r\n");
        assert_eq!(encode(Response::failure("Access denied")), "-OK - Access denied\r\n");
    }

    #[test]
    fn test_text_line() {
        assert_eq!(encode(Response::text("can0")), "can0\r\n");
        assert!(!Response::text("x").is_status());
        assert!(Response::ok().is_status());
    }
}
