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

//! Text form of a VSCP event
//!
//! ```text
//! head,class,type,obid,datetime,timestamp,guid,data0,data1,...
//! ```
//!
//! Numeric fields accept decimal or `0x` prefixed hexadecimal. `obid`,
//! `datetime` and `timestamp` may be left empty; an empty or `-` GUID selects
//! the default GUID of the interface.
//!
//! Classes 512..1024 address a single node: the first sixteen data positions
//! hold the destination GUID, whose first fifteen bytes must name this
//! interface. Such events are stored with the collapsed class `class - 512`.

use crate::consts::{
    GUID_LEN, LINE_TERMINATOR, VSCP_CLASS_LIMIT, VSCP_LEVEL2_CLASS_OFFSET, VSCP_MAX_DATA,
};
use crate::{Guid, VscpError, VscpMessage, VscpResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt;

const MIN_FIELDS: usize = 7;
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a numeric field, decimal or `0x` hexadecimal
pub fn parse_number(field: &'static str, value: &str) -> VscpResult<u64> {
    let value = value.trim();
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse::<u64>(),
    };
    parsed.map_err(|_| VscpError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn parse_bounded(field: &'static str, value: &str, max: u64) -> VscpResult<u64> {
    let number = parse_number(field, value)?;
    if number > max {
        return Err(VscpError::OutOfRange {
            field,
            value: number,
        });
    }
    Ok(number)
}

fn parse_datetime(value: &str) -> VscpResult<DateTime<Utc>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| VscpError::InvalidDateTime(value.to_string()))
}

/// Parse a text event
///
/// `default_guid` is used when the GUID field is empty and is the identity
/// Level II destinations are checked against.
pub fn parse_message(line: &str, default_guid: &Guid) -> VscpResult<VscpMessage> {
    let mut fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
    // "...,guid," leaves one empty trailing field
    if fields.len() == MIN_FIELDS + 1 && fields[MIN_FIELDS].is_empty() {
        fields.pop();
    }
    if fields.len() < MIN_FIELDS {
        return Err(VscpError::MissingFields(fields.len()));
    }

    let head = parse_bounded("head", fields[0], u8::MAX as u64)? as u8;
    let class = parse_bounded("class", fields[1], VSCP_CLASS_LIMIT as u64 - 1)? as u16;
    let vscp_type = parse_bounded("type", fields[2], u8::MAX as u64)? as u8;
    if !fields[3].is_empty() {
        parse_bounded("obid", fields[3], u32::MAX as u64)?;
    }
    let datetime = match fields[4] {
        "" => Utc::now(),
        value => parse_datetime(value)?,
    };
    let timestamp = match fields[5] {
        "" => 0,
        value => parse_number("timestamp", value)?,
    };
    let guid = match fields[6] {
        "" | "-" => *default_guid,
        value => value.parse()?,
    };

    let data = fields[MIN_FIELDS..]
        .iter()
        .map(|value| parse_bounded("data", value, u8::MAX as u64).map(|b| b as u8))
        .collect::<VscpResult<Vec<u8>>>()?;

    let (class, guid, payload) = if class >= VSCP_LEVEL2_CLASS_OFFSET {
        if data.len() < GUID_LEN {
            return Err(VscpError::MissingDestination);
        }
        let destination = Guid::from_slice(&data[..GUID_LEN])?;
        if !destination.same_interface(default_guid) {
            return Err(VscpError::GuidMismatch);
        }
        (
            class - VSCP_LEVEL2_CLASS_OFFSET,
            destination,
            &data[GUID_LEN..],
        )
    } else {
        (class, guid, &data[..])
    };

    if payload.len() > VSCP_MAX_DATA {
        return Err(VscpError::TooMuchData(payload.len()));
    }

    Ok(VscpMessage::new(head, class, vscp_type, guid)?
        .with_data(payload)?
        .with_timestamp(timestamp)
        .with_datetime(datetime))
}

/// Format an event as a protocol line, including the line terminator
pub fn format_line(msg: &VscpMessage) -> String {
    format!("{}{}", msg, LINE_TERMINATOR)
}

impl fmt::Display for VscpMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},0,{},{},{}",
            self.head,
            self.class,
            self.vscp_type,
            self.datetime.format(DATETIME_FORMAT),
            self.timestamp,
            self.guid
        )?;
        for byte in self.data() {
            write!(f, ",{}", byte)?;
        }
        Ok(())
    }
}
