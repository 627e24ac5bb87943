// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! `xsd:dateTime`, `xsd:date` and `xsd:time` wrappers
//!
//! XSD allows calendar literals without a timezone. Mapping such a
//! literal onto `time::OffsetDateTime` would silently assign UTC, and
//! re-encoding would then emit a `Z` the peer never sent. The wrappers
//! below keep the wall-clock value and the offset separately; the
//! offset is `None` when the literal had no timezone.
//!
//! Encoding rules:
//! - Values are rendered with maximal precision (RFC 3339, fractional
//!   seconds trimmed of trailing zeros, `Z` for UTC).
//! - When no timezone is present the rendered suffix is removed by
//!   locating the separator after the time portion.
//! - The zero value (`Default`) renders as nothing; with `quick-xml`
//!   the element is omitted.
//!
//! Decoding rules:
//! - An empty literal and `0001-01-01T00:00:00Z` decode to the zero value.
//! - A missing timezone is tolerated: `Z` is appended only to obtain the
//!   numeric fields and is discarded afterwards.
//!
//! References:
//! - W3C XML Schema Part 2, 3.2.7 dateTime, 3.2.8 time, 3.2.9 date: `https://www.w3.org/TR/xmlschema-2/`
//! - RFC 3339, Date and Time on the Internet: `https://datatracker.ietf.org/doc/html/rfc3339`
//!
//! Examples
//! ```rust
//! use soapkit_core::XsdDateTime;
//!
//! let v: XsdDateTime = "1951-10-22T01:02:03.000000004".parse().unwrap();
//! assert!(!v.has_timezone());
//! assert_eq!(v.to_string(), "1951-10-22T01:02:03.000000004");
//!
//! let z: XsdDateTime = "1951-10-22T01:02:03Z".parse().unwrap();
//! assert_eq!(z.to_string(), "1951-10-22T01:02:03Z");
//! ```

use core::marker::PhantomData;
use core::str::FromStr;
use serde::de::Visitor;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Error as FmtError;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use time::error::ComponentRange;
use time::error::Format as FormatError;
use time::error::Parse as ParseError;
use time::format_description::well_known::Rfc3339;
use time::macros::date;
use time::macros::format_description;
use time::Date;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::Time;
use time::UtcOffset;

/// Literal that some peers send for an unset `xsd:dateTime`.
const ZERO_DATE_TIME: &str = "0001-01-01T00:00:00Z";

/// Anchor date used to parse and format `xsd:time` through RFC 3339.
const TIME_ANCHOR: Date = date!(1951 - 10 - 22);

/// Errors of XSD calendar literal handling.
#[derive(Debug)]
pub enum XsdError {
    /// Literal is not well formed.
    Parse(String, ParseError),
    /// Literal does not match the lexical form of the type.
    InvalidLiteral(&'static str, String),
    /// Component is out of range.
    Range(ComponentRange),
    /// Value cannot be rendered (for example year outside 0..=9999).
    Format(FormatError),
}

impl Display for XsdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Parse(literal, err) => write!(f, "invalid XSD literal {literal:?}: {err}"),
            Self::InvalidLiteral(kind, literal) => {
                write!(f, "invalid {kind} literal: {literal:?}")
            }
            Self::Range(err) => write!(f, "XSD value out of range: {err}"),
            Self::Format(err) => write!(f, "cannot format XSD value: {err}"),
        }
    }
}

impl StdError for XsdError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Parse(_, err) => Some(err),
            Self::Range(err) => Some(err),
            Self::Format(err) => Some(err),
            Self::InvalidLiteral(..) => None,
        }
    }
}

/// Type corresponding to `xsd:dateTime`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct XsdDateTime {
    value: Option<PrimitiveDateTime>,
    offset: Option<UtcOffset>,
}

impl XsdDateTime {
    /// Create a value from `dt`. When `has_tz` is false the offset of
    /// `dt` is dropped and only the wall-clock value is kept.
    #[must_use]
    pub fn new(dt: OffsetDateTime, has_tz: bool) -> Self {
        Self {
            value: Some(PrimitiveDateTime::new(dt.date(), dt.time())),
            offset: if has_tz { Some(dt.offset()) } else { None },
        }
    }

    /// Create a value without timezone.
    #[must_use]
    pub const fn without_timezone(dt: PrimitiveDateTime) -> Self {
        Self {
            value: Some(dt),
            offset: None,
        }
    }

    /// True for the zero value (absent element).
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.value.is_none()
    }

    #[must_use]
    pub const fn has_timezone(&self) -> bool {
        self.offset.is_some()
    }

    /// Remove timezone information.
    pub fn strip_tz(&mut self) {
        self.offset = None;
    }

    /// Wall-clock date and time.
    #[must_use]
    pub const fn date_time(&self) -> Option<PrimitiveDateTime> {
        self.value
    }

    #[must_use]
    pub const fn offset(&self) -> Option<UtcOffset> {
        self.offset
    }

    /// Value with its own offset, `None` when zero or without timezone.
    #[must_use]
    pub fn to_offset_date_time(&self) -> Option<OffsetDateTime> {
        self.value
            .zip(self.offset)
            .map(|(value, offset)| value.assume_offset(offset))
    }

    /// Value with its own offset, or with `fallback` when the literal
    /// had none.
    #[must_use]
    pub fn assume_offset(&self, fallback: UtcOffset) -> Option<OffsetDateTime> {
        self.value
            .map(|value| value.assume_offset(self.offset.unwrap_or(fallback)))
    }

    /// XSD lexical form; empty for the zero value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be rendered as RFC 3339.
    pub fn encode(&self) -> Result<String, XsdError> {
        let Some(value) = self.value else {
            return Ok(String::new());
        };
        let formatted = value
            .assume_offset(self.offset.unwrap_or(UtcOffset::UTC))
            .format(&Rfc3339)
            .map_err(XsdError::Format)?;
        if self.offset.is_some() {
            Ok(formatted)
        } else {
            Ok(strip_time_zone(&formatted).to_owned())
        }
    }
}

impl From<OffsetDateTime> for XsdDateTime {
    fn from(dt: OffsetDateTime) -> Self {
        Self::new(dt, true)
    }
}

impl From<PrimitiveDateTime> for XsdDateTime {
    fn from(dt: PrimitiveDateTime) -> Self {
        Self::without_timezone(dt)
    }
}

impl Display for XsdDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.encode().map_err(|_| FmtError)?)
    }
}

impl FromStr for XsdDateTime {
    type Err = XsdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let content = s.trim();
        if content.is_empty() {
            return Ok(Self::default());
        }
        let (_, time_part) = content
            .split_once('T')
            .ok_or_else(|| XsdError::InvalidLiteral("xsd:dateTime", content.to_owned()))?;
        let has_tz = time_part.contains(|c: char| matches!(c, 'Z' | '+' | '-'));
        let literal = with_utc_suffix(content, has_tz);
        if literal == ZERO_DATE_TIME {
            return Ok(Self::default());
        }
        let parsed = OffsetDateTime::parse(&literal, &Rfc3339)
            .map_err(|err| XsdError::Parse(content.to_owned(), err))?;
        Ok(Self {
            value: Some(PrimitiveDateTime::new(parsed.date(), parsed.time())),
            offset: if has_tz { Some(parsed.offset()) } else { None },
        })
    }
}

/// Type corresponding to `xsd:date`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct XsdDate {
    value: Option<Date>,
    offset: Option<UtcOffset>,
}

impl XsdDate {
    /// Create a value. `offset` is `None` for a date without timezone.
    #[must_use]
    pub const fn new(date: Date, offset: Option<UtcOffset>) -> Self {
        Self {
            value: Some(date),
            offset,
        }
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.value.is_none()
    }

    #[must_use]
    pub const fn has_timezone(&self) -> bool {
        self.offset.is_some()
    }

    /// Remove timezone information.
    pub fn strip_tz(&mut self) {
        self.offset = None;
    }

    #[must_use]
    pub const fn date(&self) -> Option<Date> {
        self.value
    }

    #[must_use]
    pub const fn offset(&self) -> Option<UtcOffset> {
        self.offset
    }

    /// XSD lexical form; empty for the zero value.
    ///
    /// # Errors
    ///
    /// Returns an error if the date cannot be rendered.
    pub fn encode(&self) -> Result<String, XsdError> {
        let Some(value) = self.value else {
            return Ok(String::new());
        };
        let mut out = value
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(XsdError::Format)?;
        if let Some(offset) = self.offset {
            out.push_str(&offset_suffix(offset));
        }
        Ok(out)
    }
}

impl Display for XsdDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.encode().map_err(|_| FmtError)?)
    }
}

impl FromStr for XsdDate {
    type Err = XsdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let content = s.trim();
        if content.is_empty() {
            return Ok(Self::default());
        }
        let (core, zone) = split_date_zone(content);
        let literal = format!("{core}T00:00:00{}", zone.unwrap_or("Z"));
        let parsed = OffsetDateTime::parse(&literal, &Rfc3339)
            .map_err(|err| XsdError::Parse(content.to_owned(), err))?;
        Ok(Self {
            value: Some(parsed.date()),
            offset: zone.map(|_| parsed.offset()),
        })
    }
}

/// Type corresponding to `xsd:time`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct XsdTime {
    value: Option<Time>,
    offset: Option<UtcOffset>,
}

impl XsdTime {
    /// Create a value from components. `offset` is `None` for a time
    /// without timezone.
    ///
    /// # Errors
    ///
    /// Returns an error if any component is out of range.
    pub fn new(
        hour: u8,
        minute: u8,
        second: u8,
        nanosecond: u32,
        offset: Option<UtcOffset>,
    ) -> Result<Self, XsdError> {
        let value =
            Time::from_hms_nano(hour, minute, second, nanosecond).map_err(XsdError::Range)?;
        Ok(Self {
            value: Some(value),
            offset,
        })
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.value.is_none()
    }

    #[must_use]
    pub const fn has_timezone(&self) -> bool {
        self.offset.is_some()
    }

    /// Remove timezone information.
    pub fn strip_tz(&mut self) {
        self.offset = None;
    }

    #[must_use]
    pub fn hour(&self) -> u8 {
        self.value.map_or(0, |v| v.hour())
    }

    #[must_use]
    pub fn minute(&self) -> u8 {
        self.value.map_or(0, |v| v.minute())
    }

    #[must_use]
    pub fn second(&self) -> u8 {
        self.value.map_or(0, |v| v.second())
    }

    #[must_use]
    pub fn nanosecond(&self) -> u32 {
        self.value.map_or(0, |v| v.nanosecond())
    }

    /// Timezone of the value, `None` when the literal had none.
    #[must_use]
    pub const fn offset(&self) -> Option<UtcOffset> {
        self.offset
    }

    #[must_use]
    pub const fn time(&self) -> Option<Time> {
        self.value
    }

    /// XSD lexical form; empty for the zero value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be rendered.
    pub fn encode(&self) -> Result<String, XsdError> {
        let Some(value) = self.value else {
            return Ok(String::new());
        };
        let formatted = PrimitiveDateTime::new(TIME_ANCHOR, value)
            .assume_offset(self.offset.unwrap_or(UtcOffset::UTC))
            .format(&Rfc3339)
            .map_err(XsdError::Format)?;
        let time_part = formatted
            .split_once('T')
            .map_or(formatted.as_str(), |(_, time_part)| time_part);
        if self.offset.is_some() {
            Ok(time_part.to_owned())
        } else {
            Ok(strip_time_zone(time_part).to_owned())
        }
    }
}

impl Display for XsdTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.encode().map_err(|_| FmtError)?)
    }
}

impl FromStr for XsdTime {
    type Err = XsdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let content = s.trim();
        if content.is_empty() {
            return Ok(Self::default());
        }
        let has_tz = content.contains(|c: char| matches!(c, 'Z' | '+' | '-'));
        let literal = format!("{TIME_ANCHOR}T{}", with_utc_suffix(content, has_tz));
        let parsed = OffsetDateTime::parse(&literal, &Rfc3339)
            .map_err(|err| XsdError::Parse(content.to_owned(), err))?;
        Ok(Self {
            value: Some(parsed.time()),
            offset: if has_tz { Some(parsed.offset()) } else { None },
        })
    }
}

/// Render an offset as `Z` or `±hh:mm`.
pub(crate) fn offset_suffix(offset: UtcOffset) -> String {
    if offset.is_utc() {
        return "Z".into();
    }
    let (hours, minutes, _) = offset.as_hms();
    let sign = if offset.is_negative() { '-' } else { '+' };
    format!("{sign}{:02}:{:02}", hours.unsigned_abs(), minutes.unsigned_abs())
}

/// Parse `Z` or `±hh:mm`.
pub(crate) fn parse_offset(zone: &str) -> Result<UtcOffset, XsdError> {
    if zone == "Z" {
        return Ok(UtcOffset::UTC);
    }
    let invalid = || XsdError::InvalidLiteral("timezone", zone.to_owned());
    let (sign, rest) = match zone.as_bytes().first() {
        Some(b'+') => (1, &zone[1..]),
        Some(b'-') => (-1, &zone[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: i8 = hours.parse().map_err(|_| invalid())?;
    let minutes: i8 = minutes.parse().map_err(|_| invalid())?;
    UtcOffset::from_hms(sign * hours, sign * minutes, 0).map_err(XsdError::Range)
}

/// Cut a trailing timezone off a rendered literal. Only characters after
/// the time portion starts (after `T`, or from the beginning for a bare
/// time) are scanned, so date separators are never mistaken for an offset.
fn strip_time_zone(literal: &str) -> &str {
    let time_start = literal.find('T').map_or(0, |pos| pos + 1);
    literal[time_start..]
        .find(|c: char| matches!(c, 'Z' | '+' | '-'))
        .map_or(literal, |pos| &literal[..time_start + pos])
}

/// Split `YYYY-MM-DD[zone]` into the date core and an optional zone.
fn split_date_zone(content: &str) -> (&str, Option<&str>) {
    if let Some(core) = content.strip_suffix('Z') {
        return (core, Some("Z"));
    }
    let bytes = content.as_bytes();
    let len = bytes.len();
    if len > 6 && matches!(bytes[len - 6], b'+' | b'-') && bytes[len - 3] == b':' {
        return (&content[..len - 6], Some(&content[len - 6..]));
    }
    (content, None)
}

fn with_utc_suffix(content: &str, has_tz: bool) -> Cow<'_, str> {
    if has_tz {
        Cow::Borrowed(content)
    } else {
        Cow::Owned(format!("{content}Z"))
    }
}

/// Serde visitor for any type parsed from an XSD literal.
pub(crate) struct LiteralVisitor<T>(PhantomData<T>);

impl<T> LiteralVisitor<T> {
    pub(crate) const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Visitor<'_> for LiteralVisitor<T>
where
    T: FromStr<Err = XsdError>,
{
    type Value = T;

    fn expecting(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("XSD calendar literal")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<T, E> {
        v.parse().map_err(E::custom)
    }
}

macro_rules! xsd_literal_serde {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    if self.is_zero() {
                        return serializer.serialize_none();
                    }
                    let literal = self.encode().map_err(serde::ser::Error::custom)?;
                    serializer.serialize_str(&literal)
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    deserializer.deserialize_str(LiteralVisitor::new())
                }
            }
        )*
    };
}

xsd_literal_serde!(XsdDateTime, XsdDate, XsdTime);
