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

//! Gregorian fragments: `xsd:gDay`, `xsd:gMonth`, `xsd:gMonthDay`, `xsd:gYear`.
//!
//! Lexical forms (each with an optional `Z` or `±hh:mm` suffix):
//! `---DD`, `--MM`, `--MM-DD`, `YYYY`.

use crate::xsd_date_time::offset_suffix;
use crate::xsd_date_time::parse_offset;
use crate::xsd_date_time::LiteralVisitor;
use crate::xsd_date_time::XsdError;
use core::str::FromStr;
use once_cell::sync::Lazy;
use regex::Captures;
use regex::Regex;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use std::convert::TryFrom;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use time::Month;
use time::UtcOffset;

const ZONE: &str = r"(Z|[+-]\d{2}:\d{2})?";

#[allow(clippy::expect_used)]
static G_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^---(\d{{2}}){ZONE}$")).expect("valid gDay pattern"));
#[allow(clippy::expect_used)]
static G_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^--(\d{{2}}){ZONE}$")).expect("valid gMonth pattern"));
#[allow(clippy::expect_used)]
static G_MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^--(\d{{2}})-(\d{{2}}){ZONE}$")).expect("valid gMonthDay pattern")
});
#[allow(clippy::expect_used)]
static G_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^(-?\d{{4,}}){ZONE}$")).expect("valid gYear pattern"));

/// Type corresponding to `xsd:gDay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GDay {
    day: u8,
    offset: Option<UtcOffset>,
}

impl GDay {
    /// # Errors
    ///
    /// Returns an error if `day` is not in `1..=31`.
    pub fn new(day: u8, offset: Option<UtcOffset>) -> Result<Self, XsdError> {
        if !(1..=31).contains(&day) {
            return Err(XsdError::InvalidLiteral("xsd:gDay", day.to_string()));
        }
        Ok(Self { day, offset })
    }

    #[must_use]
    pub const fn day(&self) -> u8 {
        self.day
    }

    #[must_use]
    pub const fn offset(&self) -> Option<UtcOffset> {
        self.offset
    }
}

impl Display for GDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "---{:02}{}", self.day, zone(self.offset))
    }
}

impl FromStr for GDay {
    type Err = XsdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = capture(&G_DAY, "xsd:gDay", s)?;
        Self::new(number(&caps, 1, "xsd:gDay", s)?, offset(&caps, 2)?)
    }
}

/// Type corresponding to `xsd:gMonth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GMonth {
    month: Month,
    offset: Option<UtcOffset>,
}

impl GMonth {
    #[must_use]
    pub const fn new(month: Month, offset: Option<UtcOffset>) -> Self {
        Self { month, offset }
    }

    #[must_use]
    pub const fn month(&self) -> Month {
        self.month
    }

    #[must_use]
    pub const fn offset(&self) -> Option<UtcOffset> {
        self.offset
    }
}

impl Display for GMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "--{:02}{}", u8::from(self.month), zone(self.offset))
    }
}

impl FromStr for GMonth {
    type Err = XsdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = capture(&G_MONTH, "xsd:gMonth", s)?;
        let month = Month::try_from(number::<u8>(&caps, 1, "xsd:gMonth", s)?)
            .map_err(XsdError::Range)?;
        Ok(Self::new(month, offset(&caps, 2)?))
    }
}

/// Type corresponding to `xsd:gMonthDay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GMonthDay {
    month: Month,
    day: u8,
    offset: Option<UtcOffset>,
}

impl GMonthDay {
    /// `--02-29` is accepted: the fragment is checked against a leap year.
    ///
    /// # Errors
    ///
    /// Returns an error if `day` does not exist in `month`.
    pub fn new(month: Month, day: u8, offset: Option<UtcOffset>) -> Result<Self, XsdError> {
        if day == 0 || day > time::util::days_in_year_month(2000, month) {
            return Err(XsdError::InvalidLiteral(
                "xsd:gMonthDay",
                format!("--{:02}-{:02}", u8::from(month), day),
            ));
        }
        Ok(Self { month, day, offset })
    }

    #[must_use]
    pub const fn month(&self) -> Month {
        self.month
    }

    #[must_use]
    pub const fn day(&self) -> u8 {
        self.day
    }

    #[must_use]
    pub const fn offset(&self) -> Option<UtcOffset> {
        self.offset
    }
}

impl Display for GMonthDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "--{:02}-{:02}{}",
            u8::from(self.month),
            self.day,
            zone(self.offset)
        )
    }
}

impl FromStr for GMonthDay {
    type Err = XsdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = capture(&G_MONTH_DAY, "xsd:gMonthDay", s)?;
        let month = Month::try_from(number::<u8>(&caps, 1, "xsd:gMonthDay", s)?)
            .map_err(XsdError::Range)?;
        Self::new(
            month,
            number(&caps, 2, "xsd:gMonthDay", s)?,
            offset(&caps, 3)?,
        )
    }
}

/// Type corresponding to `xsd:gYear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GYear {
    year: i32,
    offset: Option<UtcOffset>,
}

impl GYear {
    #[must_use]
    pub const fn new(year: i32, offset: Option<UtcOffset>) -> Self {
        Self { year, offset }
    }

    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn offset(&self) -> Option<UtcOffset> {
        self.offset
    }
}

impl Display for GYear {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.year < 0 {
            write!(f, "-{:04}{}", self.year.unsigned_abs(), zone(self.offset))
        } else {
            write!(f, "{:04}{}", self.year, zone(self.offset))
        }
    }
}

impl FromStr for GYear {
    type Err = XsdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = capture(&G_YEAR, "xsd:gYear", s)?;
        Ok(Self::new(number(&caps, 1, "xsd:gYear", s)?, offset(&caps, 2)?))
    }
}

fn zone(offset: Option<UtcOffset>) -> String {
    offset.map(offset_suffix).unwrap_or_default()
}

fn capture<'a>(re: &Regex, kind: &'static str, s: &'a str) -> Result<Captures<'a>, XsdError> {
    re.captures(s.trim())
        .ok_or_else(|| XsdError::InvalidLiteral(kind, s.to_owned()))
}

fn number<T: FromStr>(
    caps: &Captures<'_>,
    group: usize,
    kind: &'static str,
    s: &str,
) -> Result<T, XsdError> {
    caps.get(group)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| XsdError::InvalidLiteral(kind, s.to_owned()))
}

fn offset(caps: &Captures<'_>, group: usize) -> Result<Option<UtcOffset>, XsdError> {
    caps.get(group).map(|m| parse_offset(m.as_str())).transpose()
}

macro_rules! g_literal_serde {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
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

g_literal_serde!(GDay, GMonth, GMonthDay, GYear);

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::offset;

    #[derive(Debug, Serialize, Deserialize)]
    struct Calendar {
        #[serde(rename = "Day")]
        day: GDay,
        #[serde(rename = "MonthDay")]
        month_day: GMonthDay,
        #[serde(rename = "Year")]
        year: GYear,
    }

    #[test]
    fn g_day_forms() {
        let day: GDay = "---05".parse().unwrap();
        assert_eq!(day.day(), 5);
        assert_eq!(day.offset(), None);
        assert_eq!(day.to_string(), "---05");

        let zoned: GDay = "---31-08:00".parse().unwrap();
        assert_eq!(zoned.offset(), Some(offset!(-8)));
        assert_eq!(zoned.to_string(), "---31-08:00");

        assert!("---32".parse::<GDay>().is_err());
        assert!("--05".parse::<GDay>().is_err());
    }

    #[test]
    fn g_month_forms() {
        let month: GMonth = "--10Z".parse().unwrap();
        assert_eq!(month.month(), Month::October);
        assert_eq!(month.offset(), Some(UtcOffset::UTC));
        assert_eq!(month.to_string(), "--10Z");
        assert!("--13".parse::<GMonth>().is_err());
    }

    #[test]
    fn g_month_day_forms() {
        let leap: GMonthDay = "--02-29".parse().unwrap();
        assert_eq!(leap.month(), Month::February);
        assert_eq!(leap.day(), 29);
        assert_eq!(leap.to_string(), "--02-29");

        let zoned: GMonthDay = "--12-25+05:30".parse().unwrap();
        assert_eq!(zoned.to_string(), "--12-25+05:30");

        assert!("--04-31".parse::<GMonthDay>().is_err());
    }

    #[test]
    fn g_year_forms() {
        let year: GYear = "1951".parse().unwrap();
        assert_eq!(year.year(), 1951);
        assert_eq!(year.to_string(), "1951");

        let bc: GYear = "-0044Z".parse().unwrap();
        assert_eq!(bc.year(), -44);
        assert_eq!(bc.to_string(), "-0044Z");

        assert!("51".parse::<GYear>().is_err());
    }

    #[test]
    fn fragments_through_xml() {
        let xml = "<Calendar><Day>---22</Day><MonthDay>--10-22Z</MonthDay><Year>1951-08:00</Year></Calendar>";
        let calendar: Calendar = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(calendar.day.day(), 22);
        assert_eq!(calendar.year.offset(), Some(offset!(-8)));
        assert_eq!(quick_xml::se::to_string(&calendar).unwrap(), xml);
    }
}
