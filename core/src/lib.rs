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

//! SOAP wire protocol building blocks.
//!
//! - Envelope encoding and body decoding ([`Envelope`], [`decode_body`])
//! - Faults with typed details ([`SoapFault`], [`FaultDetail`])
//! - WS-Security username token header ([`WssSecurityHeader`])
//! - Binary content, MTOM/XOP and MIME attachments ([`Binary`], [`mtom`])
//! - XSD calendar types ([`XsdDateTime`], [`XsdDate`], [`XsdTime`], `G*`)

pub mod binary;
pub mod envelope;
pub mod error;
pub mod fault;
pub mod mime;
pub mod mtom;
pub mod security;
pub mod xsd_date_time;
pub mod xsd_g_time;

#[doc(inline)]
pub use binary::Attachment;
#[doc(inline)]
pub use binary::Binary;
#[doc(inline)]
pub use binary::BinaryFields;
#[doc(inline)]
pub use envelope::decode_body;
#[doc(inline)]
pub use envelope::Body;
#[doc(inline)]
pub use envelope::Envelope;
#[doc(inline)]
pub use envelope::SoapVersion;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use fault::FaultDetail;
#[doc(inline)]
pub use fault::SoapFault;
#[doc(inline)]
pub use mtom::decode_message;
#[doc(inline)]
pub use mtom::MimeAttachmentCodec;
#[doc(inline)]
pub use mtom::MtomDecoder;
#[doc(inline)]
pub use mtom::MtomEncoder;
#[doc(inline)]
pub use mtom::ResponseFraming;
#[doc(inline)]
pub use security::WssSecurityHeader;
#[doc(inline)]
pub use xsd_date_time::XsdDate;
#[doc(inline)]
pub use xsd_date_time::XsdDateTime;
#[doc(inline)]
pub use xsd_date_time::XsdError;
#[doc(inline)]
pub use xsd_date_time::XsdTime;
#[doc(inline)]
pub use xsd_g_time::GDay;
#[doc(inline)]
pub use xsd_g_time::GMonth;
#[doc(inline)]
pub use xsd_g_time::GMonthDay;
#[doc(inline)]
pub use xsd_g_time::GYear;
