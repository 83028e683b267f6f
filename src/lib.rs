// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub use faultline_classify::{RequestContext, classify, flatten, flatten_to_strings, normalize};
pub use faultline_core::{Fault, FieldError, Reason};
pub use faultline_status::{ApplyIncomplete, PendingChange, parse_pending};
