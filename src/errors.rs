// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors raised while turning text (command lines, shared state
//! strings) into render settings.  Nothing inside a render can fail;
//! see the session module for how stale renders end.

use failure::Fail;

/// Everything that can go wrong reading a setting.
#[derive(Debug, Fail, PartialEq)]
pub enum ConfigError {
    /// A colour scheme name nobody has heard of.
    #[fail(display = "unknown colour scheme: {}", _0)]
    UnknownScheme(String),

    /// A field of a shared state string could not be parsed.
    #[fail(display = "could not parse {} from {:?}", field, value)]
    BadField {
        /// Name of the field.
        field: String,
        /// The text we were given.
        value: String,
    },

    /// A value parsed fine but is out of its allowed range.
    #[fail(display = "{} is out of range: {}", field, reason)]
    OutOfRange {
        /// Name of the field.
        field: &'static str,
        /// What the range is.
        reason: String,
    },
}
