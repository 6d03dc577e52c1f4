//! Strongly-typed tenant identifiers.
//!
//! The backend hands these out as opaque strings (usually numeric), so they are
//! modeled as trimmed, non-empty string newtypes rather than parsed numbers.

use serde::{Deserialize, Serialize};

/// Identifier of an organization (the tenant boundary).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgId(String);

/// Identifier of a section inside an organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

macro_rules! impl_string_newtype {
    ($t:ty) => {
        impl $t {
            /// Build an identifier from raw input.
            ///
            /// Returns `None` for blank input so callers can treat "no id" and
            /// "empty id" the same way.
            pub fn parse(raw: impl AsRef<str>) -> Option<Self> {
                let trimmed = raw.as_ref().trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Self(trimmed.to_string()))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_string_newtype!(OrgId);
impl_string_newtype!(SectionId);
