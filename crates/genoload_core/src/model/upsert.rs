//! Resolution policy for entity lookups.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// How the resolver treats an entity that may or may not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpsertMode {
    /// Look up only; a miss is an error.
    #[serde(alias = "select_only")]
    SelectOnly,
    /// Always create; duplicates are accepted.
    #[serde(alias = "insert_only")]
    InsertOnly,
    /// Look up first and create on miss.
    #[default]
    #[serde(alias = "insert_or_select", alias = "BOTH", alias = "both")]
    InsertOrSelect,
}

impl UpsertMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SelectOnly => "select_only",
            Self::InsertOnly => "insert_only",
            Self::InsertOrSelect => "insert_or_select",
        }
    }
}

impl Display for UpsertMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legacy numeric mode codes (`0` select, `1` insert, `2` both).
impl TryFrom<u8> for UpsertMode {
    type Error = UnknownUpsertMode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::SelectOnly),
            1 => Ok(Self::InsertOnly),
            2 => Ok(Self::InsertOrSelect),
            other => Err(UnknownUpsertMode(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownUpsertMode(pub u8);

impl Display for UnknownUpsertMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown upsert mode code {}; expected 0, 1 or 2", self.0)
    }
}

impl Error for UnknownUpsertMode {}
