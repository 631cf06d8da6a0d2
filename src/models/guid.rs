use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Project type GUID Visual Studio uses for solution folders.
pub const SOLUTION_FOLDER_TYPE: &str = "{2150E333-8FDC-42A3-9474-1A3956D46DE8}";

/// A brace-wrapped identifier as it appears in `.sln` files,
/// e.g. `{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}`.
///
/// Stored upper-cased so that two spellings of the same GUID compare equal.
/// Tokens that are not UUID-shaped (`{1}`) are accepted as long as they are
/// brace-wrapped and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Guid(String);

impl Guid {
    pub fn parse(s: &str) -> Option<Self> {
        let inner = s.trim().strip_prefix('{')?.strip_suffix('}')?.trim();
        if inner.is_empty() || inner.contains(['{', '}']) {
            return None;
        }
        match Uuid::parse_str(inner) {
            Ok(uuid) => Some(Self::from_uuid(uuid)),
            Err(_) => Some(Self(format!("{{{}}}", inner.to_uppercase()))),
        }
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        let mut buf = Uuid::encode_buffer();
        Self(format!("{{{}}}", uuid.hyphenated().encode_upper(&mut buf)))
    }

    pub fn new_v4() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_solution_folder_type(&self) -> bool {
        self.0 == SOLUTION_FOLDER_TYPE
    }

    pub fn solution_folder_type() -> Self {
        Self(SOLUTION_FOLDER_TYPE.to_string())
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Guid {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid GUID token: {}", s))
    }
}

impl TryFrom<String> for Guid {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Guid> for String {
    fn from(guid: Guid) -> Self {
        guid.0
    }
}
