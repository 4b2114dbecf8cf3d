use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// The two account kinds. Each keeps its own table so a driver and a
/// commuter may share an email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Driver,
    Commuter,
}

impl Role {
    pub fn table(self) -> &'static str {
        match self {
            Role::Driver => "drivers",
            Role::Commuter => "commuters",
        }
    }
}

impl FromStr for Role {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "driver" => Ok(Role::Driver),
            "commuter" => Ok(Role::Commuter),
            _ => Err(ApiError::InvalidRole),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Driver => "driver",
            Role::Commuter => "commuter",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_two_known_roles() {
        assert_eq!("driver".parse::<Role>().unwrap(), Role::Driver);
        assert_eq!("commuter".parse::<Role>().unwrap(), Role::Commuter);
    }

    #[test]
    fn rejects_anything_else() {
        assert!(matches!("admin".parse::<Role>(), Err(ApiError::InvalidRole)));
        assert!(matches!("Driver".parse::<Role>(), Err(ApiError::InvalidRole)));
        assert!(matches!("".parse::<Role>(), Err(ApiError::InvalidRole)));
    }

    #[test]
    fn maps_to_its_table() {
        assert_eq!(Role::Driver.table(), "drivers");
        assert_eq!(Role::Commuter.table(), "commuters");
    }

    #[test]
    fn serializes_lowercase_for_tokens() {
        assert_eq!(serde_json::to_string(&Role::Driver).unwrap(), "\"driver\"");
        let back: Role = serde_json::from_str("\"commuter\"").unwrap();
        assert_eq!(back, Role::Commuter);
    }
}
