//! Sales channel model
//!
//! Channels are a closed set. Locale labels (`Lista/PVP`, `Minorista`,
//! `Mayorista`) only exist at the boundary: [`Channel::display_name`] for
//! output, serde aliases for input.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Supplier list price plus tax, never rounded
    #[serde(alias = "lista", alias = "pvp", alias = "lista_pvp")]
    List,
    #[serde(alias = "minorista")]
    Retail,
    #[serde(alias = "mayorista")]
    Wholesale,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::List, Channel::Retail, Channel::Wholesale];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Retail => "retail",
            Self::Wholesale => "wholesale",
        }
    }

    /// Localized label shown to end users
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::List => "Lista/PVP",
            Self::Retail => "Minorista",
            Self::Wholesale => "Mayorista",
        }
    }

    /// Whether final prices on this channel go through the rounding policy
    pub fn is_rounded(&self) -> bool {
        !matches!(self, Self::List)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(Channel::List.display_name(), "Lista/PVP");
        assert_eq!(Channel::Retail.display_name(), "Minorista");
        assert_eq!(Channel::Wholesale.display_name(), "Mayorista");
    }

    #[test]
    fn test_only_list_is_unrounded() {
        assert!(!Channel::List.is_rounded());
        assert!(Channel::Retail.is_rounded());
        assert!(Channel::Wholesale.is_rounded());
    }

    #[test]
    fn test_serde_wire_form_and_aliases() {
        assert_eq!(
            serde_json::to_string(&Channel::Wholesale).unwrap(),
            "\"wholesale\""
        );
        let c: Channel = serde_json::from_str("\"mayorista\"").unwrap();
        assert_eq!(c, Channel::Wholesale);
        let c: Channel = serde_json::from_str("\"pvp\"").unwrap();
        assert_eq!(c, Channel::List);
    }
}
