//! Protocol extensions a client may negotiate.

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    /// Extensions agreed with one client.
    pub struct Extensions: u16 {
        /// Positions are sent as 32-bit integers.
        const EXT_ENTITY_POSITIONS = 1 << 0;
        /// Movement packets carry the held block.
        const HELD_BLOCK = 1 << 1;
        /// Client understands the extended block palette.
        const BLOCK_DEFINITIONS = 1 << 2;
        /// Client renders the extension blocks of the base palette.
        const CUSTOM_BLOCKS = 1 << 3;
        /// Client answers two-way pings.
        const TWO_WAY_PING = 1 << 4;
        /// Client reports mouse clicks.
        const PLAYER_CLICK = 1 << 5;
    }
}

/// Extension names and versions the server advertises.
pub const SUPPORTED_EXTENSIONS: &[(&str, i32)] = &[
    ("ExtEntityPositions", 1),
    ("HeldBlock", 1),
    ("BlockDefinitions", 1),
    ("CustomBlocks", 1),
    ("TwoWayPing", 1),
    ("PlayerClick", 1),
];

impl Extensions {
    /// Flag for an advertised extension name.
    pub fn from_ext_name(name: &str) -> Option<Self> {
        match name {
            "ExtEntityPositions" => Some(Self::EXT_ENTITY_POSITIONS),
            "HeldBlock" => Some(Self::HELD_BLOCK),
            "BlockDefinitions" => Some(Self::BLOCK_DEFINITIONS),
            "CustomBlocks" => Some(Self::CUSTOM_BLOCKS),
            "TwoWayPing" => Some(Self::TWO_WAY_PING),
            "PlayerClick" => Some(Self::PLAYER_CLICK),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_advertised_extension_has_a_flag() {
        for (name, _) in SUPPORTED_EXTENSIONS {
            assert!(Extensions::from_ext_name(name).is_some(), "{name}");
        }
        assert_eq!(Extensions::from_ext_name("EnvColors"), None);
    }

    #[test]
    fn lookup_uses_wire_names_not_flag_names() {
        assert_eq!(
            Extensions::from_ext_name("HeldBlock"),
            Some(Extensions::HELD_BLOCK)
        );
        assert_eq!(Extensions::from_ext_name("HELD_BLOCK"), None);
    }
}
