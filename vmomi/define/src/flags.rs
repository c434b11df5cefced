//! Property flag bitset.

use serde::{Deserialize, Deserializer};

bitflags::bitflags! {
    /// Flags attached to properties, parameters and method results.
    ///
    /// On the wire the set is a plain integer. Unknown bits are retained so a
    /// newer schema never fails to load.
    ///
    /// ## Examples
    ///
    /// ```
    /// use vmomi_define::PropFlags;
    ///
    /// let flags = PropFlags::from_bits_retain(4 | 8);
    /// assert!(flags.contains(PropFlags::OPTIONAL));
    /// assert!(flags.contains(PropFlags::SECRET));
    /// assert!(!flags.contains(PropFlags::LINK));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropFlags: u32 {
        /// The value is a link to another object.
        const LINK = 1;
        /// The value may be linked to.
        const LINKABLE = 1 << 1;
        /// The value may be absent.
        const OPTIONAL = 1 << 2;
        /// The value is sensitive (passwords, keys).
        const SECRET = 1 << 3;
    }
}

impl<'de> Deserialize<'de> for PropFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(Self::from_bits_retain(bits))
    }
}
