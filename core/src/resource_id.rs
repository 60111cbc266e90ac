// ## 📂 File: `src/resource_id.rs`

//! Resource identifiers.
//!
//! - `SimpleResourceId`: 16 opaque bytes naming one key.
//! - `CompositeResourceId`: `[type][session id][subkey seed]`, 33 bytes,
//!   names one resource inside a transparent session.
//! - `ResourceId`: either of the two, parsed by length.

use std::fmt;

use crate::constants::{COMPOSITE_RESOURCE_ID_LEN, RESOURCE_ID_LEN, SUBKEY_SEED_LEN};
use crate::crypto::Mac;
use crate::types::{Error, Result};
use crate::utils::byte_array_type;

byte_array_type!(hex
    /// Identifier of a single symmetric key.
    SimpleResourceId,
    RESOURCE_ID_LEN
);

byte_array_type!(hex
    /// Random seed from which a transparent-session subkey is derived.
    SubkeySeed,
    SUBKEY_SEED_LEN
);

byte_array_type!(hex
    /// Session id and subkey seed behind a one-byte type discriminator.
    CompositeResourceId,
    COMPOSITE_RESOURCE_ID_LEN
);

impl From<Mac> for SimpleResourceId {
    fn from(mac: Mac) -> Self {
        SimpleResourceId::new(*mac.as_bytes())
    }
}

// The seed doubles as the individual resource id of a session resource.
impl From<SubkeySeed> for SimpleResourceId {
    fn from(seed: SubkeySeed) -> Self {
        SimpleResourceId::new(*seed.as_bytes())
    }
}

impl From<SimpleResourceId> for SubkeySeed {
    fn from(id: SimpleResourceId) -> Self {
        SubkeySeed::new(*id.as_bytes())
    }
}

impl CompositeResourceId {
    /// Discriminator of transparent-session ids.
    pub const TRANSPARENT_SESSION_TYPE: u8 = 0;

    pub fn new_transparent_session_id(session_id: &SimpleResourceId, seed: &SubkeySeed) -> Self {
        let mut bytes = [0u8; COMPOSITE_RESOURCE_ID_LEN];
        bytes[0] = Self::TRANSPARENT_SESSION_TYPE;
        bytes[1..1 + RESOURCE_ID_LEN].copy_from_slice(session_id.as_ref());
        bytes[1 + RESOURCE_ID_LEN..].copy_from_slice(seed.as_ref());
        Self::new(bytes)
    }

    /// Build from the session id and seed bytes that follow the type byte on the wire.
    pub(crate) fn from_session_parts(parts: &[u8]) -> Result<Self> {
        if parts.len() != RESOURCE_ID_LEN + SUBKEY_SEED_LEN {
            return Err(Error::InvalidBufferSize { what: "CompositeResourceId", actual: parts.len() + 1 });
        }
        let mut bytes = [0u8; COMPOSITE_RESOURCE_ID_LEN];
        bytes[0] = Self::TRANSPARENT_SESSION_TYPE;
        bytes[1..].copy_from_slice(parts);
        Ok(Self::new(bytes))
    }

    #[inline]
    pub fn composite_type(&self) -> u8 {
        self.as_bytes()[0]
    }

    /// Session-level id, used to look up the session key.
    pub fn session_id(&self) -> SimpleResourceId {
        let mut id = [0u8; RESOURCE_ID_LEN];
        id.copy_from_slice(&self.as_bytes()[1..1 + RESOURCE_ID_LEN]);
        SimpleResourceId::new(id)
    }

    /// Resource-level id; its bytes are also the subkey seed.
    pub fn individual_resource_id(&self) -> SimpleResourceId {
        let mut id = [0u8; RESOURCE_ID_LEN];
        id.copy_from_slice(&self.as_bytes()[1 + RESOURCE_ID_LEN..]);
        SimpleResourceId::new(id)
    }

    #[inline]
    pub fn subkey_seed(&self) -> SubkeySeed {
        self.individual_resource_id().into()
    }
}

/// Either kind of resource id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceId {
    Simple(SimpleResourceId),
    Composite(CompositeResourceId),
}

impl ResourceId {
    /// Parse by length: 16 bytes is simple, 33 bytes is composite.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes.len() {
            RESOURCE_ID_LEN => Ok(ResourceId::Simple(SimpleResourceId::try_from(bytes)?)),
            COMPOSITE_RESOURCE_ID_LEN => Ok(ResourceId::Composite(CompositeResourceId::try_from(bytes)?)),
            actual => Err(Error::InvalidBufferSize { what: "ResourceId", actual }),
        }
    }

    /// Id usable for a resource-level key lookup.
    pub fn individual_resource_id(&self) -> SimpleResourceId {
        match self {
            ResourceId::Simple(id) => *id,
            ResourceId::Composite(id) => id.individual_resource_id(),
        }
    }

    /// Session id of a composite id, `None` for simple ids.
    pub fn session_id(&self) -> Option<SimpleResourceId> {
        match self {
            ResourceId::Simple(_) => None,
            ResourceId::Composite(id) => Some(id.session_id()),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ResourceId::Simple(id) => id.as_ref(),
            ResourceId::Composite(id) => id.as_ref(),
        }
    }
}

impl From<SimpleResourceId> for ResourceId {
    fn from(id: SimpleResourceId) -> Self {
        ResourceId::Simple(id)
    }
}

impl From<CompositeResourceId> for ResourceId {
    fn from(id: CompositeResourceId) -> Self {
        ResourceId::Composite(id)
    }
}

impl TryFrom<&[u8]> for ResourceId {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        ResourceId::from_bytes(bytes)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Simple(id) => fmt::Display::fmt(id, f),
            ResourceId::Composite(id) => fmt::Display::fmt(id, f),
        }
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Simple(id) => fmt::Debug::fmt(id, f),
            ResourceId::Composite(id) => fmt::Debug::fmt(id, f),
        }
    }
}
