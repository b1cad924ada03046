//! NDN name and Interest packet types.
//!
//! Status reports carry no payload; everything a gateway says is encoded as
//! ordered components of a hierarchical name, delivered inside an Interest
//! packet. The collector never produces Data packets, so none are modeled.

use crate::error::Error;
use crate::tlv::{self, TlvElement};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default Interest lifetime in milliseconds.
pub const DEFAULT_INTEREST_LIFETIME_MS: u32 = 4000;

/// Represents one NDN name component, an opaque byte string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameComponent(pub Bytes);

impl NameComponent {
    /// Creates a new name component from a byte slice.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Returns the component as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the component as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Length of the component in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the component is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encodes this name component as a TLV element.
    pub fn to_tlv(&self) -> TlvElement {
        TlvElement::new(tlv::TLV_COMPONENT, self.0.clone())
    }

    /// Decodes a name component from a TLV element.
    pub fn from_tlv(element: &TlvElement) -> Result<Self, Error> {
        element.expect_type(tlv::TLV_COMPONENT)?;
        Ok(Self(element.value.clone()))
    }
}

impl fmt::Display for NameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Print printable ASCII directly, otherwise fall back to hex.
        let printable = self.0.iter().all(|&b| b.is_ascii_graphic() || b == b' ');

        if printable {
            write!(f, "{}", String::from_utf8_lossy(&self.0))
        } else {
            write!(f, "0x")?;
            for &b in self.0.iter() {
                write!(f, "{:02x}", b)?;
            }
            Ok(())
        }
    }
}

/// Represents an NDN name, an ordered sequence of name components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name {
    components: Vec<NameComponent>,
}

impl Name {
    /// Creates a new empty name.
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Creates a name from a string representation with '/' as separator.
    pub fn from_string(s: &str) -> Self {
        let components = s
            .split('/')
            .filter(|comp| !comp.is_empty())
            .map(|comp| NameComponent::new(comp.as_bytes().to_vec()))
            .collect();

        Self { components }
    }

    /// Appends a component to the name.
    pub fn push(&mut self, component: NameComponent) -> &mut Self {
        self.components.push(component);
        self
    }

    /// Returns the number of components in the name.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if the name has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns an iterator over the name components.
    pub fn components(&self) -> impl Iterator<Item = &NameComponent> {
        self.components.iter()
    }

    /// Gets the component at the specified index.
    pub fn get(&self, index: usize) -> Option<&NameComponent> {
        self.components.get(index)
    }

    /// Checks if this name is a prefix of another name.
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        if self.len() > other.len() {
            return false;
        }

        self.components
            .iter()
            .zip(other.components.iter())
            .all(|(a, b)| a == b)
    }

    /// Encodes this name as a TLV element.
    pub fn to_tlv(&self) -> Result<TlvElement, Error> {
        let mut buf = BytesMut::new();

        for component in &self.components {
            component.to_tlv().encode(&mut buf);
        }

        Ok(TlvElement::new(tlv::TLV_NAME, buf.freeze()))
    }

    /// Decodes a name from a TLV element.
    pub fn from_tlv(element: &TlvElement) -> Result<Self, Error> {
        element.expect_type(tlv::TLV_NAME)?;

        let mut components = Vec::new();
        let mut buf = element.value.clone();

        while buf.has_remaining() {
            let inner = TlvElement::decode(&mut buf)?;
            components.push(NameComponent::from_tlv(&inner)?);
        }

        Ok(Self { components })
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return write!(f, "/");
        }

        for component in &self.components {
            write!(f, "/{}", component)?;
        }

        Ok(())
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::new()
    }
}

/// Represents an NDN Interest packet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interest {
    /// The name requested in the Interest.
    pub name: Name,

    /// A nonce value to prevent looping.
    pub nonce: u32,

    /// Interest lifetime in milliseconds.
    pub lifetime_ms: u32,
}

impl Interest {
    /// Creates a new Interest packet with a clock-derived nonce.
    pub fn new(name: Name) -> Self {
        use std::time::{Duration, SystemTime, UNIX_EPOCH};
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_else(|_| Duration::from_secs(0));

        let nonce = (now.as_millis() % u32::MAX as u128) as u32;

        Self {
            name,
            nonce,
            lifetime_ms: DEFAULT_INTEREST_LIFETIME_MS,
        }
    }

    /// Sets the nonce value.
    pub fn with_nonce(mut self, nonce: u32) -> Self {
        self.nonce = nonce;
        self
    }

    /// Sets the Interest lifetime.
    pub fn with_lifetime(mut self, lifetime_ms: u32) -> Self {
        self.lifetime_ms = lifetime_ms;
        self
    }

    /// Encodes this Interest into its wire format.
    pub fn to_wire(&self) -> Result<Bytes, Error> {
        let mut value = BytesMut::new();
        self.name.to_tlv()?.encode(&mut value);

        let mut nonce = BytesMut::with_capacity(4);
        nonce.put_u32(self.nonce);
        TlvElement::new(tlv::TLV_NONCE, nonce.freeze()).encode(&mut value);

        let mut lifetime = BytesMut::with_capacity(4);
        lifetime.put_u32(self.lifetime_ms);
        TlvElement::new(tlv::TLV_INTEREST_LIFETIME, lifetime.freeze()).encode(&mut value);

        let mut wire = BytesMut::new();
        TlvElement::new(tlv::TLV_INTEREST, value.freeze()).encode(&mut wire);
        Ok(wire.freeze())
    }

    /// Decodes an Interest from its wire format.
    pub fn from_wire(mut wire: impl Buf) -> Result<Self, Error> {
        let element = TlvElement::decode(&mut wire)?;
        Self::from_element(&element)
    }

    /// Decodes an Interest from an already-parsed outer TLV element.
    pub fn from_element(element: &TlvElement) -> Result<Self, Error> {
        element.expect_type(tlv::TLV_INTEREST)?;

        let mut name = None;
        let mut nonce = 0u32;
        let mut lifetime_ms = DEFAULT_INTEREST_LIFETIME_MS;

        let mut buf = element.value.clone();
        while buf.has_remaining() {
            let inner = TlvElement::decode(&mut buf)?;
            match inner.tlv_type {
                tlv::TLV_NAME => name = Some(Name::from_tlv(&inner)?),
                tlv::TLV_NONCE => {
                    if inner.value.len() != 4 {
                        return Err(Error::NdnPacket(format!(
                            "nonce must be 4 bytes, got {}",
                            inner.value.len()
                        )));
                    }
                    nonce = inner.value.clone().get_u32();
                }
                tlv::TLV_INTEREST_LIFETIME => {
                    if inner.value.len() != 4 {
                        return Err(Error::NdnPacket(format!(
                            "lifetime must be 4 bytes, got {}",
                            inner.value.len()
                        )));
                    }
                    lifetime_ms = inner.value.clone().get_u32();
                }
                // Selectors and other guiders are irrelevant to the collector.
                _ => {}
            }
        }

        let name = name.ok_or_else(|| Error::NdnPacket("Interest carries no name".into()))?;
        Ok(Self {
            name,
            nonce,
            lifetime_ms,
        })
    }
}
