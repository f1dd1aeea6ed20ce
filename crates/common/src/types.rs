use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a finalized purchase.
///
/// Assigned once, when a purchase passes validation. Wraps a UUID so a
/// purchase id can't be passed where a store or account id is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseId(Uuid);

impl PurchaseId {
    /// Creates a new random purchase ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a purchase ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PurchaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PurchaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for PurchaseId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<PurchaseId> for Uuid {
    fn from(id: PurchaseId) -> Self {
        id.0
    }
}

/// Identifier of a coffee shop location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(Uuid);

impl StoreId {
    /// Creates a new random store ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a store ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for StoreId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for StoreId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Identifier of a customer's CoffeeBux loyalty account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoyaltyAccountId(Uuid);

impl LoyaltyAccountId {
    /// Creates a new random loyalty account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a loyalty account ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for LoyaltyAccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LoyaltyAccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for LoyaltyAccountId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_id_new_creates_unique_ids() {
        let id1 = PurchaseId::new();
        let id2 = PurchaseId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn purchase_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = PurchaseId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
        assert_eq!(Uuid::from(id), uuid);
    }

    #[test]
    fn ids_serialize_as_bare_uuid_strings() {
        let uuid = Uuid::new_v4();
        let json = serde_json::to_string(&StoreId::from_uuid(uuid)).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));

        let account: LoyaltyAccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(account.as_uuid(), uuid);
    }

    #[test]
    fn display_matches_uuid() {
        let uuid = Uuid::new_v4();
        assert_eq!(LoyaltyAccountId::from(uuid).to_string(), uuid.to_string());
    }
}
