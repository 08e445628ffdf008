use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use tally_core::{DomainError, DomainResult, Entity, PartyId};

/// Party kind: customer or supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    Customer,
    Supplier,
}

/// Contact information for a party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// A customer or supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    id: PartyId,
    kind: PartyKind,
    name: String,
    contact: ContactInfo,
}

impl Party {
    pub fn new(
        id: PartyId,
        kind: PartyKind,
        name: impl Into<String>,
        contact: ContactInfo,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self {
            id,
            kind,
            name,
            contact,
        })
    }

    pub fn id_typed(&self) -> PartyId {
        self.id
    }

    pub fn kind(&self) -> PartyKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }
}

impl Entity for Party {
    type Id = PartyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// In-memory party lookup.
#[derive(Debug, Clone, Default)]
pub struct PartyRegistry {
    parties: HashMap<PartyId, Party>,
}

impl PartyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a party, returning the previous record.
    pub fn insert(&mut self, party: Party) -> Option<Party> {
        self.parties.insert(*party.id(), party)
    }

    pub fn get(&self, id: &PartyId) -> Option<&Party> {
        self.parties.get(id)
    }

    /// Resolve a party and check it is of the expected kind.
    pub fn require(&self, id: &PartyId, kind: PartyKind) -> DomainResult<&Party> {
        let party = self
            .get(id)
            .ok_or_else(|| DomainError::not_found(format!("party {id}")))?;
        if party.kind != kind {
            return Err(DomainError::invariant(format!(
                "party {id} is a {:?}, expected a {kind:?}",
                party.kind
            )));
        }
        Ok(party)
    }

    pub fn len(&self) -> usize {
        self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_empty_name() {
        let err = Party::new(PartyId::new(), PartyKind::Customer, "", ContactInfo::default())
            .unwrap_err();
        assert_eq!(err, DomainError::validation("name cannot be empty"));
    }

    #[test]
    fn require_checks_existence_and_kind() {
        let mut registry = PartyRegistry::new();
        let supplier = Party::new(
            PartyId::new(),
            PartyKind::Supplier,
            "Acme Wholesale",
            ContactInfo {
                email: Some("orders@acme.test".to_string()),
                ..ContactInfo::default()
            },
        )
        .unwrap();
        let supplier_id = supplier.id_typed();
        registry.insert(supplier);

        assert_eq!(
            registry
                .require(&supplier_id, PartyKind::Supplier)
                .unwrap()
                .name(),
            "Acme Wholesale"
        );

        match registry.require(&supplier_id, PartyKind::Customer) {
            Err(DomainError::InvariantViolation(msg)) => assert!(msg.contains("expected a Customer")),
            other => panic!("expected kind mismatch, got {other:?}"),
        }

        assert!(matches!(
            registry.require(&PartyId::new(), PartyKind::Supplier),
            Err(DomainError::NotFound(_))
        ));
    }
}
