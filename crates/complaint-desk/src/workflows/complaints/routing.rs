use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::ComplaintCategory;

/// Identifier of a department that resolves complaints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AuthorityId(pub String);

impl AuthorityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for AuthorityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contact card for a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    pub id: AuthorityId,
    pub name: String,
    pub department: String,
    pub email: String,
    pub phone: String,
}

/// Category to department assignments. Built once at startup.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    assignments: BTreeMap<ComplaintCategory, AuthorityId>,
    fallback: AuthorityId,
}

impl RoutingTable {
    pub fn new(
        assignments: impl IntoIterator<Item = (ComplaintCategory, AuthorityId)>,
        fallback: AuthorityId,
    ) -> Self {
        Self {
            assignments: assignments.into_iter().collect(),
            fallback,
        }
    }

    /// Municipal department assignments used by the desk.
    pub fn standard() -> Self {
        Self::new(
            [
                (ComplaintCategory::Water, AuthorityId::new("auth1")),
                (ComplaintCategory::Electricity, AuthorityId::new("auth3")),
                (ComplaintCategory::Waste, AuthorityId::new("auth2")),
                (ComplaintCategory::Sanitation, AuthorityId::new("auth2")),
                (ComplaintCategory::Road, AuthorityId::new("auth4")),
                (ComplaintCategory::Housing, AuthorityId::new("auth1")),
                (ComplaintCategory::Other, AuthorityId::new("auth1")),
            ],
            AuthorityId::new("auth1"),
        )
    }

    pub fn assign_authority(&self, category: ComplaintCategory) -> &AuthorityId {
        self.assignments.get(&category).unwrap_or(&self.fallback)
    }

    pub fn fallback(&self) -> &AuthorityId {
        &self.fallback
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Routes a raw category string with the standard table. Unknown or empty
/// categories go to the fallback department.
pub fn assign_authority(category: &str) -> AuthorityId {
    RoutingTable::standard()
        .assign_authority(ComplaintCategory::parse(category))
        .clone()
}

/// Static list of departments known to the desk.
#[derive(Debug, Clone)]
pub struct AuthorityDirectory {
    authorities: Vec<Authority>,
}

impl AuthorityDirectory {
    pub fn new(authorities: Vec<Authority>) -> Self {
        Self { authorities }
    }

    pub fn standard() -> Self {
        let entry = |id: &str, name: &str, department: &str, email: &str, phone: &str| Authority {
            id: AuthorityId::new(id),
            name: name.to_string(),
            department: department.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        };

        Self::new(vec![
            entry(
                "auth1",
                "Water Department",
                "Water Supply",
                "water@example.com",
                "+1234567895",
            ),
            entry(
                "auth2",
                "Waste Management",
                "Sanitation",
                "waste@example.com",
                "+1234567896",
            ),
            entry(
                "auth3",
                "Electricity Department",
                "Electricity",
                "electricity@example.com",
                "+1234567897",
            ),
            entry(
                "auth4",
                "Road Maintenance",
                "Infrastructure",
                "roads@example.com",
                "+1234567898",
            ),
        ])
    }

    pub fn get(&self, id: &AuthorityId) -> Option<&Authority> {
        self.authorities.iter().find(|authority| &authority.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Authority> {
        self.authorities.iter()
    }
}

impl Default for AuthorityDirectory {
    fn default() -> Self {
        Self::standard()
    }
}
