// src/auth/roles.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every principal has exactly one role. Renters and landlords are marketplace
/// users; admins and managers sign in to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Renter,
    Landlord,
    Admin,
    Manager,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Renter => "renter",
            Role::Landlord => "landlord",
            Role::Admin => "admin",
            Role::Manager => "manager",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "renter" => Some(Role::Renter),
            "landlord" => Some(Role::Landlord),
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            _ => None,
        }
    }

    pub fn is_panel(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    pub fn can(self, cap: Capability) -> bool {
        capabilities(self).contains(&cap)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a route requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Update one's own account.
    Profile,
    /// Interests, bookmarks, issues, referrals, feedback.
    RenterActions,
    RedeemWallet,
    SubmitListing,
    ViewOwnListings,
    ViewAllListings,
    /// approve / reject / book / unbook
    ModerateListings,
    /// create, update, image edits
    EditListings,
    DeleteListings,
    ViewAnalytics,
    /// Read issues, enquiries and referrals; move interests through their workflow.
    HandleSupport,
    ManageWallets,
    ManageCoupons,
}

const RENTER: &[Capability] = &[
    Capability::Profile,
    Capability::RenterActions,
    Capability::RedeemWallet,
];

const LANDLORD: &[Capability] = &[
    Capability::Profile,
    Capability::RenterActions,
    Capability::RedeemWallet,
    Capability::SubmitListing,
    Capability::ViewOwnListings,
];

const MANAGER: &[Capability] = &[
    Capability::ViewAllListings,
    Capability::ModerateListings,
    Capability::ViewAnalytics,
    Capability::HandleSupport,
];

const ADMIN: &[Capability] = &[
    Capability::ViewAllListings,
    Capability::ModerateListings,
    Capability::EditListings,
    Capability::DeleteListings,
    Capability::ViewAnalytics,
    Capability::HandleSupport,
    Capability::ManageWallets,
    Capability::ManageCoupons,
];

/// The static capability table checked by the authorization gate.
pub fn capabilities(role: Role) -> &'static [Capability] {
    match role {
        Role::Renter => RENTER,
        Role::Landlord => LANDLORD,
        Role::Manager => MANAGER,
        Role::Admin => ADMIN,
    }
}
