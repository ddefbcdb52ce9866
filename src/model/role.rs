use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, AsRefStr, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Admin = 1,
    Manager = 2,
    Accountant = 3,
    Staff = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Manager),
            3 => Some(Role::Accountant),
            4 => Some(Role::Staff),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Admins and managers run the studio floor.
    pub fn is_manager(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    /// Everyone allowed to touch money: invoices, advances, salaries.
    pub fn handles_finance(self) -> bool {
        matches!(self, Role::Admin | Role::Manager | Role::Accountant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for role in [Role::Admin, Role::Manager, Role::Accountant, Role::Staff] {
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(9), None);
    }

    #[test]
    fn staff_has_no_elevated_rights() {
        assert!(!Role::Staff.is_manager());
        assert!(!Role::Staff.handles_finance());
        assert!(Role::Accountant.handles_finance());
        assert!(!Role::Accountant.is_manager());
    }
}
