use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use utoipa::ToSchema;

/// Closed set of account roles. Anything else is rejected at the boundary.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, EnumIter, ToSchema,
)]
pub enum Role {
    Admin,
    Accounts,
}

impl Role {
    /// Comma separated list of accepted role names, for error messages.
    pub fn valid_names() -> String {
        Role::iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
