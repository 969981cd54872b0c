use std::collections::HashMap;

/// Role definitions of the invoice backend.
pub struct Role;

impl Role {
    /// The administrator who manages global settings such as dropdown values.
    pub const ADMIN: &'static str = "admin";
    /// The normal user who manages the records of the own tenant.
    pub const USER: &'static str = "user";

    /// To check if a user who has `role_map` with the specific `role_name`.
    pub fn is_role(role_map: &HashMap<String, bool>, role_name: &'static str) -> bool {
        match role_map.get(role_name) {
            None => false,
            Some(map) => *map,
        }
    }
}
