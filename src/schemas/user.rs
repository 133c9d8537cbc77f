use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::time::format_primitive;
use crate::db::models::User;

#[derive(Debug, Serialize)]
pub(crate) struct MeResponse {
    pub(crate) id: i64,
    pub(crate) external_ref: String,
    pub(crate) full_name: Option<String>,
    pub(crate) roles: Vec<String>,
    pub(crate) permissions: BTreeSet<String>,
    pub(crate) created_at: String,
}

impl MeResponse {
    pub(crate) fn from_db(user: User, permissions: BTreeSet<String>) -> Self {
        Self {
            id: user.id,
            external_ref: user.external_ref,
            full_name: user.full_name,
            roles: user.roles,
            permissions,
            created_at: format_primitive(user.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: i64,
    pub(crate) external_ref: String,
    pub(crate) full_name: Option<String>,
    pub(crate) roles: Vec<String>,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            external_ref: user.external_ref,
            full_name: user.full_name,
            roles: user.roles,
            created_at: format_primitive(user.created_at),
        }
    }
}
