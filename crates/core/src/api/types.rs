//! Auth request/response bodies

use serde::{Deserialize, Serialize};

use crate::session::{Session, UserProfile};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub user: UserProfile,
}

impl LoginResponse {
    pub fn into_session(self) -> Session {
        Session::new(self.access_token, Some(self.user))
    }
}
