//! Request actors and the capabilities they hold.

use serde::{Deserialize, Serialize};

/// Cookie carrying the access token for browser sessions on the admin panel.
pub const TOKEN_COOKIE: &str = "prm_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Read and write plugin settings.
    ManageOptions,
    /// Create, edit and delete reviews and products and their fields.
    EditPosts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Administrator,
    Editor,
}

impl Role {
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Administrator => &[Capability::ManageOptions, Capability::EditPosts],
            Role::Editor => &[Capability::EditPosts],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Actor {
    role: Option<Role>,
}

impl Actor {
    pub fn anonymous() -> Self {
        Actor { role: None }
    }

    pub fn with_role(role: Role) -> Self {
        Actor { role: Some(role) }
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_authenticated(&self) -> bool {
        self.role.is_some()
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.role
            .map(|role| role.capabilities().contains(&capability))
            .unwrap_or(false)
    }
}

#[cfg(feature = "ssr")]
mod extract {
    use super::{Actor, TOKEN_COOKIE};
    use crate::error::ApiError;
    use crate::state::AppState;
    use actix_web::dev::Payload;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::{web, FromRequest, HttpRequest};
    use std::future::{ready, Ready};

    /// Token from `Authorization: Bearer ...`, falling back to the session cookie.
    pub fn request_token(req: &HttpRequest) -> Option<String> {
        let bearer = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string());

        bearer.or_else(|| req.cookie(TOKEN_COOKIE).map(|cookie| cookie.value().to_string()))
    }

    impl FromRequest for Actor {
        type Error = ApiError;
        type Future = Ready<Result<Self, Self::Error>>;

        fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
            let actor = match req.app_data::<web::Data<AppState>>() {
                Some(state) => state.config.resolve_actor(request_token(req).as_deref()),
                None => Actor::anonymous(),
            };
            ready(Ok(actor))
        }
    }
}

#[cfg(feature = "ssr")]
pub use extract::request_token;
