use serde::{Deserialize, Serialize};

/// Raw admin credentials, received from a login form.
#[derive(Clone, Deserialize, Serialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

/// A successful login. The same token is also set as a cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// Who a valid token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub username: String,
}

#[cfg(test)]
mod examples {
    use super::*;

    impl AdminCredentials {
        /// Matches the `debug` profile in `Rocket.toml`.
        pub fn example() -> Self {
            Self {
                username: "admin".into(),
                password: "ballot-admin-dev".into(),
            }
        }

        pub fn wrong_password() -> Self {
            Self {
                username: "admin".into(),
                password: "admin123".into(),
            }
        }
    }
}
