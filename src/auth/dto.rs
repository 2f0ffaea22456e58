use serde::{Deserialize, Serialize};

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after signup or login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub message: String,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_serialization() {
        let response = TokenResponse {
            message: "Login successful".into(),
            token: "abc.def.ghi".into(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("Login successful"));
        assert!(json.contains("abc.def.ghi"));
    }
}
