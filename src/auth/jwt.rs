use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    expiry: Duration,
}

impl JwtService {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            expiry: Duration::minutes(config.jwt_expiry_minutes),
        })
    }

    pub fn expires_in_seconds(&self) -> i64 {
        self.expiry.num_seconds()
    }

    pub fn generate_token(&self, user_id: Uuid, email: &str, role: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            email: email.to_owned(),
            role: role.to_owned(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp() as usize,
            exp: (now + self.expiry).timestamp() as usize,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(&[self.audience.clone()]);
        validation.set_issuer(&[self.issuer.clone()]);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub iss: String,
    pub aud: String,
    pub iat: usize,
    pub exp: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CallSettings;

    fn config(secret: &str) -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/estate".to_string(),
            database_max_pool_size: 1,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            jwt_secret: secret.to_string(),
            jwt_issuer: "estate-agent".to_string(),
            jwt_audience: "estate-agent-admin".to_string(),
            jwt_expiry_minutes: 5,
            cors_allowed_origin: None,
            calls: CallSettings::local("http://localhost:8000"),
        }
    }

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let jwt = JwtService::from_config(&config("s3cret")).unwrap();
        let user_id = Uuid::new_v4();
        let token = jwt
            .generate_token(user_id, "agent@example.com", "editor")
            .unwrap();

        let claims = jwt.verify_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "agent@example.com");
        assert_eq!(claims.role, "editor");
        assert_eq!(jwt.expires_in_seconds(), 300);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let issuer = JwtService::from_config(&config("one")).unwrap();
        let verifier = JwtService::from_config(&config("two")).unwrap();
        let token = issuer
            .generate_token(Uuid::new_v4(), "agent@example.com", "admin")
            .unwrap();

        assert!(verifier.verify_token(&token).is_err());
    }
}
