//! Gateway configuration

use std::sync::Arc;

use anyhow::Result;
use common::{ClaimsVerifier, JwtClaimsVerifier, UnverifiedClaims};
use tracing::info;

/// How session token claims are trusted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifierConfig {
    /// Decode the payload only; trust is delegated to the cookie issuer
    Unverified,
    /// HS256 shared secret
    Hs256(String),
    /// RS256 public key in PEM format
    Rs256(String),
}

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to listen on
    pub addr: String,
    pub verifier: VerifierConfig,
}

impl GatewayConfig {
    /// Create a new GatewayConfig from environment variables
    ///
    /// # Environment Variables
    /// - `GATEWAY_ADDR`: listen address (default: "0.0.0.0:3000")
    /// - `AUTH_JWT_SECRET`: HS256 secret used by the token issuer
    /// - `AUTH_JWT_PUBLIC_KEY`: RS256 public key (PEM format) or path to the key file
    ///
    /// With neither key variable set, token signatures are not verified.
    pub fn from_env() -> Result<Self> {
        let addr = std::env::var("GATEWAY_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let verifier = if let Ok(secret) = std::env::var("AUTH_JWT_SECRET") {
            VerifierConfig::Hs256(secret)
        } else if let Ok(public_key) = std::env::var("AUTH_JWT_PUBLIC_KEY") {
            // If the public key looks like a file path, read from file
            let public_key = if public_key.starts_with("-----BEGIN") {
                public_key
            } else {
                std::fs::read_to_string(&public_key)
                    .map_err(|e| anyhow::anyhow!("Failed to read public key file: {}", e))?
                    .trim()
                    .to_string()
            };
            VerifierConfig::Rs256(public_key)
        } else {
            VerifierConfig::Unverified
        };

        Ok(GatewayConfig { addr, verifier })
    }

    /// Build the claims verifier the route guard will use
    pub fn build_verifier(&self) -> Result<Arc<dyn ClaimsVerifier>> {
        let verifier: Arc<dyn ClaimsVerifier> = match &self.verifier {
            VerifierConfig::Unverified => Arc::new(UnverifiedClaims::new()),
            VerifierConfig::Hs256(secret) => {
                info!("Verifying session tokens with HS256");
                Arc::new(JwtClaimsVerifier::hs256(secret.as_bytes()))
            }
            VerifierConfig::Rs256(public_key) => {
                info!("Verifying session tokens with RS256");
                Arc::new(JwtClaimsVerifier::rs256_pem(public_key)?)
            }
        };
        Ok(verifier)
    }
}
