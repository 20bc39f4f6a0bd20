//! TLS configuration for the HTTP listener.

use std::path::PathBuf;

use axum_server::tls_rustls::RustlsConfig;
use scanhub_core::config::ServerConfig;
use tracing::info;

/// TLS configuration for the HTTP listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Plain HTTP.
    Disabled,
    /// User-provided certificate and key files.
    Custom {
        /// Path to PEM-encoded certificate chain.
        cert_path: PathBuf,
        /// Path to PEM-encoded private key.
        key_path: PathBuf,
    },
}

impl TlsMode {
    /// TLS is enabled only when both `certs_file` and `key_file` are set.
    pub fn from_server_config(config: &ServerConfig) -> Result<Self, TlsConfigError> {
        match (&config.certs_file, &config.key_file) {
            (None, None) => Ok(Self::Disabled),
            (Some(cert_path), Some(key_path)) => Ok(Self::Custom {
                cert_path: cert_path.clone(),
                key_path: key_path.clone(),
            }),
            _ => Err(TlsConfigError::Incomplete),
        }
    }

    /// Build the rustls server config for this mode.
    ///
    /// Returns `None` if TLS is disabled.
    pub async fn to_rustls_config(&self) -> Result<Option<RustlsConfig>, TlsConfigError> {
        match self {
            Self::Disabled => Ok(None),
            Self::Custom {
                cert_path,
                key_path,
            } => {
                let cert_pem = tokio::fs::read(cert_path).await.map_err(|e| {
                    TlsConfigError::FileRead(format!(
                        "Failed to read cert {}: {}",
                        cert_path.display(),
                        e
                    ))
                })?;
                let key_pem = tokio::fs::read(key_path).await.map_err(|e| {
                    TlsConfigError::FileRead(format!(
                        "Failed to read key {}: {}",
                        key_path.display(),
                        e
                    ))
                })?;

                let config = RustlsConfig::from_pem(cert_pem, key_pem)
                    .await
                    .map_err(|e| TlsConfigError::InvalidPem(e.to_string()))?;

                info!(
                    cert = %cert_path.display(),
                    key = %key_path.display(),
                    "TLS enabled"
                );
                Ok(Some(config))
            }
        }
    }
}

/// TLS configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum TlsConfigError {
    #[error("TLS needs both server.certs_file and server.key_file")]
    Incomplete,

    #[error("File read error: {0}")]
    FileRead(String),

    #[error("Invalid certificate or key: {0}")]
    InvalidPem(String),
}
