use reqwest::{Client, ClientBuilder};

use crate::args::DEFAULT_USER_AGENT;
use crate::config::SourceSettings;
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

/// Builds the HTTP client used for the source API, with the mTLS identity,
/// optional root CA, and verification switches applied.
pub(super) fn build_source_client(settings: &SourceSettings) -> AppResult<Client> {
    let mut builder = Client::builder()
        .timeout(settings.request_timeout)
        .connect_timeout(settings.connect_timeout)
        .user_agent(DEFAULT_USER_AGENT);

    builder = apply_root_ca(builder, settings)?;
    builder = apply_identity(builder, settings)?;

    if settings.insecure_skip_verify {
        tracing::warn!("Server certificate verification is disabled for the source API.");
        builder = builder
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);
    }

    builder.build().map_err(|err| {
        tracing::error!("Failed to build HTTP client: {}", err);
        AppError::config(ConfigError::BuildClientFailed { source: err })
    })
}

fn apply_root_ca(builder: ClientBuilder, settings: &SourceSettings) -> AppResult<ClientBuilder> {
    let Some(path) = settings.root_ca.as_ref() else {
        return Ok(builder);
    };
    let bytes = std::fs::read(path).map_err(|err| {
        AppError::config(ConfigError::ReadCacert {
            path: path.clone(),
            source: err,
        })
    })?;
    let cert = reqwest::Certificate::from_pem(&bytes).map_err(|err| {
        AppError::config(ConfigError::InvalidCacert {
            path: path.clone(),
            source: err,
        })
    })?;
    Ok(builder.add_root_certificate(cert))
}

fn apply_identity(builder: ClientBuilder, settings: &SourceSettings) -> AppResult<ClientBuilder> {
    let (cert_path, key_path) = match (settings.client_cert.as_ref(), settings.client_key.as_ref()) {
        (None, None) => return Ok(builder),
        (Some(_), None) => return Err(AppError::validation(ValidationError::CertRequiresKey)),
        (None, Some(_)) => return Err(AppError::validation(ValidationError::KeyRequiresCert)),
        (Some(cert), Some(key)) => (cert, key),
    };
    let cert_bytes = std::fs::read(cert_path).map_err(|err| {
        AppError::config(ConfigError::ReadCert {
            path: cert_path.clone(),
            source: err,
        })
    })?;
    let key_bytes = std::fs::read(key_path).map_err(|err| {
        AppError::config(ConfigError::ReadKey {
            path: key_path.clone(),
            source: err,
        })
    })?;
    let identity = reqwest::Identity::from_pkcs8_pem(&cert_bytes, &key_bytes)
        .map_err(|err| AppError::config(ConfigError::InvalidIdentity { source: err }))?;
    Ok(builder.identity(identity))
}
