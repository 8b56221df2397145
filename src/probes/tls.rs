//! Certificate validity probe.

use std::io::ErrorKind;
use std::sync::Arc;

use rustls::{ClientConfig, RootCertStore};
use rustls_pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crate::error::ProbeError;

/// Client configuration verifying against the bundled web PKI roots.
///
/// Built with an explicit ring provider so no process-wide default needs
/// to be installed first.
pub fn client_config() -> Result<Arc<ClientConfig>, ProbeError> {
    let root_store: RootCertStore = webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();
    let config = ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| ProbeError::Tls(e.to_string()))?
    .with_root_certificates(root_store)
    .with_no_client_auth();
    Ok(Arc::new(config))
}

/// Connect to `host:port` and run a verified handshake.
///
/// `Ok(false)` means the server answered but the handshake was rejected
/// (bad chain, wrong name, expired); connection trouble is an error.
pub async fn handshake(
    config: Arc<ClientConfig>,
    host: &str,
    port: u16,
) -> Result<bool, ProbeError> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| ProbeError::InvalidHost(format!("{host}: {e}")))?;
    let tcp = TcpStream::connect((host, port)).await?;

    let connector = TlsConnector::from(config);
    match connector.connect(server_name, tcp).await {
        Ok(_stream) => Ok(true),
        Err(err) if err.kind() == ErrorKind::InvalidData => {
            tracing::debug!(host, error = %err, "tls handshake rejected");
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}
