use crate::error::ProbeError;

/// Whether `host` resolves to at least one address through the system
/// resolver. IP literals resolve to themselves.
pub async fn resolves(host: &str) -> Result<bool, ProbeError> {
    let mut addrs = tokio::net::lookup_host((host, 0)).await?;
    Ok(addrs.next().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ip_literal_resolves_without_network() {
        assert!(resolves("127.0.0.1").await.unwrap());
    }

    #[tokio::test]
    async fn ipv6_literal_resolves_without_network() {
        assert!(resolves("::1").await.unwrap());
    }
}
