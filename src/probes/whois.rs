//! Registration-age lookup over the WHOIS protocol (TCP/43).
//!
//! The bootstrap server (IANA by default) is asked first; its `refer:` line
//! names the registry, and a thin registry may in turn name the registrar's
//! server. At most [`MAX_HOPS`] servers are queried.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::ProbeError;

pub const WHOIS_PORT: u16 = 43;
pub const MAX_HOPS: usize = 3;
const MAX_RESPONSE_BYTES: u64 = 64 * 1024;

/// Second-level suffixes under which registrations happen one label deeper.
const TWO_LEVEL_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "com.au", "net.au", "org.au", "co.jp", "ne.jp",
    "com.br", "com.cn", "co.in", "co.nz", "co.za", "com.mx", "com.tr",
];

const CREATION_KEYS: &[&str] = &[
    "creation date",
    "created",
    "created on",
    "created date",
    "registered",
    "registered on",
    "registration date",
    "registration time",
    "domain registration date",
    "domain create date",
];

/// Domain a registry actually holds a record for: `login.paypal.example.co.uk`
/// becomes `example.co.uk`.
pub fn registrable_domain(host: &str) -> Option<String> {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 2 {
        return None;
    }
    let last_two = labels[labels.len() - 2..].join(".");
    let keep = if TWO_LEVEL_SUFFIXES.contains(&last_two.as_str()) {
        3
    } else {
        2
    };
    if labels.len() < keep {
        return None;
    }
    Some(labels[labels.len() - keep..].join("."))
}

/// Days between the domain's creation date and `now`.
pub async fn registration_age(
    bootstrap_server: &str,
    host: &str,
    now: DateTime<Utc>,
) -> Result<i64, ProbeError> {
    registration_age_at(bootstrap_server, WHOIS_PORT, host, now).await
}

/// [`registration_age`] against servers listening on `port`. A server written
/// as `host:port`, in the configuration or in a referral, keeps its own port.
pub async fn registration_age_at(
    bootstrap_server: &str,
    port: u16,
    host: &str,
    now: DateTime<Utc>,
) -> Result<i64, ProbeError> {
    let domain = registrable_domain(host)
        .ok_or_else(|| ProbeError::InvalidHost(format!("no registrable domain in {host}")))?;

    let mut server = bootstrap_server.to_string();
    for hop in 0..MAX_HOPS {
        let response = query(&server, port, &domain).await?;
        let referral = next_server(&response).filter(|next| !next.eq_ignore_ascii_case(&server));

        // A TLD record carries the TLD's own `created:` line.
        let tld_record = describes_tld(&response, &domain);
        if !tld_record
            && (hop > 0 || referral.is_none())
            && let Some(created) = parse_creation_date(&response)
        {
            tracing::debug!(%domain, %server, hop, %created, "whois creation date");
            return Ok((now - created).num_days());
        }
        match referral {
            Some(next) => server = next,
            None => break,
        }
    }
    Err(ProbeError::Whois(format!("no creation date for {domain}")))
}

async fn query(server: &str, default_port: u16, domain: &str) -> Result<String, ProbeError> {
    let (host, port) = split_port(server, default_port);
    let mut stream = TcpStream::connect((host, port)).await?;
    stream.write_all(format!("{domain}\r\n").as_bytes()).await?;
    stream.flush().await?;

    let mut body = Vec::new();
    stream
        .take(MAX_RESPONSE_BYTES)
        .read_to_end(&mut body)
        .await?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// `whois.example:4343` names its port; a bare host or IPv6 literal uses the default.
fn split_port(server: &str, default_port: u16) -> (&str, u16) {
    if let Some((host, port)) = server.rsplit_once(':')
        && !host.contains(':')
        && let Ok(port) = port.parse()
    {
        return (host, port);
    }
    (server, default_port)
}

/// True when the response is the registry's record for the domain's TLD
/// (`domain: COM` from IANA) rather than for the domain itself.
pub fn describes_tld(response: &str, domain: &str) -> bool {
    let Some(tld) = domain.rsplit('.').next() else {
        return false;
    };
    response.lines().any(|line| {
        line.split_once(':').is_some_and(|(key, value)| {
            key.trim().eq_ignore_ascii_case("domain") && value.trim().eq_ignore_ascii_case(tld)
        })
    })
}

/// Referral to a more specific server, if the response carries one.
pub fn next_server(response: &str) -> Option<String> {
    response.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        let is_referral = matches!(key.as_str(), "refer" | "whois" | "registrar whois server");
        if !is_referral || value.is_empty() {
            return None;
        }
        let value = value
            .trim_start_matches("whois://")
            .trim_start_matches("rwhois://")
            .trim_end_matches('/');
        Some(value.to_string())
    })
}

pub fn parse_creation_date(response: &str) -> Option<DateTime<Utc>> {
    response.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if !CREATION_KEYS.contains(&key.trim().to_ascii_lowercase().as_str()) {
            return None;
        }
        parse_whois_date(value.trim())
    })
}

/// Registries disagree on date formats; try the common ones.
pub fn parse_whois_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y.%m.%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }
    let first = value.split_whitespace().next()?;
    for fmt in ["%Y-%m-%d", "%d-%b-%Y", "%Y.%m.%d", "%Y/%m/%d", "%d.%m.%Y", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(first, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// One-shot WHOIS server on loopback: checks the query, answers, hangs up.
    async fn whois_server(expected: &'static str, response: String) -> (u16, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            assert_eq!(line, format!("{expected}\r\n"));
            reader.get_mut().write_all(response.as_bytes()).await.unwrap();
        });
        (port, handle)
    }

    fn jan_31_2024() -> DateTime<Utc> {
        parse_whois_date("2024-01-31T00:00:00Z").unwrap()
    }

    #[test]
    fn registrable_domain_trims_subdomains() {
        assert_eq!(
            registrable_domain("login.paypal.example.com").as_deref(),
            Some("example.com")
        );
        assert_eq!(
            registrable_domain("www.shop.example.co.uk").as_deref(),
            Some("example.co.uk")
        );
        assert_eq!(registrable_domain("localhost"), None);
        assert_eq!(registrable_domain("co.uk"), None);
    }

    #[test]
    fn iana_referral_is_followed() {
        let iana = "% IANA WHOIS server\n\ndomain:       COM\n\nrefer:        whois.verisign-grs.com\n";
        assert_eq!(next_server(iana).as_deref(), Some("whois.verisign-grs.com"));
    }

    #[test]
    fn registrar_referral_is_followed() {
        let thin = "   Domain Name: EXAMPLE.COM\n   Registrar WHOIS Server: whois.example-registrar.com\n";
        assert_eq!(
            next_server(thin).as_deref(),
            Some("whois.example-registrar.com")
        );
    }

    #[test]
    fn creation_date_formats() {
        let verisign = "   Creation Date: 1995-08-14T04:00:00Z\n";
        let nominet = "    Registered on: 15-Sep-1997\n";
        let denic = "created: 2019-03-01 10:22:01\n";

        for (text, year) in [(verisign, 1995), (nominet, 1997), (denic, 2019)] {
            let date = parse_creation_date(text).unwrap();
            assert_eq!(date.format("%Y").to_string(), year.to_string());
        }
    }

    #[test]
    fn unknown_keys_and_dates_are_ignored() {
        assert!(parse_creation_date("Updated Date: 2024-01-01T00:00:00Z\n").is_none());
        assert!(parse_creation_date("Creation Date: sometime last year\n").is_none());
    }

    #[test]
    fn age_is_whole_days() {
        let created = parse_whois_date("2024-01-01").unwrap();
        let now = parse_whois_date("2024-01-31T12:00:00Z").unwrap();
        assert_eq!((now - created).num_days(), 30);
    }

    #[test]
    fn server_port_is_optional() {
        assert_eq!(split_port("whois.example", 43), ("whois.example", 43));
        assert_eq!(split_port("127.0.0.1:4343", 43), ("127.0.0.1", 4343));
        assert_eq!(split_port("::1", 43), ("::1", 43));
    }

    #[test]
    fn tld_record_is_recognised() {
        let iana = "domain:       ES\nwhois:\ncreated:      1988-04-14\n";
        assert!(describes_tld(iana, "brand-new-phish.es"));
        let denic = "Domain: example.de\nCreated: 2019-03-01\n";
        assert!(!describes_tld(denic, "example.de"));
    }

    #[tokio::test]
    async fn iana_referral_leads_to_registry_date() {
        let (registry, registry_task) = whois_server(
            "example.com",
            "   Domain Name: EXAMPLE.COM\n   Creation Date: 2024-01-01T00:00:00Z\n".into(),
        )
        .await;
        let (iana, iana_task) = whois_server(
            "example.com",
            format!("domain:       COM\nrefer:        127.0.0.1:{registry}\ncreated:      1985-01-01\n"),
        )
        .await;

        let age = registration_age_at("127.0.0.1", iana, "login.example.com", jan_31_2024())
            .await
            .unwrap();
        assert_eq!(age, 30);
        iana_task.await.unwrap();
        registry_task.await.unwrap();
    }

    #[tokio::test]
    async fn tld_record_without_referral_is_unknown() {
        let (iana, task) = whois_server(
            "brand-new-phish.es",
            "domain:       ES\n\nwhois:        \n\ncreated:      1988-04-14\n".into(),
        )
        .await;

        let err = registration_age_at("127.0.0.1", iana, "brand-new-phish.es", jan_31_2024())
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Whois(_)), "{err}");
        task.await.unwrap();
    }

    #[tokio::test]
    async fn registry_refers_on_to_registrar() {
        let (registrar, registrar_task) = whois_server(
            "example.com",
            "Domain Name: example.com\nCreation Date: 2024-01-21T08:00:00Z\n".into(),
        )
        .await;
        let (registry, registry_task) = whois_server(
            "example.com",
            format!(
                "   Domain Name: EXAMPLE.COM\n   Registrar WHOIS Server: 127.0.0.1:{registrar}\n"
            ),
        )
        .await;
        let (iana, iana_task) = whois_server(
            "example.com",
            format!("domain:       COM\nrefer:        127.0.0.1:{registry}\n"),
        )
        .await;

        let age = registration_age_at("127.0.0.1", iana, "example.com", jan_31_2024())
            .await
            .unwrap();
        assert_eq!(age, 9);
        iana_task.await.unwrap();
        registry_task.await.unwrap();
        registrar_task.await.unwrap();
    }

    #[tokio::test]
    async fn registry_as_bootstrap_answers_directly() {
        let (registry, task) = whois_server(
            "example.com",
            "Domain Name: EXAMPLE.COM\nCreation Date: 2023-12-31T00:00:00Z\n".into(),
        )
        .await;

        let age = registration_age_at("127.0.0.1", registry, "example.com", jan_31_2024())
            .await
            .unwrap();
        assert_eq!(age, 31);
        task.await.unwrap();
    }
}
