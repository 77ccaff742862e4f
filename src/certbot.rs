use crate::config::ProvisionConfig;
use crate::host::Host;
use cmd_lib::*;
use std::io::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateOutcome {
    Obtained,
    /// Let's Encrypt does not issue certificates for bare IP addresses.
    Skipped,
}

impl CertificateOutcome {
    pub fn is_obtained(self) -> bool {
        self == CertificateOutcome::Obtained
    }
}

/// Four dot-separated decimal octets, each in 0..=255.
pub fn is_ipv4_literal(domain: &str) -> bool {
    let octets: Vec<&str> = domain.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|octet| {
            !octet.is_empty()
                && octet.len() <= 3
                && octet.bytes().all(|b| b.is_ascii_digit())
                && octet.parse::<u8>().is_ok()
        })
}

pub fn issue_certificate(
    host: &impl Host,
    config: &ProvisionConfig,
) -> Result<CertificateOutcome, Error> {
    let domain = &config.domain;
    if is_ipv4_literal(domain) {
        warn!("{domain} is an IP address, skipping TLS certificate (serving plain http)");
        return Ok(CertificateOutcome::Skipped);
    }

    // certbot rewrites the nginx site to redirect http to https
    host.certbot(domain, &config.admin_email())?;
    info!("TLS certificate installed for {domain}");
    Ok(CertificateOutcome::Obtained)
}
