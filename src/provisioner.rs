use crate::certbot::{self, CertificateOutcome};
use crate::config::ProvisionConfig;
use crate::host::Host;
use crate::{nginx, packages, python_env, systemd};
use cmd_lib::*;
use std::io::Error;

/// Runs every provisioning step in order, stopping at the first failure.
/// Nothing is rolled back; every step can safely be re-run.
pub fn bootstrap(host: &impl Host, config: &ProvisionConfig) -> Result<String, Error> {
    info!(
        "Bootstrapping {} ({}) for {} on port {}",
        config.service_name, config.entry_file, config.domain, config.port
    );

    packages::install_packages(host, config.package_manager)?;

    let venv_dir = config.venv_dir();
    python_env::ensure_virtual_environment(host, &venv_dir)?;
    python_env::install_dependencies(host, config)?;

    nginx::write_proxy_config(host, config)?;
    nginx::reload_proxy(host)?;

    let certificate = certbot::issue_certificate(host, config)?;

    systemd::write_service_unit(host, config)?;
    systemd::activate_service(host, &config.service_name)?;

    let message = report_completion(&config.domain, certificate);
    println!("{message}");
    Ok(message)
}

pub fn report_completion(domain: &str, certificate: CertificateOutcome) -> String {
    let scheme = if certificate.is_obtained() {
        "https"
    } else {
        "http"
    };
    format!("Visit: {scheme}://{domain}")
}
