mod certbot;
mod common;
mod config;
mod host;
mod nginx;
mod packages;
mod provisioner;
mod python_env;
mod systemd;

use clap::Parser;
use cmd_lib::*;
use config::ProvisionConfig;
use host::{DryRunHost, SystemHost};
use packages::PackageManager;
use std::io::Write;

#[derive(Parser, Debug)]
#[clap(
    name = "streamlit-bootstrap",
    about = "Bootstrap a Streamlit app behind nginx (with certbot TLS) as a systemd service"
)]
struct Opts {
    #[arg(short, long, help = "TOML file with provision settings")]
    config: Option<String>,

    #[arg(long, help = "Application directory (the venv is created inside it)")]
    app_dir: Option<String>,

    #[arg(long, help = "Streamlit entry file inside the application directory")]
    entry_file: Option<String>,

    #[arg(long, help = "Domain name or IPv4 address the app is served at")]
    domain: Option<String>,

    #[arg(long, help = "Port streamlit listens on and nginx forwards to")]
    port: Option<u16>,

    #[arg(long, help = "User the service runs as")]
    user: Option<String>,

    #[arg(long, help = "System package manager: apt or dnf")]
    package_manager: Option<PackageManager>,

    #[arg(long, help = "Name of the systemd unit and nginx site")]
    service_name: Option<String>,

    #[arg(long, help = "Contact email for certbot [default: admin@<domain>]")]
    admin_email: Option<String>,

    #[arg(
        long = "env",
        value_name = "KEY=VALUE",
        value_parser = parse_env_setting,
        help = "Extra environment variable for the service (repeatable)"
    )]
    env: Vec<(String, String)>,

    #[arg(long, help = "Log the actions without changing the machine")]
    dry_run: bool,
}

impl Opts {
    fn apply_to(self, config: &mut ProvisionConfig) {
        if let Some(app_dir) = self.app_dir {
            config.app_dir = app_dir;
        }
        if let Some(entry_file) = self.entry_file {
            config.entry_file = entry_file;
        }
        if let Some(domain) = self.domain {
            config.domain = domain;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(user) = self.user {
            config.user = user;
        }
        if let Some(package_manager) = self.package_manager {
            config.package_manager = package_manager;
        }
        if let Some(service_name) = self.service_name {
            config.service_name = service_name;
        }
        if self.admin_email.is_some() {
            config.admin_email = self.admin_email;
        }
        config.environment.extend(self.env);
    }
}

fn parse_env_setting(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}

#[cmd_lib::main]
fn main() -> CmdResult {
    env_logger::Builder::new()
        .format(|buf, record| {
            let timestamp = chrono::Local::now().format("%b %d %H:%M:%S").to_string();
            let process_name = std::env::current_exe()
                .ok()
                .and_then(|path| {
                    path.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                })
                .unwrap_or_else(|| "streamlit-bootstrap".to_string());
            let pid = std::process::id();
            writeln!(
                buf,
                "{} {}[{}]: {} {}",
                timestamp,
                process_name,
                pid,
                record.level(),
                record.args()
            )
        })
        .filter(None, log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let opts = Opts::parse();
    let dry_run = opts.dry_run;
    let mut config = ProvisionConfig::load(opts.config.as_deref())?;
    opts.apply_to(&mut config);
    config.validate()?;

    if dry_run {
        provisioner::bootstrap(&DryRunHost, &config)?;
    } else {
        provisioner::bootstrap(&SystemHost, &config)?;
    }
    info!("streamlit-bootstrap {} is done", config.service_name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_keeps_defaults() {
        let opts = Opts::try_parse_from(["streamlit-bootstrap"]).unwrap();
        let mut config = ProvisionConfig::default();
        opts.apply_to(&mut config);
        assert_eq!(config, ProvisionConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let opts = Opts::try_parse_from([
            "streamlit-bootstrap",
            "--domain",
            "app.example.com",
            "--port",
            "8601",
            "--user",
            "ec2-user",
            "--package-manager",
            "dnf",
            "--env",
            "DYNAMO_TABLE=CrawledData",
            "--dry-run",
        ])
        .unwrap();
        assert!(opts.dry_run);

        let mut config = ProvisionConfig::default();
        opts.apply_to(&mut config);
        assert_eq!(config.domain, "app.example.com");
        assert_eq!(config.port, 8601);
        assert_eq!(config.user, "ec2-user");
        assert_eq!(config.package_manager, PackageManager::Dnf);
        assert_eq!(config.environment["DYNAMO_TABLE"], "CrawledData");
        assert_eq!(config.environment["AWS_DEFAULT_REGION"], "us-east-1");
        config.validate().unwrap();
    }

    #[test]
    fn test_rejects_bad_flag_values() {
        assert!(Opts::try_parse_from(["streamlit-bootstrap", "--port", "70000"]).is_err());
        assert!(Opts::try_parse_from(["streamlit-bootstrap", "--package-manager", "yum"]).is_err());
        assert!(Opts::try_parse_from(["streamlit-bootstrap", "--env", "NOVALUE"]).is_err());
    }

    #[test]
    fn test_parse_env_setting() {
        assert_eq!(
            parse_env_setting("A=b=c").unwrap(),
            ("A".to_string(), "b=c".to_string())
        );
        assert!(parse_env_setting("=x").is_err());
    }

    #[test]
    fn test_dry_run_host_completes() {
        let config = ProvisionConfig {
            domain: "app.example.com".to_string(),
            ..Default::default()
        };
        let message = provisioner::bootstrap(&DryRunHost, &config).unwrap();
        assert_eq!(message, "Visit: https://app.example.com");
    }
}
