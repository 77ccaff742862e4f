use crate::common::*;
use crate::config::ProvisionConfig;
use crate::host::Host;
use cmd_lib::*;
use std::collections::BTreeMap;

pub struct UnitSpec<'a> {
    pub service_name: &'a str,
    pub user: &'a str,
    pub work_dir: &'a str,
    pub venv_dir: &'a str,
    pub entry_file: &'a str,
    pub port: u16,
    pub environment: &'a BTreeMap<String, String>,
}

impl<'a> UnitSpec<'a> {
    pub fn from_config(config: &'a ProvisionConfig, venv_dir: &'a str) -> Self {
        Self {
            service_name: &config.service_name,
            user: &config.user,
            work_dir: &config.app_dir,
            venv_dir,
            entry_file: &config.entry_file,
            port: config.port,
            environment: &config.environment,
        }
    }
}

/// Quoting for a value inside `Environment="..."`; `%` would otherwise be
/// expanded as a unit specifier.
fn escape_env_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '%' => escaped.push_str("%%"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub fn render_service_unit(unit: &UnitSpec) -> String {
    let UnitSpec {
        service_name,
        user,
        work_dir,
        venv_dir,
        entry_file,
        port,
        environment,
    } = unit;
    let env_settings: String = environment
        .iter()
        .map(|(key, value)| format!("\nEnvironment=\"{key}={}\"", escape_env_value(value)))
        .collect();

    format!(
        r##"[Unit]
Description={service_name} Streamlit Service
After=network.target network-online.target
Wants=network-online.target

[Service]
User={user}
WorkingDirectory={work_dir}
ExecStart={venv_dir}/bin/streamlit run {entry_file} --server.port {port} --server.address 0.0.0.0 --server.headless true{env_settings}
Restart=always
RestartSec=5

[Install]
WantedBy=multi-user.target
"##
    )
}

pub fn write_service_unit(host: &impl Host, config: &ProvisionConfig) -> CmdResult {
    let venv_dir = config.venv_dir();
    let content = render_service_unit(&UnitSpec::from_config(config, &venv_dir));
    host.write_file(&systemd_unit_path(&config.service_name), &content)
}

pub fn activate_service(host: &impl Host, service_name: &str) -> CmdResult {
    let unit = systemd_unit_name(service_name);
    host.systemctl(&["daemon-reload"])?;
    host.systemctl(&["enable", &unit, "--quiet"])?;
    host.systemctl(&["restart", &unit])?;
    info!("{unit} is enabled and running");
    Ok(())
}
