use crate::host::Host;
use cmd_lib::*;
use serde::Deserialize;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PackageManager {
    #[default]
    Apt,
    Dnf,
}

impl PackageManager {
    /// Python with venv/pip support, the proxy, the certificate client and git.
    pub fn system_packages(self) -> &'static [&'static str] {
        match self {
            PackageManager::Apt => &[
                "python3",
                "python3-venv",
                "python3-pip",
                "nginx",
                "certbot",
                "python3-certbot-nginx",
                "git",
            ],
            PackageManager::Dnf => &[
                "python3",
                "python3-pip",
                "nginx",
                "certbot",
                "python3-certbot-nginx",
                "git",
            ],
        }
    }
}

pub fn install_packages(host: &impl Host, manager: PackageManager) -> CmdResult {
    let packages = manager.system_packages();
    info!("Installing {} system packages with {manager}", packages.len());
    host.install_packages(manager, packages)
}
