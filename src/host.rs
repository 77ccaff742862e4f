//! Every side effect the bootstrap performs on the machine goes through [`Host`],
//! so the provisioning steps can run against the real system, a dry run,
//! or a recording fake in tests.

#[cfg(test)]
pub mod recording;

use crate::packages::PackageManager;
use cmd_lib::*;
use std::path::Path;

pub trait Host {
    fn install_packages(&self, manager: PackageManager, packages: &[&str]) -> CmdResult;

    fn path_exists(&self, path: &str) -> bool;

    fn create_venv(&self, venv_dir: &str) -> CmdResult;

    /// Runs `<venv>/bin/pip install <args>`.
    fn pip_install(&self, venv_dir: &str, args: &[&str]) -> CmdResult;

    /// Replaces the file at `path`, creating parent directories as needed.
    fn write_file(&self, path: &str, content: &str) -> CmdResult;

    /// `nginx -t`
    fn nginx_test(&self) -> CmdResult;

    fn systemctl(&self, args: &[&str]) -> CmdResult;

    fn certbot(&self, domain: &str, email: &str) -> CmdResult;
}

/// Executes commands on the local machine. Needs root.
pub struct SystemHost;

impl Host for SystemHost {
    fn install_packages(&self, manager: PackageManager, packages: &[&str]) -> CmdResult {
        match manager {
            PackageManager::Apt => run_cmd! {
                info "Refreshing apt package index";
                DEBIAN_FRONTEND=noninteractive apt-get update -q;
                info "Installing ${packages:?}";
                DEBIAN_FRONTEND=noninteractive apt-get install -y -q $[packages];
            },
            PackageManager::Dnf => run_cmd! {
                info "Installing ${packages:?}";
                dnf install -y -q $[packages];
            },
        }
    }

    fn path_exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn create_venv(&self, venv_dir: &str) -> CmdResult {
        run_cmd! {
            info "Creating python virtual environment at $venv_dir";
            python3 -m venv $venv_dir;
        }
    }

    fn pip_install(&self, venv_dir: &str, args: &[&str]) -> CmdResult {
        let pip = format!("{venv_dir}/bin/pip");
        run_cmd! {
            info "pip install ${args:?}";
            $pip install -q $[args];
        }
    }

    fn write_file(&self, path: &str, content: &str) -> CmdResult {
        let dir = Path::new(path)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| "/".to_string());
        run_cmd! {
            mkdir -p $dir;
            info "Writing $path";
            echo -n $content > $path;
        }
    }

    fn nginx_test(&self) -> CmdResult {
        run_cmd! {
            info "Validating nginx configuration";
            nginx -t -q;
        }
    }

    fn systemctl(&self, args: &[&str]) -> CmdResult {
        run_cmd!(systemctl $[args])
    }

    fn certbot(&self, domain: &str, email: &str) -> CmdResult {
        run_cmd! {
            info "Requesting TLS certificate for $domain";
            certbot --nginx --non-interactive --agree-tos --redirect -m $email -d $domain;
        }
    }
}

/// Logs what would be done without touching the machine. Every path is
/// reported absent so that all branches show up in the log.
pub struct DryRunHost;

impl Host for DryRunHost {
    fn install_packages(&self, manager: PackageManager, packages: &[&str]) -> CmdResult {
        info!("[dry-run] {manager} install {}", packages.join(" "));
        Ok(())
    }

    fn path_exists(&self, _path: &str) -> bool {
        false
    }

    fn create_venv(&self, venv_dir: &str) -> CmdResult {
        info!("[dry-run] python3 -m venv {venv_dir}");
        Ok(())
    }

    fn pip_install(&self, venv_dir: &str, args: &[&str]) -> CmdResult {
        info!("[dry-run] {venv_dir}/bin/pip install {}", args.join(" "));
        Ok(())
    }

    fn write_file(&self, path: &str, content: &str) -> CmdResult {
        info!("[dry-run] write {path}:\n{content}");
        Ok(())
    }

    fn nginx_test(&self) -> CmdResult {
        info!("[dry-run] nginx -t");
        Ok(())
    }

    fn systemctl(&self, args: &[&str]) -> CmdResult {
        info!("[dry-run] systemctl {}", args.join(" "));
        Ok(())
    }

    fn certbot(&self, domain: &str, email: &str) -> CmdResult {
        info!("[dry-run] certbot --nginx --non-interactive --agree-tos --redirect -m {email} -d {domain}");
        Ok(())
    }
}
