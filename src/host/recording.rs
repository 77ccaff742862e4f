use super::Host;
use crate::packages::PackageManager;
use cmd_lib::CmdResult;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    InstallPackages {
        manager: PackageManager,
        packages: Vec<String>,
    },
    CreateVenv(String),
    PipInstall(Vec<String>),
    WriteFile(String),
    NginxTest,
    Systemctl(Vec<String>),
    Certbot {
        domain: String,
        email: String,
    },
}

/// Records every host action in order. Paths listed in `existing` (plus any
/// venv it creates) are reported as present.
#[derive(Default)]
pub struct RecordingHost {
    pub existing: RefCell<BTreeSet<String>>,
    pub fail_package_install: bool,
    pub fail_nginx_test: bool,
    pub actions: RefCell<Vec<Action>>,
    pub files: RefCell<BTreeMap<String, String>>,
}

impl RecordingHost {
    pub fn with_existing(paths: &[&str]) -> Self {
        let host = Self::default();
        host.existing
            .borrow_mut()
            .extend(paths.iter().map(|p| p.to_string()));
        host
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.borrow().clone()
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }

    pub fn pip_installs(&self) -> Vec<Vec<String>> {
        self.actions
            .borrow()
            .iter()
            .filter_map(|a| match a {
                Action::PipInstall(args) => Some(args.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn systemctl_calls(&self) -> Vec<String> {
        self.actions
            .borrow()
            .iter()
            .filter_map(|a| match a {
                Action::Systemctl(args) => Some(args.join(" ")),
                _ => None,
            })
            .collect()
    }

    pub fn certbot_called(&self) -> bool {
        self.actions
            .borrow()
            .iter()
            .any(|a| matches!(a, Action::Certbot { .. }))
    }

    fn record(&self, action: Action) {
        self.actions.borrow_mut().push(action);
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

impl Host for RecordingHost {
    fn install_packages(&self, manager: PackageManager, packages: &[&str]) -> CmdResult {
        self.record(Action::InstallPackages {
            manager,
            packages: owned(packages),
        });
        if self.fail_package_install {
            return Err(Error::other("package install exited with status 100"));
        }
        Ok(())
    }

    fn path_exists(&self, path: &str) -> bool {
        self.existing.borrow().contains(path)
    }

    fn create_venv(&self, venv_dir: &str) -> CmdResult {
        self.record(Action::CreateVenv(venv_dir.to_string()));
        self.existing.borrow_mut().insert(venv_dir.to_string());
        Ok(())
    }

    fn pip_install(&self, _venv_dir: &str, args: &[&str]) -> CmdResult {
        self.record(Action::PipInstall(owned(args)));
        Ok(())
    }

    fn write_file(&self, path: &str, content: &str) -> CmdResult {
        self.record(Action::WriteFile(path.to_string()));
        self.files
            .borrow_mut()
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    fn nginx_test(&self) -> CmdResult {
        self.record(Action::NginxTest);
        if self.fail_nginx_test {
            return Err(Error::other("nginx: configuration file test failed"));
        }
        Ok(())
    }

    fn systemctl(&self, args: &[&str]) -> CmdResult {
        self.record(Action::Systemctl(owned(args)));
        Ok(())
    }

    fn certbot(&self, domain: &str, email: &str) -> CmdResult {
        self.record(Action::Certbot {
            domain: domain.to_string(),
            email: email.to_string(),
        });
        Ok(())
    }
}
