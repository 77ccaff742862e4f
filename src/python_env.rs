use crate::common::FRAMEWORK_PACKAGE;
use crate::config::ProvisionConfig;
use crate::host::Host;
use cmd_lib::*;

pub fn ensure_virtual_environment(host: &impl Host, venv_dir: &str) -> CmdResult {
    if host.path_exists(venv_dir) {
        info!("Virtual environment {venv_dir} already exists, skipping creation");
        return Ok(());
    }
    host.create_venv(venv_dir)
}

pub fn install_dependencies(host: &impl Host, config: &ProvisionConfig) -> CmdResult {
    let venv_dir = config.venv_dir();
    host.pip_install(&venv_dir, &["--upgrade", "pip"])?;
    host.pip_install(&venv_dir, &[FRAMEWORK_PACKAGE])?;

    let manifest = config.manifest_path();
    if host.path_exists(&manifest) {
        info!("Installing application dependencies from {manifest}");
        host.pip_install(&venv_dir, &["-r", &manifest])?;
    } else {
        info!("No {manifest} found, only {FRAMEWORK_PACKAGE} is installed");
    }
    Ok(())
}
