pub const NGINX_CONF_DIR: &str = "/etc/nginx/conf.d/";
pub const SYSTEMD_UNIT_DIR: &str = "/etc/systemd/system/";

pub const FRAMEWORK_PACKAGE: &str = "streamlit";
pub const DEPENDENCY_MANIFEST: &str = "requirements.txt";
pub const VENV_DIR_NAME: &str = "venv";

pub const PROXY_LISTEN_PORT: u16 = 80;
pub const HTTPS_PORT: u16 = 443;
pub const UPSTREAM_HOST: &str = "127.0.0.1";

pub fn nginx_conf_path(service_name: &str) -> String {
    format!("{NGINX_CONF_DIR}{service_name}.conf")
}

pub fn systemd_unit_name(service_name: &str) -> String {
    format!("{service_name}.service")
}

pub fn systemd_unit_path(service_name: &str) -> String {
    format!("{SYSTEMD_UNIT_DIR}{}", systemd_unit_name(service_name))
}
