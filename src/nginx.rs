use crate::common::*;
use crate::config::ProvisionConfig;
use crate::host::Host;
use cmd_lib::*;

pub fn render_proxy_config(domain: &str, upstream_port: u16) -> String {
    format!(
        r##"server {{
    listen {PROXY_LISTEN_PORT};
    server_name {domain};

    location / {{
        proxy_pass http://{UPSTREAM_HOST}:{upstream_port};
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;

        # streamlit talks to the browser over a websocket
        proxy_http_version 1.1;
        proxy_set_header Upgrade $http_upgrade;
        proxy_set_header Connection "upgrade";
        proxy_read_timeout 86400;
    }}
}}
"##
    )
}

pub fn write_proxy_config(host: &impl Host, config: &ProvisionConfig) -> CmdResult {
    let conf_path = nginx_conf_path(&config.service_name);
    let content = render_proxy_config(&config.domain, config.port);
    host.write_file(&conf_path, &content)
}

/// Restarts nginx only once `nginx -t` accepts the configuration.
pub fn reload_proxy(host: &impl Host) -> CmdResult {
    if let Err(e) = host.nginx_test() {
        error!("nginx rejected the rendered configuration, leaving the running proxy untouched");
        return Err(e);
    }
    host.systemctl(&["enable", "nginx", "--quiet"])?;
    host.systemctl(&["restart", "nginx"])?;
    info!("nginx reloaded");
    Ok(())
}
