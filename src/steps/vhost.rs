//! Apache virtual-host step
//!
//! Mutates the Apache config in one pass: forces the run-as User/Group
//! directives, uncomments the vhosts include, then appends the rendered
//! virtual-host block unless a `ServerName` entry for the target already
//! exists. The first two substitutions run on every invocation, before the
//! presence check for the host block.

use crate::ProvisionError;
use crate::config::ProvisionConfig;
use crate::system::SystemPaths;
use crate::textfile::LineFile;
use minijinja::{Environment, context};
use std::path::Path;
use tracing::{debug, info};

const VHOSTS_INCLUDE: &str = "Include conf/extra/httpd-vhosts.conf";

const VHOST_TEMPLATE: &str = r#"<VirtualHost *:80>
    ServerName {{ name }}.local
    DocumentRoot "{{ doc_root }}"
    <Directory "{{ doc_root }}">
        Options Indexes FollowSymLinks
        AllowOverride All
        Require all granted
    </Directory>
</VirtualHost>"#;

pub async fn run(
    config: &ProvisionConfig,
    paths: &SystemPaths,
    name: &str,
    app_dir: &Path,
) -> Result<(), ProvisionError> {
    let mut conf = LineFile::open(paths.apache_conf()).await?;

    // Global substitutions apply on every run, before the host block check
    conf.replace_prefixed("User ", &format!("User {}", config.apache_run_user));
    conf.replace_prefixed("Group ", &format!("Group {}", config.apache_run_group));
    if conf.uncomment('#', VHOSTS_INCLUDE) {
        debug!("Enabled the vhosts include");
    }

    let server_name = format!("ServerName {name}.local");
    if conf.contains(&server_name) {
        info!("Virtual host for {}.local already registered", name);
    } else {
        let block = render_vhost(name, app_dir)?;
        conf.append("");
        conf.append(&block);
        info!("Registered virtual host {}.local", name);
    }

    if conf.is_dirty() {
        conf.save().await?;
    }
    Ok(())
}

/// Render the virtual-host stanza for the target name and document root
pub fn render_vhost(name: &str, app_dir: &Path) -> Result<String, ProvisionError> {
    // Apache accepts forward slashes in paths on every platform
    let doc_root = app_dir.join("public").display().to_string().replace('\\', "/");

    let mut env = Environment::new();
    env.add_template("vhost", VHOST_TEMPLATE)
        .map_err(|e| ProvisionError::InvalidData(format!("vhost template parse error: {e}")))?;
    let template = env
        .get_template("vhost")
        .map_err(|e| ProvisionError::InvalidData(format!("vhost template error: {e}")))?;
    template
        .render(context! { name => name, doc_root => doc_root })
        .map_err(|e| ProvisionError::InvalidData(format!("vhost template render error: {e}")))
}
