//! Tests for the file-mutating provisioning steps

use devstack_init::config::ProvisionConfig;
use devstack_init::github::Credentials;
use devstack_init::steps::{composer, env_file, hosts, npm_registry, stack, vhost};
use devstack_init::system::SystemPaths;
use devstack_init::validate_target_name;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn test_credentials() -> Credentials {
    Credentials {
        username: "octocat".to_string(),
        token: "gho_testtoken".to_string(),
    }
}

fn write_httpd_conf(paths: &SystemPaths) {
    let conf = paths.apache_conf();
    fs::create_dir_all(conf.parent().unwrap()).unwrap();
    fs::write(
        &conf,
        "ServerRoot \"/xampp/apache\"\n\
         User nobody\n\
         Group nogroup\n\
         #Include conf/extra/httpd-vhosts.conf\n",
    )
    .unwrap();
}

// ==================== Hosts file ====================

/// The loopback entry is appended once, no matter how often the step runs
#[tokio::test]
async fn test_hosts_entry_appended_once() {
    let temp_dir = TempDir::new().unwrap();
    let paths = SystemPaths::with_base(temp_dir.path());
    fs::write(paths.hosts(), "127.0.0.1 localhost\n").unwrap();

    hosts::run(&paths, "demo").await.unwrap();
    hosts::run(&paths, "demo").await.unwrap();

    let content = fs::read_to_string(paths.hosts()).unwrap();
    assert_eq!(content.matches("127.0.0.1 demo.local").count(), 1);
    assert!(content.contains("127.0.0.1 localhost"));
}

/// An existing entry with different spacing is left untouched
#[tokio::test]
async fn test_hosts_existing_variant_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let paths = SystemPaths::with_base(temp_dir.path());
    fs::write(paths.hosts(), "10.0.0.5\tdemo.local\n").unwrap();

    hosts::run(&paths, "demo").await.unwrap();

    let content = fs::read_to_string(paths.hosts()).unwrap();
    assert_eq!(content, "10.0.0.5\tdemo.local\n");
}

// ==================== Virtual host ====================

/// Running twice yields one host block; substitutions always apply
#[tokio::test]
async fn test_vhost_registered_once() {
    let temp_dir = TempDir::new().unwrap();
    let paths = SystemPaths::with_base(temp_dir.path());
    let config = ProvisionConfig::default();
    write_httpd_conf(&paths);
    let app_dir = temp_dir.path().join("demo");

    vhost::run(&config, &paths, "demo", &app_dir).await.unwrap();
    vhost::run(&config, &paths, "demo", &app_dir).await.unwrap();

    let content = fs::read_to_string(paths.apache_conf()).unwrap();
    assert_eq!(content.matches("ServerName demo.local").count(), 1);
    assert_eq!(content.matches("<VirtualHost *:80>").count(), 1);
    assert!(content.contains("User daemon"));
    assert!(content.contains("Group daemon"));
    assert!(!content.contains("#Include conf/extra/httpd-vhosts.conf"));
    assert!(content.contains("Include conf/extra/httpd-vhosts.conf"));
}

/// Run-as and include substitutions apply even when the block pre-exists
#[tokio::test]
async fn test_vhost_substitutions_apply_to_existing_block() {
    let temp_dir = TempDir::new().unwrap();
    let paths = SystemPaths::with_base(temp_dir.path());
    let config = ProvisionConfig::default();
    let conf = paths.apache_conf();
    fs::create_dir_all(conf.parent().unwrap()).unwrap();
    fs::write(
        &conf,
        "User nobody\n\
         Group nogroup\n\
         #Include conf/extra/httpd-vhosts.conf\n\
         <VirtualHost *:80>\n    ServerName demo.local\n</VirtualHost>\n",
    )
    .unwrap();
    let app_dir = temp_dir.path().join("demo");

    vhost::run(&config, &paths, "demo", &app_dir).await.unwrap();

    let content = fs::read_to_string(&conf).unwrap();
    assert_eq!(content.matches("ServerName demo.local").count(), 1);
    assert!(content.contains("User daemon"));
    assert!(content.contains("Group daemon"));
    assert!(!content.contains("#Include"));
}

/// The rendered block points the document root into the clone
#[test]
fn test_vhost_block_document_root() {
    let block = vhost::render_vhost("demo", Path::new("/work/demo")).unwrap();
    assert!(block.contains("ServerName demo.local"));
    assert!(block.contains("DocumentRoot \"/work/demo/public\""));
    assert!(block.starts_with("<VirtualHost *:80>"));
    assert!(block.trim_end().ends_with("</VirtualHost>"));
}

// ==================== npm registry ====================

/// Both .npmrc entries appear exactly once after repeated runs
#[tokio::test]
async fn test_npmrc_entries_appended_once() {
    let temp_dir = TempDir::new().unwrap();
    let paths = SystemPaths::with_base(temp_dir.path());
    let config = ProvisionConfig::default();

    npm_registry::run(&config, &paths, "gho_testtoken").await.unwrap();
    npm_registry::run(&config, &paths, "gho_testtoken").await.unwrap();

    let content = fs::read_to_string(paths.npmrc()).unwrap();
    assert_eq!(
        content
            .matches("@sheets:registry=https://npm.pkg.github.com/")
            .count(),
        1
    );
    assert_eq!(
        content
            .matches("//npm.pkg.github.com/:_authToken=gho_testtoken")
            .count(),
        1
    );
}

/// A pre-existing registry entry with another URL is not rewritten
#[tokio::test]
async fn test_npmrc_stale_entry_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let paths = SystemPaths::with_base(temp_dir.path());
    let config = ProvisionConfig::default();
    fs::write(
        paths.npmrc(),
        "@sheets:registry=https://registry.example.com/\n",
    )
    .unwrap();

    npm_registry::run(&config, &paths, "gho_testtoken").await.unwrap();

    let content = fs::read_to_string(paths.npmrc()).unwrap();
    assert!(content.contains("@sheets:registry=https://registry.example.com/"));
    assert!(!content.contains("@sheets:registry=https://npm.pkg.github.com/"));
    // The token line has no conflicting entry and is still added
    assert!(content.contains("//npm.pkg.github.com/:_authToken=gho_testtoken"));
}

/// Registry URLs reduce to the host/path form used by token keys
#[test]
fn test_registry_host() {
    assert_eq!(
        npm_registry::registry_host("https://npm.pkg.github.com/"),
        "npm.pkg.github.com/"
    );
    assert_eq!(
        npm_registry::registry_host("https://registry.example.com"),
        "registry.example.com/"
    );
}

// ==================== Composer auth ====================

/// auth.json is regenerated wholesale, dropping entries for other hosts
#[tokio::test]
async fn test_composer_auth_overwritten_wholesale() {
    let temp_dir = TempDir::new().unwrap();
    let paths = SystemPaths::with_base(temp_dir.path());
    let config = ProvisionConfig::default();
    let auth_path = paths.composer_auth();
    fs::create_dir_all(auth_path.parent().unwrap()).unwrap();
    fs::write(
        &auth_path,
        r#"{"http-basic":{"old.example.com":{"username":"stale","password":"stale"}}}"#,
    )
    .unwrap();

    composer::write_auth(&config, &paths, &test_credentials())
        .await
        .unwrap();

    let content = fs::read_to_string(&auth_path).unwrap();
    let auth: composer::ComposerAuth = serde_json::from_str(&content).unwrap();
    assert_eq!(auth.http_basic.len(), 1);
    let entry = auth.http_basic.get("repo.packagist.com").unwrap();
    assert_eq!(entry.username, "octocat");
    assert_eq!(entry.password, "gho_testtoken");
}

// ==================== Environment file ====================

/// Absent .env is created from the template with the cookie flag forced
#[tokio::test]
async fn test_env_file_created_from_template() {
    let temp_dir = TempDir::new().unwrap();
    let app_dir = temp_dir.path().to_path_buf();
    fs::write(
        app_dir.join(".env.example"),
        "APP_NAME=Sheets\nSESSION_SECURE_COOKIE=true\n",
    )
    .unwrap();

    env_file::run(&app_dir).await.unwrap();

    let content = fs::read_to_string(app_dir.join(".env")).unwrap();
    assert!(content.contains("APP_NAME=Sheets"));
    assert!(content.contains("SESSION_SECURE_COOKIE=false"));
    assert!(!content.contains("SESSION_SECURE_COOKIE=true"));
}

/// An existing .env is preserved apart from the one patched key
#[tokio::test]
async fn test_env_file_existing_preserved() {
    let temp_dir = TempDir::new().unwrap();
    let app_dir = temp_dir.path().to_path_buf();
    fs::write(app_dir.join(".env.example"), "APP_NAME=Sheets\n").unwrap();
    fs::write(
        app_dir.join(".env"),
        "APP_NAME=Custom\nDB_PASSWORD=secret\nSESSION_SECURE_COOKIE=true\n",
    )
    .unwrap();

    env_file::run(&app_dir).await.unwrap();

    let content = fs::read_to_string(app_dir.join(".env")).unwrap();
    assert!(content.contains("APP_NAME=Custom"));
    assert!(content.contains("DB_PASSWORD=secret"));
    assert!(content.contains("SESSION_SECURE_COOKIE=false"));
}

/// Without a template or target the step fails
#[tokio::test]
async fn test_env_file_missing_template_fails() {
    let temp_dir = TempDir::new().unwrap();
    let result = env_file::run(temp_dir.path()).await;
    assert!(result.is_err());
}

/// A .env without the cookie key is copied verbatim
#[tokio::test]
async fn test_env_file_without_cookie_key() {
    let temp_dir = TempDir::new().unwrap();
    let app_dir = temp_dir.path().to_path_buf();
    fs::write(app_dir.join(".env.example"), "APP_NAME=Sheets\n").unwrap();

    env_file::run(&app_dir).await.unwrap();

    let content = fs::read_to_string(app_dir.join(".env")).unwrap();
    assert_eq!(content, "APP_NAME=Sheets\n");
}

// ==================== php.ini extensions ====================

/// Listed extensions are uncommented; repeat runs change nothing
#[tokio::test]
async fn test_enable_extensions() {
    let temp_dir = TempDir::new().unwrap();
    let ini = temp_dir.path().join("php.ini");
    fs::write(&ini, ";extension=intl\n;extension=zip\nextension=curl\n").unwrap();

    let extensions: Vec<String> = ["curl", "intl", "zip"].map(String::from).to_vec();
    let enabled = stack::enable_extensions(&ini, &extensions).await.unwrap();
    assert_eq!(enabled, ["intl", "zip"]);

    let enabled = stack::enable_extensions(&ini, &extensions).await.unwrap();
    assert!(enabled.is_empty());

    let content = fs::read_to_string(&ini).unwrap();
    assert!(!content.contains(";extension=intl"));
    assert!(!content.contains(";extension=zip"));
}

// ==================== PHP version parsing ====================

/// The version number comes out of the first php -v line
#[test]
fn test_parse_php_version() {
    let output = "PHP 8.2.12 (cli) (built: Oct 26 2023 09:28:00) (ZTS Visual C++ 2019 x64)\nCopyright (c) The PHP Group\n";
    assert_eq!(stack::parse_php_version(output).as_deref(), Some("8.2.12"));
    assert_eq!(stack::parse_php_version("no version here"), None);
}

// ==================== Target name validation ====================

/// DNS-label names pass, separators and edge hyphens fail
#[test]
fn test_validate_target_name() {
    assert!(validate_target_name("sheets").is_ok());
    assert!(validate_target_name("demo-2").is_ok());

    assert!(validate_target_name("").is_err());
    assert!(validate_target_name("has space").is_err());
    assert!(validate_target_name("under_score").is_err());
    assert!(validate_target_name("dots.break.vhosts").is_err());
    assert!(validate_target_name("-leading").is_err());
    assert!(validate_target_name("trailing-").is_err());
    assert!(validate_target_name(&"x".repeat(64)).is_err());
}

// ==================== Full file sequence ====================

/// The file-mutating steps for target "demo" land every expected artifact
#[tokio::test]
async fn test_demo_file_sequence() {
    let temp_dir = TempDir::new().unwrap();
    let paths = SystemPaths::with_base(temp_dir.path());
    let config = ProvisionConfig::default();
    let credentials = test_credentials();

    write_httpd_conf(&paths);
    fs::write(paths.hosts(), "127.0.0.1 localhost\n").unwrap();
    let app_dir = temp_dir.path().join("demo");
    fs::create_dir_all(&app_dir).unwrap();
    fs::write(
        app_dir.join(".env.example"),
        "APP_NAME=Sheets\nSESSION_SECURE_COOKIE=true\n",
    )
    .unwrap();

    composer::write_auth(&config, &paths, &credentials).await.unwrap();
    npm_registry::run(&config, &paths, &credentials.token).await.unwrap();
    vhost::run(&config, &paths, "demo", &app_dir).await.unwrap();
    hosts::run(&paths, "demo").await.unwrap();
    env_file::run(&app_dir).await.unwrap();

    assert!(paths.composer_auth().exists());
    let npmrc = fs::read_to_string(paths.npmrc()).unwrap();
    assert!(npmrc.contains("_authToken=gho_testtoken"));
    let conf = fs::read_to_string(paths.apache_conf()).unwrap();
    assert!(conf.contains("ServerName demo.local"));
    let hosts_content = fs::read_to_string(paths.hosts()).unwrap();
    assert!(hosts_content.contains("127.0.0.1 demo.local"));
    let env = fs::read_to_string(app_dir.join(".env")).unwrap();
    assert!(env.contains("SESSION_SECURE_COOKIE=false"));
}
