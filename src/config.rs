use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

const DEFAULT_EMAIL_API_BASE: &str = "https://api.resend.com";
const DEFAULT_API_KEY_ENV: &str = "RESEND_API_KEY";
const DEFAULT_EMAIL_TIMEOUT_SECS: u64 = 10;

#[derive(Deserialize, Clone)]
pub struct Site {
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_logo")]
    pub logo: String,
    #[serde(default)]
    pub same_as: Vec<String>,
    /// Internal address receiving contact and subscription notifications
    pub contact_inbox: String,
    pub contact_sender: String,
    pub newsletter_sender: String,
}

impl Site {
    /// Base url without the trailing slash, ready to have a path appended.
    pub fn url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn default_logo() -> String {
    "/public/agency.png".to_string()
}

#[derive(Deserialize, Clone)]
pub struct Locales {
    pub supported: Vec<String>,
    pub default: String,
    #[serde(default = "default_detect_from_browser")]
    pub detect_from_browser: bool,
    #[serde(default = "default_exempt_prefixes")]
    pub exempt_prefixes: Vec<String>,
}

fn default_detect_from_browser() -> bool {
    true
}

fn default_exempt_prefixes() -> Vec<String> {
    vec!["api".to_string(), "public".to_string(), "_assets".to_string()]
}

#[derive(Deserialize)]
pub struct Paths {
    pub blog_data: PathBuf,
    pub work_data: PathBuf,
    pub public_dir: PathBuf,
}

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize, Default)]
pub struct Email {
    pub api_base: Option<String>,
    /// Inline key. Prefer `api_key_env` outside of local setups.
    pub api_key: Option<String>,
    pub api_key_env: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Email {
    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_EMAIL_API_BASE)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_EMAIL_TIMEOUT_SECS)
    }

    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }

        let var_name = self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV);
        env::var(var_name).ok().filter(|key| !key.is_empty())
    }
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Config {
    pub site: Site,
    pub locales: Locales,
    pub paths: Paths,
    pub server: Server,
    #[serde(default)]
    pub email: Email,
    pub log: Option<Log>,
}

fn parse_path(path: PathBuf) -> io::Result<PathBuf> {
    if !path.starts_with("${exe_dir}") {
        return Ok(path);
    }

    let cur_exe = env::current_exe()?;
    let exe_dir = cur_exe.parent()
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Executable has no parent directory"))?;
    let str_path = path.to_string_lossy();
    Ok(PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy())))
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        blog_data: parse_path(cfg.paths.blog_data)?,
        work_data: parse_path(cfg.paths.work_data)?,
        public_dir: parse_path(cfg.paths.public_dir)?,
    };

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}

#[cfg(test)]
mod tests {
    use crate::test_data::CONFIG_DATA;

    use super::*;

    #[test]
    fn test_parse_config() {
        let cfg = parse_config(CONFIG_DATA).unwrap();
        assert_eq!(cfg.site.name, "Grizzly Agency");
        assert_eq!(cfg.site.url(), "https://grizzly-agency.com");
        assert_eq!(cfg.locales.supported, ["en", "de"]);
        assert_eq!(cfg.locales.default, "en");
        assert!(cfg.locales.detect_from_browser);
        assert_eq!(cfg.locales.exempt_prefixes, ["api", "public", "_assets"]);
        assert_eq!(cfg.server.port, 8001);
        assert_eq!(cfg.paths.blog_data, PathBuf::from("data/blog.toml"));
        assert!(cfg.log.is_none());
    }

    #[test]
    fn test_email_defaults() {
        let cfg = parse_config(CONFIG_DATA).unwrap();
        assert_eq!(cfg.email.api_base(), "https://api.resend.com");
        assert_eq!(cfg.email.timeout_secs(), 10);

        let email = Email {
            api_key: Some("re_inline".to_string()),
            ..Default::default()
        };
        assert_eq!(email.resolve_api_key(), Some("re_inline".to_string()));
    }

    #[test]
    fn test_exe_dir_expansion() {
        let path = parse_path(PathBuf::from("${exe_dir}/data/blog.toml")).unwrap();
        assert!(!path.to_string_lossy().contains("${exe_dir}"));
        assert!(path.ends_with("data/blog.toml"));

        let path = parse_path(PathBuf::from("data/blog.toml")).unwrap();
        assert_eq!(path, PathBuf::from("data/blog.toml"));
    }

    #[test]
    fn test_missing_section() {
        let err = parse_config("[server]\naddress = \"0.0.0.0\"\nport = 1\n").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_bundled_config() {
        let cfg = read_config(&Path::new(env!("CARGO_MANIFEST_DIR")).join("grizzly.toml")).unwrap();
        assert_eq!(cfg.site.same_as.len(), 3);
        assert_eq!(cfg.email.api_key_env.as_deref(), Some("RESEND_API_KEY"));
        let log = cfg.log.unwrap();
        assert_eq!(log.level, LogLevel::Info);
        assert!(log.location.is_none());
    }
}
