use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use grizzly_site::config::{read_config, Config};

use crate::CFG_FILE_NAME;

fn get_config_path() -> Option<PathBuf> {
    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()));
    let cur_dir = env::current_dir().ok();

    [exe_dir, cur_dir, dirs::config_dir().map(|d| d.join("grizzly"))]
        .into_iter()
        .flatten()
        .map(|dir| dir.join(CFG_FILE_NAME))
        .find(|path| path.exists())
}

pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> anyhow::Result<Config> {
    let config_path = cfg_path.or_else(get_config_path)
        .ok_or_else(|| anyhow!("Could not find {}", CFG_FILE_NAME))?;

    println!("Reading config from {}", config_path.display());
    let mut config = read_config(&config_path)
        .with_context(|| format!("Error reading config {}", config_path.display()))?;

    if let Some(ref mut log) = config.log {
        if log.location.is_none() {
            log.location = dirs::cache_dir().map(|d| d.join("grizzly").join("log").join("server.log"));
        }
        match log.location {
            Some(ref location) => println!("Log enabled. Files will be written in {}", location.display()),
            None => println!("Log enabled. No cache dir found, using stdout"),
        }
    } else {
        println!("Log disabled. Using stdout");
    }

    Ok(config)
}
