use profilefields_core::config::{ConfigLoader, default_config_path};
use profilefields_core::store::{ProfileStore, SCHEMA_VERSION};
use std::path::Path;

pub fn run(config: Option<&Path>, profile: Option<&str>) {
    let rc = match ConfigLoader::load(config, profile) {
        Ok(rc) => rc,
        Err(e) => {
            println!("FAIL pfx doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    };
    crate::logging::init(&rc);

    println!("OK   pfx doctor");
    println!(
        "path: {}",
        config.map_or_else(
            || default_config_path().display().to_string(),
            |p| p.display().to_string()
        )
    );
    println!("profile: {}", rc.active_profile);
    println!("database: {}", rc.database.display());
    match &rc.events_file {
        Some(path) => println!("events_file: {}", path.display()),
        None => println!("events_file: (none)"),
    }
    println!("logging.level: {}", rc.logging.level);

    if let Some(parent) = rc.database.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            println!("FAIL cannot create {}: {e}", parent.display());
            crate::logging::flush();
            std::process::exit(1);
        }
    }
    match ProfileStore::open(&rc.database) {
        Ok(_) => println!("schema_version: {}", SCHEMA_VERSION),
        Err(e) => {
            println!("FAIL cannot open database: {e}");
            crate::logging::flush();
            std::process::exit(1);
        }
    }
}
