use {anyhow::Result, clap::Subcommand};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (file + env overrides) as TOML.
    Show,
    /// Print the path of the config file in use.
    Path,
    /// Parse the config file and report errors.
    Check,
}

pub fn handle_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = parley_config::discover_and_load();
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        },
        ConfigAction::Path => {
            println!("{}", parley_config::find_or_default_config_path().display());
            Ok(())
        },
        ConfigAction::Check => check(),
    }
}

fn check() -> Result<()> {
    let path = parley_config::find_or_default_config_path();
    if !path.exists() {
        eprintln!("No config file found at {}; defaults apply.", path.display());
        return Ok(());
    }

    eprintln!("Checking {}", path.display());
    match parley_config::load_config(&path) {
        Ok(_) => {
            eprintln!("No issues found.");
            Ok(())
        },
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        },
    }
}
