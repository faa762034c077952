use crate::cli::ConfigCommands;
use crate::error::CliError;
use crate::settings::{default_config_path, persist_api_base, CliSettings};

pub fn run_config(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => {
            let path = default_config_path()?;
            let settings = CliSettings::load()?;
            println!("config file: {}", path.display());
            match settings.api_base_url {
                Some(base) => println!("api_base_url: {base}"),
                None => println!("api_base_url: (unset)"),
            }
            Ok(())
        }
        ConfigCommands::SetApiBase { url } => {
            let path = persist_api_base(&url)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
