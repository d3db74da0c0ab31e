use clap::Subcommand;
use wordgate_core::Config;

use crate::common;

#[derive(Subcommand)]
pub enum PinAction {
    /// Change the parent access code (requires the current code)
    Set,
    /// Check an access code
    Verify,
}

pub fn run(action: PinAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PinAction::Set => {
            let mut config = Config::load_or_default();
            common::require_pin(&config)?;
            let new_pin = common::prompt("New PIN (4 digits): ")?;
            config.set_pin(&new_pin)?;
            println!("PIN changed successfully");
        }
        PinAction::Verify => {
            let config = Config::load_or_default();
            let entered = common::prompt("PIN: ")?;
            if config.verify_pin(&entered) {
                println!("ok");
            } else {
                eprintln!("incorrect PIN");
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
