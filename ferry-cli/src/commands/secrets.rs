//! Secrets command - manage the token file

use clap::{Args, Subcommand};
use ferry_core::Secrets;

/// Manage the secrets file
#[derive(Args, Debug)]
pub struct SecretsArgs {
    #[command(subcommand)]
    pub command: SecretsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SecretsCommand {
    /// Write a template secrets file with owner-only permissions
    Init,
}

impl SecretsArgs {
    /// Execute the secrets command
    pub fn execute(&self) -> anyhow::Result<()> {
        match self.command {
            SecretsCommand::Init => {
                let path = Secrets::create_template()?;
                println!("Created secrets template at {}", path.display());
                println!("Add your GitHub and Zenhub tokens, then run `ferry config` to check them.");
            }
        }
        Ok(())
    }
}
