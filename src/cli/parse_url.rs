//! Parse-url command.

use anyhow::Result;
use clap::Parser;

use crate::error::ShipNoteError;
use crate::github::parse_github_url;

/// Parse-url command options.
#[derive(Parser)]
pub struct ParseUrlCommand {
    /// Repository URL to parse.
    #[arg(value_name = "URL")]
    pub url: String,
}

impl ParseUrlCommand {
    /// Prints `owner/repo`, or fails for a non-GitHub URL.
    pub fn execute(self) -> Result<()> {
        let slug = parse_github_url(&self.url).ok_or(ShipNoteError::MalformedUrl(self.url))?;
        println!("{slug}");
        Ok(())
    }
}
