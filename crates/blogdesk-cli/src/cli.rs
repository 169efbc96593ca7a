//! Command-line argument parsing.

use anyhow::{bail, Context, Result};

pub const USAGE: &str = "\
Usage: blogdesk <command>

Commands:
  login [username]              Sign in (prompts for the password)
  register [username] [email]   Create an account and sign in
  logout                        Sign out and forget the saved session
  status                        Show who is signed in
  open <path>                   Check whether a view may be entered, e.g. /posts/3/edit
  can-edit <author-id>          Check whether you may edit or delete a resource
  help                          Show this message

Set RUST_LOG=debug for diagnostics and BLOGDESK_API_URL to point at another server.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: Option<String> },
    Register { username: Option<String>, email: Option<String> },
    Logout,
    Status,
    Open { path: String },
    CanEdit { author_id: i64 },
    Help,
}

impl Command {
    /// Parse arguments after the program name. No arguments means `status`.
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut args = args.iter().map(String::as_str);
        let command = match args.next() {
            None => return Ok(Command::Status),
            Some(command) => command,
        };

        let parsed = match command {
            "login" => Command::Login {
                username: args.next().map(str::to_string),
            },
            "register" => Command::Register {
                username: args.next().map(str::to_string),
                email: args.next().map(str::to_string),
            },
            "logout" => Command::Logout,
            "status" => Command::Status,
            "open" => Command::Open {
                path: args
                    .next()
                    .context("open needs a path, e.g. `blogdesk open /posts`")?
                    .to_string(),
            },
            "can-edit" => {
                let raw = args
                    .next()
                    .context("can-edit needs the resource's author id")?;
                let author_id = raw
                    .parse()
                    .with_context(|| format!("Invalid author id: {}", raw))?;
                Command::CanEdit { author_id }
            }
            "help" | "-h" | "--help" => Command::Help,
            other => bail!("Unknown command: {}\n\n{}", other, USAGE),
        };

        if let Some(extra) = args.next() {
            bail!("Unexpected argument: {}", extra);
        }
        Ok(parsed)
    }
}
