//! Command line of the `anime-service` binary.

use clap::{Parser, Subcommand};

/// Anime CRUD service with HTTP Basic authentication
#[derive(Parser, Debug)]
#[command(name = "anime-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Defaults to `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run migrations and start the HTTP server
    Serve,

    /// Print the Argon2 PHC hash of a password, for seeding `custom_user` by hand
    HashPassword {
        password: String,
    },

    /// Insert a user into `custom_user`, hashing the given password
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long, env = "ANIME_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: String,
        /// Comma-separated, e.g. ROLE_USER,ROLE_ADMIN
        #[arg(long, default_value = "ROLE_USER")]
        authorities: String,
    },
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}
