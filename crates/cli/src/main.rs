mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pfx", version, about = "Administer realm custom profile fields and user profile data")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration, print resolved paths and open the database
    Doctor,

    /// Manage realms
    #[command(subcommand)]
    Realm(RealmCommands),

    /// Manage users
    #[command(subcommand)]
    User(UserCommands),

    /// Manage a realm's custom profile fields
    #[command(subcommand)]
    Field(FieldCommands),

    /// Read and write a user's custom profile data
    #[command(subcommand)]
    Data(DataCommands),
}

#[derive(Debug, Subcommand)]
pub enum RealmCommands {
    /// Create a realm
    Create {
        name: String,
    },
    /// List realms
    List,
}

#[derive(Debug, Subcommand)]
pub enum UserCommands {
    /// Add a user to a realm
    Add {
        #[arg(long)]
        realm: i64,
        full_name: String,
        /// Create the user already deactivated
        #[arg(long)]
        inactive: bool,
    },
    /// Deactivate a user
    Deactivate {
        id: i64,
    },
    /// List the users of a realm
    List {
        #[arg(long)]
        realm: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum FieldCommands {
    /// List fields in display order
    List {
        #[arg(long)]
        realm: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a field at the end of the display order
    Create(FieldCreateArgs),
    /// Rename a field and replace its hint and configuration
    Update(FieldUpdateArgs),
    /// Delete a field and every value stored for it
    Delete {
        #[arg(long)]
        realm: i64,
        id: i64,
    },
    /// Set the display order; every field id of the realm, once
    Reorder {
        #[arg(long)]
        realm: i64,
        ids: Vec<i64>,
    },
}

#[derive(Debug, Args)]
pub struct FieldCreateArgs {
    #[arg(long)]
    pub realm: i64,

    #[arg(long)]
    pub name: String,

    /// Field type name (e.g. "short_text", "choice") or numeric code
    #[arg(long = "type")]
    pub field_type: String,

    #[arg(long, default_value = "")]
    pub hint: String,

    /// Field configuration as a JSON object
    #[arg(long)]
    pub data: Option<String>,
}

#[derive(Debug, Args)]
pub struct FieldUpdateArgs {
    #[arg(long)]
    pub realm: i64,

    pub id: i64,

    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub hint: String,

    /// Field configuration as a JSON object
    #[arg(long)]
    pub data: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum DataCommands {
    /// Set values as FIELD_ID=VALUE; a JSON array value is a list of user ids
    Set {
        #[arg(long)]
        user: i64,
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Remove values for the given field ids, in order
    Remove {
        #[arg(long)]
        user: i64,
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Show a user's values
    Show {
        #[arg(long)]
        user: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Doctor => cmd::doctor::run(config, profile),
        Commands::Realm(command) => cmd::realm::run(config, profile, command),
        Commands::User(command) => cmd::user::run(config, profile, command),
        Commands::Field(command) => cmd::field::run(config, profile, command),
        Commands::Data(command) => cmd::data::run(config, profile, command),
    }
    logging::flush();
}
