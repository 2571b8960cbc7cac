pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::types::Role;

#[derive(Parser)]
#[command(name = "schoolmate-admin")]
#[command(about = "SchoolMate administration - database setup and user accounts")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply the SchoolMate schema to DATABASE_URL")]
    InitDb,

    #[command(about = "Create a user account")]
    AddUser {
        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,

        #[arg(long, help = "Admin, Teacher, Substitute, Student or Parent")]
        role: Role,
    },

    #[command(about = "Print the stored hash for a password")]
    HashPassword { password: String },

    #[command(about = "Check database connectivity")]
    Check,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::InitDb => commands::db::init_db(output_format).await,
        Commands::Check => commands::db::check(output_format).await,
        Commands::AddUser {
            username,
            password,
            role,
        } => commands::user::add_user(&username, &password, role, output_format).await,
        Commands::HashPassword { password } => commands::user::hash_password(&password, output_format),
    }
}
