use crate::export::ExportFormat;
use crate::models::identity::Role;
use crate::models::vehicle::VehicleStatus;
use clap::{Parser, Subcommand};

/// Command-line interface definition for officina
/// CLI application to run a small workshop: vehicles and timed work sessions
#[derive(Parser)]
#[command(
    name = "officina",
    version = env!("CARGO_PKG_VERSION"),
    about = "Workshop management CLI: track vehicles and time operator work sessions using SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Act as this user (overrides OFFICINA_USER and the config file)
    #[arg(global = true, long = "user")]
    pub user: Option<String>,

    /// Role of the acting user
    #[arg(global = true, long = "role", value_enum)]
    pub role: Option<Role>,

    /// Print results as JSON instead of tables
    #[arg(global = true, long = "json")]
    pub json: bool,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print or manage the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Manage vehicles
    Car {
        #[command(subcommand)]
        action: CarCommand,
    },

    /// Start, stop and list work sessions
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },

    /// Create a backup copy of the database
    Backup {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long)]
        compress: bool,

        #[arg(long, short = 'f', help = "Overwrite FILE without asking")]
        force: bool,
    },

    /// Export work sessions
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long, value_name = "ID", help = "Only the sessions of this car")]
        car: Option<i64>,

        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum CarCommand {
    /// Add a vehicle to the workshop
    Add {
        #[arg(long)]
        model: String,

        #[arg(long)]
        plate: String,

        #[arg(long, help = "Work to be done on the car")]
        lavorazioni: Option<String>,

        #[arg(long)]
        note: Option<String>,

        #[arg(long, help = "Photos have been taken")]
        photo: bool,

        #[arg(long = "partial-hours")]
        partial_hours: Option<String>,
    },

    /// List vehicles (default: the workshop, i.e. not completed)
    List {
        #[arg(long, conflicts_with = "all", help = "Show completed vehicles only")]
        archive: bool,

        #[arg(long, help = "Show every vehicle")]
        all: bool,
    },

    /// Show one vehicle with its work sessions
    Show { id: i64 },

    /// Edit fields of a vehicle
    Edit {
        id: i64,

        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        plate: Option<String>,

        #[arg(long, value_enum)]
        status: Option<VehicleStatus>,

        #[arg(long)]
        lavorazioni: Option<String>,

        #[arg(long)]
        note: Option<String>,

        #[arg(long)]
        photo: Option<bool>,

        #[arg(long = "partial-hours")]
        partial_hours: Option<String>,

        #[arg(long = "total-hours")]
        total_hours: Option<String>,
    },

    /// Mark a vehicle as completed (moves it to the archive)
    Complete { id: i64 },

    /// Bring a completed vehicle back to the workshop
    Restore { id: i64 },

    /// Delete a vehicle (admin only)
    Del {
        id: i64,

        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },

    /// Recompute total hours from the work sessions
    Hours { id: i64 },
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Start working on a car (no-op if already started)
    Start { car_id: i64, operator: String },

    /// Stop working on a car
    Stop { car_id: i64, operator: String },

    /// Sessions currently open on a car
    Active { car_id: i64 },

    /// All sessions of a car, most recent first
    List { car_id: i64 },
}
