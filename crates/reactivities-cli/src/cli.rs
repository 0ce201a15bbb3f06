use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "reactivities")]
#[command(about = "Browse and manage Reactivities activities from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the Reactivities API (overrides env and config file)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session token
    Logout,
    /// Show who the stored token belongs to
    Whoami,
    /// Resolve a client route, e.g. `/activities/123`
    Open {
        /// Route path, optionally with a query string
        path: String,
    },
    /// Complete email verification from an emailed link
    Verify {
        /// Full link or its query string (`token=...&email=...`)
        link: String,
    },
    /// Ask for a new verification email
    Resend {
        #[arg(long)]
        email: String,
    },
    /// Create or edit activities
    Activity {
        #[command(subcommand)]
        command: ActivityCommands,
    },
    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ActivityCommands {
    /// Create a new activity
    Create {
        #[command(flatten)]
        fields: ActivityFields,
    },
    /// Edit an existing activity
    Edit {
        /// Activity ID
        id: String,
        #[command(flatten)]
        fields: ActivityFields,
    },
}

/// Field values to write into the form. Omitted fields keep their value.
#[derive(Args, Debug, Clone, Default)]
pub struct ActivityFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// One of drinks, culture, film, food, music, travel
    #[arg(long)]
    pub category: Option<String>,
    /// Date as YYYY-MM-DD
    #[arg(long)]
    pub date: Option<String>,
    /// Time as HH:MM
    #[arg(long)]
    pub time: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub venue: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Persist the API base URL
    SetApiUrl {
        url: String,
    },
    /// Print the resolved API base URL
    Show,
}
