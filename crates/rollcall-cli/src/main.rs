use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod render;

#[derive(Parser)]
#[command(
    name = "rollcall",
    about = "Classroom attendance client backed by face recognition"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a teacher account
    Signup {
        #[arg(short, long)]
        email: String,
        /// Prompted on stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign in and persist the session
    Login {
        #[arg(short, long)]
        email: String,
        /// Prompted on stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Clear the persisted session
    Logout,
    /// Show the signed-in teacher
    Whoami,
    /// List registered students
    Students {
        /// Filter by name or roll number
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Register a student with a reference photo
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        roll: String,
        /// Reference photo file
        #[arg(long, conflicts_with = "camera")]
        image: Option<PathBuf>,
        /// Capture the reference photo from the camera instead
        #[arg(long)]
        camera: bool,
    },
    /// Photograph the class and mark attendance
    Attend {
        /// Subject / class name (e.g. "Computer Science 101")
        #[arg(short, long)]
        subject: String,
        /// Classroom photo file
        #[arg(long, conflicts_with = "camera")]
        image: Option<PathBuf>,
        /// Capture the classroom photo from the camera instead
        #[arg(long)]
        camera: bool,
    },
    /// List past attendance sessions
    History,
    /// Per-session report with present and absent lists
    Session {
        id: String,
        /// Filter by name or roll number
        #[arg(short, long, default_value = "")]
        query: String,
        /// Show the absent list instead of the present list
        #[arg(long)]
        absent: bool,
    },
    /// Export one session's roll as CSV
    Export {
        id: String,
        /// Output file (default: attendance_<ID>.csv)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Summary statistics, attendance trend and recent sessions
    Dashboard,
    /// Run camera diagnostics
    CameraTest {
        /// Device to probe (default: configured capture device)
        #[arg(long)]
        device: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = config::Config::from_env();

    match cli.command {
        Commands::Signup { email, password } => commands::signup(&config, &email, password).await,
        Commands::Login { email, password } => commands::login(&config, &email, password).await,
        Commands::Logout => commands::logout(),
        Commands::Whoami => commands::whoami(),
        Commands::Students { query } => commands::students(&config, &query).await,
        Commands::Register {
            name,
            roll,
            image,
            camera,
        } => commands::register(&config, &name, &roll, image.as_deref(), camera).await,
        Commands::Attend {
            subject,
            image,
            camera,
        } => commands::attend(&config, &subject, image.as_deref(), camera).await,
        Commands::History => commands::history(&config).await,
        Commands::Session { id, query, absent } => {
            commands::session(&config, &id, &query, absent).await
        }
        Commands::Export { id, out } => commands::export(&config, &id, out).await,
        Commands::Dashboard => commands::dashboard(&config).await,
        Commands::CameraTest { device } => commands::camera_test(&config, device),
    }
}
