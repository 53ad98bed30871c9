use std::path::PathBuf;

use bv_core::FileLocation;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "blobvault")]
#[command(about = "Store and retrieve files through the configured storage backend")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: <config dir>/blobvault/config.toml)
    #[arg(long, global = true, env = "BLOBVAULT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct LocationArgs {
    /// Logical grouping of the file
    #[arg(long, short)]
    pub bucket: String,

    /// File name within the bucket
    #[arg(long, short)]
    pub name: String,
}

impl LocationArgs {
    pub fn location(&self) -> FileLocation {
        FileLocation::new(self.bucket.clone(), self.name.clone())
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a local file, replacing any previous content at the location
    Store {
        #[command(flatten)]
        location: LocationArgs,
        /// Local file to upload
        file: PathBuf,
    },
    /// Write the stored content to a local path
    Download {
        #[command(flatten)]
        location: LocationArgs,
        /// Destination path; parent directories are created
        target: PathBuf,
    },
    /// Print metadata of a stored file as JSON
    Meta {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Delete files of a bucket not modified within the retention period
    Clean {
        #[arg(long, short)]
        bucket: String,
        /// Retention period in days
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// Create the backing table of the database backend if it is missing
    InitSchema,
}
