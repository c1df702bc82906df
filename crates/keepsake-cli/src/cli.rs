use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "keepsake",
    about = "Keepsake: manage a local store of shared memories",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML site configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides the configured data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the document or one section of it
    Show(ShowArgs),
    /// List the photo gallery
    Photos,
    /// Add a photo from an image file
    AddPhoto(AddPhotoArgs),
    /// Change a photo's caption or image
    UpdatePhoto(UpdatePhotoArgs),
    /// Delete a photo
    DeletePhoto(DeletePhotoArgs),
    /// Re-save the stored content
    Save,
    /// Erase all content, photos and preferences
    Reset(ResetArgs),
    /// Export the document as JSON
    Export(ExportArgs),
    /// Import a previously exported document
    Import(ImportArgs),
    /// Show or set the theme
    Theme(ThemeArgs),
    /// Show or toggle edit mode
    EditMode(EditModeArgs),
}

#[derive(Args)]
pub struct ShowArgs {
    /// Section key, e.g. `homepage` or `bucketList`
    pub section: Option<String>,
}

#[derive(Args)]
pub struct AddPhotoArgs {
    pub path: PathBuf,
    #[arg(short, long, default_value = "")]
    pub caption: String,
}

#[derive(Args)]
pub struct UpdatePhotoArgs {
    /// Gallery position, newest first
    pub index: usize,
    /// New caption; keeps the current one when omitted
    #[arg(short, long)]
    pub caption: Option<String>,
    /// Replacement image file
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct DeletePhotoArgs {
    pub index: usize,
}

#[derive(Args)]
pub struct ResetArgs {
    /// Confirm erasing everything
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file; stdout when omitted
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct ImportArgs {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct ThemeArgs {
    pub name: Option<String>,
}

#[derive(Args)]
pub struct EditModeArgs {
    pub state: Option<Toggle>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Toggle {
    On,
    Off,
}
