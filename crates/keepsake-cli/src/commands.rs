use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use keepsake_core::{Keepsake, SiteConfig};
use keepsake_store::{FileObjectStore, FilePreferences};
use keepsake_types::{GalleryEntry, Section};

use crate::cli::*;

type LocalKeepsake = Keepsake<FileObjectStore, FilePreferences>;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = SiteConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let mut keepsake = Keepsake::open(config)
        .await
        .context("cannot open the local store")?;
    let format = cli.format;

    match cli.command {
        Command::Show(args) => cmd_show(&mut keepsake, args, format).await,
        Command::Photos => cmd_photos(&mut keepsake, format).await,
        Command::AddPhoto(args) => cmd_add_photo(&mut keepsake, args).await,
        Command::UpdatePhoto(args) => cmd_update_photo(&mut keepsake, args).await,
        Command::DeletePhoto(args) => cmd_delete_photo(&mut keepsake, args).await,
        Command::Save => cmd_save(&mut keepsake).await,
        Command::Reset(args) => cmd_reset(&mut keepsake, args).await,
        Command::Export(args) => cmd_export(&mut keepsake, args).await,
        Command::Import(args) => cmd_import(&mut keepsake, args).await,
        Command::Theme(args) => cmd_theme(&keepsake, args),
        Command::EditMode(args) => cmd_edit_mode(&keepsake, args),
    }
}

async fn cmd_show(ks: &mut LocalKeepsake, args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    ks.load().await?;
    let document = ks.document().to_value()?;

    let Some(key) = args.section else {
        if format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&document)?);
            return Ok(());
        }
        if let Some(name) = &ks.document().display_name {
            println!("Keepsake for {}", name.bold());
        }
        for section in Section::ALL {
            let value = &document[section.key()];
            let size = match value.as_array() {
                Some(items) => format!("{} entries", items.len()),
                None => "section".to_string(),
            };
            println!("  {:<16} {}", section.key().cyan(), size.dimmed());
        }
        return Ok(());
    };

    let Some(section) = Section::from_key(&key) else {
        let known: Vec<_> = Section::ALL.iter().map(Section::key).collect();
        bail!("unknown section '{key}' (expected one of: {})", known.join(", "));
    };
    println!("{}", serde_json::to_string_pretty(&document[section.key()])?);
    Ok(())
}

async fn cmd_photos(ks: &mut LocalKeepsake, format: OutputFormat) -> anyhow::Result<()> {
    ks.load().await?;
    let gallery = &ks.document().photo_gallery;
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(gallery)?);
        return Ok(());
    }
    if gallery.is_empty() {
        println!("No photos yet. Use {} to add one.", "keepsake add-photo".bold());
        return Ok(());
    }
    for (index, entry) in gallery.iter().enumerate() {
        println!("{}", describe(ks, index, entry));
    }
    Ok(())
}

fn describe(ks: &LocalKeepsake, index: usize, entry: &GalleryEntry) -> String {
    let id = entry
        .id
        .map(|id| format!("#{id}"))
        .unwrap_or_else(|| "-".into());
    let source = match ks.resolve_image(&entry.image) {
        Some(blob) => format!("stored {} ({} KiB)", blob.mime, blob.len().div_ceil(1024)),
        None => entry.image.clone(),
    };
    format!(
        "{:>3}  {:<5} {}  {}",
        index,
        id.yellow(),
        entry.caption.as_deref().unwrap_or(""),
        source.dimmed()
    )
}

async fn cmd_add_photo(ks: &mut LocalKeepsake, args: AddPhotoArgs) -> anyhow::Result<()> {
    let bytes = read_file(&args.path)?;
    ks.load().await?;
    let id = ks.add_photo(&bytes, &args.caption).await?;
    println!("{} Added photo {}", "✓".green().bold(), format!("#{id}").yellow());
    Ok(())
}

async fn cmd_update_photo(ks: &mut LocalKeepsake, args: UpdatePhotoArgs) -> anyhow::Result<()> {
    let bytes = args.file.as_deref().map(read_file).transpose()?;
    ks.load().await?;
    let caption = match args.caption {
        Some(caption) => caption,
        None => ks
            .document()
            .photo_gallery
            .get(args.index)
            .and_then(|e| e.caption.clone())
            .unwrap_or_default(),
    };
    ks.update_photo(args.index, &caption, bytes.as_deref()).await?;
    println!("{} Updated photo {}", "✓".green().bold(), args.index);
    Ok(())
}

async fn cmd_delete_photo(ks: &mut LocalKeepsake, args: DeletePhotoArgs) -> anyhow::Result<()> {
    ks.load().await?;
    let entry = ks.delete_photo(args.index).await?;
    println!(
        "{} Deleted photo {}",
        "✓".green().bold(),
        entry.caption.as_deref().unwrap_or(&entry.image)
    );
    Ok(())
}

async fn cmd_save(ks: &mut LocalKeepsake) -> anyhow::Result<()> {
    ks.load().await?;
    let outcome = ks.save(false).await;
    if !outcome.success {
        bail!("save failed: {}", outcome.error.unwrap_or_default());
    }
    println!("{} Changes saved to device.", "✓".green().bold());
    Ok(())
}

async fn cmd_reset(ks: &mut LocalKeepsake, args: ResetArgs) -> anyhow::Result<()> {
    if !args.yes {
        bail!("this erases all content, photos and preferences; pass --yes to confirm");
    }
    ks.reset_all().await?;
    println!("{} All data erased. Defaults return on next load.", "✓".green().bold());
    Ok(())
}

async fn cmd_export(ks: &mut LocalKeepsake, args: ExportArgs) -> anyhow::Result<()> {
    ks.load().await?;
    let json = ks.export_json()?;
    match args.path {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("cannot write {}", path.display()))?;
            println!("{} Exported to {}", "✓".green().bold(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

async fn cmd_import(ks: &mut LocalKeepsake, args: ImportArgs) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&args.path)
        .with_context(|| format!("cannot read {}", args.path.display()))?;
    ks.load().await?;
    ks.import_json(&json)?;
    let outcome = ks.save(true).await;
    if !outcome.success {
        bail!("import was not saved: {}", outcome.error.unwrap_or_default());
    }
    println!("{} Imported {}", "✓".green().bold(), args.path.display());
    Ok(())
}

fn cmd_theme(ks: &LocalKeepsake, args: ThemeArgs) -> anyhow::Result<()> {
    match args.name {
        Some(name) => {
            ks.set_theme(&name)?;
            println!("Theme set to {}", name.bold());
        }
        None => println!("{}", ks.theme()?),
    }
    Ok(())
}

fn cmd_edit_mode(ks: &LocalKeepsake, args: EditModeArgs) -> anyhow::Result<()> {
    match args.state {
        Some(state) => {
            let on = state == Toggle::On;
            ks.set_edit_mode(on)?;
            println!("Edit mode {}", if on { "on".green() } else { "off".yellow() });
        }
        None => println!("{}", if ks.edit_mode()? { "on" } else { "off" }),
    }
    Ok(())
}

fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))
}
