use crate::domain::models::OutputTarget;
use crate::infra::file_system::FileSystem;
use anyhow::Context;
#[cfg(feature = "clipboard-support")]
use clipboard::{ClipboardContext, ClipboardProvider};
use crossterm::{
    ExecutableCommand,
    style::{Color, ResetColor, SetForegroundColor},
};
use log::{debug, info};
use std::io::{self, Write};
use std::path::PathBuf;

const PREVIEW_LENGTH: usize = 200;

pub trait OutputWriter {
    fn write(&self, content: &str) -> anyhow::Result<()>;
}

pub struct FileWriter<'a> {
    fs: &'a dyn FileSystem,
    path: PathBuf,
}

impl<'a> FileWriter<'a> {
    pub fn new(fs: &'a dyn FileSystem, path: PathBuf) -> Self {
        Self { fs, path }
    }
}

impl OutputWriter for FileWriter<'_> {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing output to file: {}", self.path.display());
        self.fs
            .write_all_bytes(&self.path, content.as_bytes())
            .with_context(|| format!("cannot write output file {}", self.path.display()))?;
        info!("Output written to file: {}", self.path.display());
        Ok(())
    }
}

pub struct ConsoleWriter;

impl OutputWriter for ConsoleWriter {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing output to console");
        let mut stdout = io::stdout();
        stdout.write_all(content.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(feature = "clipboard-support")]
pub struct ClipboardWriter;

#[cfg(feature = "clipboard-support")]
impl OutputWriter for ClipboardWriter {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing output to clipboard");

        let mut ctx: ClipboardContext = ClipboardProvider::new()
            .map_err(|e| anyhow::anyhow!("Failed to access clipboard: {}", e))?;
        ctx.set_contents(content.to_owned())
            .map_err(|e| anyhow::anyhow!("Failed to copy to clipboard: {}", e))?;

        info!("Output copied to clipboard (size: {} bytes)", content.len());
        Ok(())
    }
}

pub fn create_writer<'a>(
    target: &OutputTarget,
    fs: &'a dyn FileSystem,
) -> anyhow::Result<Box<dyn OutputWriter + 'a>> {
    match target {
        OutputTarget::File(path) => Ok(Box::new(FileWriter::new(fs, path.clone()))),
        OutputTarget::Stdout => Ok(Box::new(ConsoleWriter)),
        #[cfg(feature = "clipboard-support")]
        OutputTarget::Clipboard => Ok(Box::new(ClipboardWriter)),
        #[cfg(not(feature = "clipboard-support"))]
        OutputTarget::Clipboard => {
            anyhow::bail!("clipboard output requires the clipboard-support feature")
        }
    }
}

/// Line printed once the output has been delivered.
pub fn confirmation_message(target: &OutputTarget) -> Option<String> {
    match target {
        OutputTarget::File(path) => Some(format!("Output written to: {}", path.display())),
        OutputTarget::Clipboard => Some("📋 Content copied to clipboard!".to_string()),
        OutputTarget::Stdout => None,
    }
}

/// First characters of `content`, safe on multi-byte text.
pub fn preview(content: &str, length: usize) -> String {
    if content.chars().count() > length {
        let head: String = content.chars().take(length).collect();
        format!("{}...", head)
    } else {
        content.to_string()
    }
}

pub fn write_output(
    content: &str,
    target: &OutputTarget,
    fs: &dyn FileSystem,
) -> anyhow::Result<()> {
    let writer = create_writer(target, fs)?;
    writer.write(content)?;

    let Some(message) = confirmation_message(target) else {
        return Ok(());
    };

    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Green))?;
    writeln!(stdout, "{}", message)?;
    stdout.execute(ResetColor)?;

    if *target == OutputTarget::Clipboard {
        writeln!(stdout, "\nPreview of copied content:\n")?;
        writeln!(stdout, "{}", preview(content, PREVIEW_LENGTH))?;
    }

    Ok(())
}
