//! Output sinks: where rendered frames go.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::{Result, VizError};

/// Destination for rendered frames.
///
/// Delays are in milliseconds.
pub trait Sink {
    /// Writes raw text, escape sequences included.
    fn write(&mut self, text: &str) -> Result<()>;

    /// Moves the cursor `rows` lines up.
    fn cursor_up(&mut self, rows: u32) -> Result<()>;

    /// Waits `delay` milliseconds.
    fn sleep(&mut self, delay: u64) -> Result<()>;

    /// Finishes the output. Nothing is written after this.
    fn close(&mut self) -> Result<()>;
}

fn cursor_up_sequence(rows: u32) -> Option<String> {
    // ESC[0A moves one line on most terminals
    (rows > 0).then(|| format!("\x1b[{}A", rows))
}

/// Writes straight to a terminal (or anything else that implements [`Write`]).
pub struct TerminalSink<W: Write> {
    out: BufWriter<W>,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::new(out),
        }
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.out
            .into_inner()
            .map_err(|e| VizError::Output(e.into_error()))
    }
}

impl<W: Write> Sink for TerminalSink<W> {
    fn write(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes()).map_err(VizError::Output)
    }

    fn cursor_up(&mut self, rows: u32) -> Result<()> {
        match cursor_up_sequence(rows) {
            Some(seq) => self.write(&seq),
            None => Ok(()),
        }
    }

    fn sleep(&mut self, delay: u64) -> Result<()> {
        // the frame has to be visible while we wait
        self.out.flush().map_err(VizError::Output)?;
        thread::sleep(Duration::from_millis(delay));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.out.flush().map_err(VizError::Output)
    }
}

/// Records the rendering as a POSIX shell script that replays it.
///
/// The script is written to disk on [`Sink::close`] and made executable.
/// Good for showing a picture in a login banner.
pub struct ScriptSink {
    path: PathBuf,
    script: String,
    pending: String,
}

impl ScriptSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            script: String::from("#!/bin/sh\n"),
            pending: String::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The script as generated so far.
    pub fn script(&self) -> &str {
        &self.script
    }

    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        self.script.push_str("printf '");
        for ch in self.pending.chars() {
            match ch {
                '\x1b' => self.script.push_str("\\033"),
                '\n' => self.script.push_str("\\n"),
                '\\' => self.script.push_str("\\\\"),
                '%' => self.script.push_str("%%"),
                '\'' => self.script.push_str("'\\''"),
                _ => self.script.push(ch),
            }
        }
        self.script.push_str("'\n");
        self.pending.clear();
    }
}

impl Sink for ScriptSink {
    fn write(&mut self, text: &str) -> Result<()> {
        self.pending.push_str(text);
        Ok(())
    }

    fn cursor_up(&mut self, rows: u32) -> Result<()> {
        if let Some(seq) = cursor_up_sequence(rows) {
            self.pending.push_str(&seq);
        }
        Ok(())
    }

    fn sleep(&mut self, delay: u64) -> Result<()> {
        self.flush_pending();
        if delay > 0 {
            self.script
                .push_str(&format!("sleep {}.{:03}\n", delay / 1000, delay % 1000));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.flush_pending();
        fs::write(&self.path, &self.script).map_err(VizError::Output)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o755))
                .map_err(VizError::Output)?;
        }

        log::debug!(
            "wrote {} bytes of script to {}",
            self.script.len(),
            self.path.display()
        );
        Ok(())
    }
}
