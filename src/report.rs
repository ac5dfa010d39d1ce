use std::{
    fmt::Display,
    fs::File,
    io::{self, Stdout, Write},
    path::Path,
};

/// Writes every report line to the results file and mirrors it to the console.
///
/// The file is flushed after each line, so a run that dies halfway keeps everything
/// reported up to that point.
pub struct Reporter<F: Write, C: Write> {
    file: F,
    console: C,
}

impl Reporter<File, Stdout> {
    /// Creates (or truncates) the results file at `path` and mirrors it to stdout.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(File::create(path)?, io::stdout()))
    }
}

impl<F: Write, C: Write> Reporter<F, C> {
    pub fn new(file: F, console: C) -> Self {
        Self { file, console }
    }

    /// Writes `line` followed by a newline to both outputs.
    pub fn line<D: Display>(&mut self, line: D) -> io::Result<()> {
        writeln!(self.file, "{line}")?;
        self.file.flush()?;
        writeln!(self.console, "{line}")
    }

    pub fn into_inner(self) -> (F, C) {
        (self.file, self.console)
    }
}
