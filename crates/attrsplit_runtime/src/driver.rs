//! The per-file driver.
//!
//! Each file moves through `Parsing → Indexing → Transforming → Printing`.
//! The first failure aborts the run; nothing is written until every file
//! has been rewritten, so an aborted run leaves standard output empty.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, info_span};

use attrsplit_engine::{Refactorer, Report};
use attrsplit_foundation::{Error, ErrorContext, Result, Stage};
use attrsplit_syntax::{File, load_file, load_source, parse_file, print_file};

use crate::config::Config;

/// The rewritten text of one input file.
#[derive(Clone, Debug)]
pub struct FileOutput {
    /// The input path.
    pub path: PathBuf,
    /// The rewritten translation unit.
    pub text: String,
    /// What the rewrite changed.
    pub report: Report,
}

/// Tracks the stage of one file so errors can say where it stopped.
struct FileRun<'p> {
    path: &'p Path,
    stage: Stage,
}

impl<'p> FileRun<'p> {
    const fn new(path: &'p Path) -> Self {
        Self {
            path,
            stage: Stage::Parsing,
        }
    }

    /// Finishes the current stage with `result` and advances on success.
    fn step<T>(&mut self, result: Result<T>) -> Result<T> {
        let value =
            result.map_err(|err| err.with_context(ErrorContext::new(self.path, self.stage)))?;
        self.stage = self.stage.next();
        debug!(stage = %self.stage, "stage entered");
        Ok(value)
    }
}

/// Runs the rewrite over a configured list of files.
#[derive(Clone, Debug)]
pub struct Driver {
    config: Config,
    refactorer: Refactorer,
}

impl Driver {
    /// Creates a driver for a validated configuration.
    ///
    /// # Errors
    /// Returns a configuration error if `config` does not validate.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let refactorer = config.refactorer();
        Ok(Self { config, refactorer })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Rewrites one file read from disk.
    ///
    /// # Errors
    /// Returns the first error raised, with the path and stage attached.
    pub fn process_file(&self, path: &Path) -> Result<FileOutput> {
        let span = info_span!("file", path = %path.display());
        let _enter = span.enter();
        let mut run = FileRun::new(path);
        let file = run.step(load_file(path))?;
        self.rewrite(run, file)
    }

    /// Rewrites `source` as if it had been read from `path`.
    ///
    /// # Errors
    /// Returns the first error raised, with the path and stage attached.
    pub fn process_source(&self, path: &Path, source: &str) -> Result<FileOutput> {
        let span = info_span!("file", path = %path.display());
        let _enter = span.enter();
        let mut run = FileRun::new(path);
        let file = run.step(load_source(path, source))?;
        self.rewrite(run, file)
    }

    fn rewrite(&self, mut run: FileRun<'_>, mut file: File) -> Result<FileOutput> {
        info!(decls = file.decls.len(), "file parsed");
        let index = run.step(self.refactorer.index(&file))?;
        let report = run.step(self.refactorer.transform(&mut file, &index))?;
        let text = run.step(self.print(&file))?;
        info!(
            handler = %report.handler,
            decls = file.decls.len(),
            bytes = text.len(),
            "file rewritten"
        );
        Ok(FileOutput {
            path: run.path.to_path_buf(),
            text,
            report,
        })
    }

    fn print(&self, file: &File) -> Result<String> {
        let text = print_file(file);
        if self.config.verify_output {
            let reparsed = parse_file(&text)
                .map_err(|err| Error::print(format!("rewritten source does not parse: {err}")))?;
            if reparsed.decls.len() != file.decls.len() {
                return Err(Error::print(format!(
                    "rewritten source has {} declarations, expected {}",
                    reparsed.decls.len(),
                    file.decls.len()
                )));
            }
            debug!("rewritten source verified");
        }
        Ok(text)
    }

    /// Rewrites every configured file in order.
    ///
    /// # Errors
    /// Returns the first error raised by [`Driver::process_file`].
    pub fn run(&self) -> Result<Vec<FileOutput>> {
        let inputs = self.config.inputs();
        info!(files = inputs.len(), "run started");

        let mut outputs = Vec::with_capacity(inputs.len());
        for path in &inputs {
            match self.process_file(path) {
                Ok(output) => outputs.push(output),
                Err(err) => {
                    let stage = err.stage().map_or("unknown", Stage::name);
                    error!(path = %path.display(), stage, error = %err, "run aborted");
                    return Err(err);
                }
            }
        }

        info!(files = outputs.len(), "run finished");
        Ok(outputs)
    }

    /// Rewrites every configured file and writes the results to `out`.
    ///
    /// Nothing is written unless every file succeeds. Returns the number of
    /// files written.
    ///
    /// # Errors
    /// Returns the first processing error, or a print error if `out` fails.
    pub fn run_to<W: Write>(&self, out: &mut W) -> Result<usize> {
        let outputs = self.run()?;
        for output in &outputs {
            out.write_all(output.text.as_bytes())
                .map_err(|err| Error::print(format!("failed to write output: {err}")))?;
        }
        out.flush()
            .map_err(|err| Error::print(format!("failed to write output: {err}")))?;
        Ok(outputs.len())
    }
}
