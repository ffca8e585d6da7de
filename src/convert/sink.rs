//! Output destinations for serialized manifests

use super::serializer::OutputFormat;
use crate::error::{KomposeError, Result};
use crate::kubernetes::ResourceKind;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Where manifests go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// One file per resource in a directory
    PerResource(PathBuf),
    /// Every resource appended to one file
    Aggregate(PathBuf),
    /// Every resource written to standard output
    Stdout,
}

enum Destination {
    Files(PathBuf),
    Stream {
        writer: Box<dyn Write>,
        path: Option<PathBuf>,
    },
}

/// Writes serialized manifests to the configured target
pub struct OutputSink {
    format: OutputFormat,
    destination: Destination,
    written: Vec<PathBuf>,
}

impl OutputSink {
    /// Open the target; an aggregate file is created immediately
    pub fn open(target: &OutputTarget, format: OutputFormat) -> Result<Self> {
        let destination = match target {
            OutputTarget::PerResource(dir) => Destination::Files(dir.clone()),
            OutputTarget::Aggregate(path) => {
                let file = File::create(path).map_err(|e| {
                    KomposeError::write(format!("output file {}", path.display()), e)
                })?;
                Destination::Stream {
                    writer: Box::new(file),
                    path: Some(path.clone()),
                }
            }
            OutputTarget::Stdout => return Ok(Self::stream(Box::new(io::stdout()), format)),
        };

        Ok(Self {
            format,
            destination,
            written: Vec::new(),
        })
    }

    /// Write every resource to `writer`, framed as on stdout
    pub fn stream(writer: Box<dyn Write>, format: OutputFormat) -> Self {
        Self {
            format,
            destination: Destination::Stream { writer, path: None },
            written: Vec::new(),
        }
    }

    /// File name for a resource in per-resource mode
    pub fn file_name(&self, service: &str, kind: ResourceKind) -> String {
        format!("{}-{}.{}", service, kind.suffix(), self.format.extension())
    }

    /// Write one serialized resource
    pub fn write(&mut self, service: &str, kind: ResourceKind, data: &[u8]) -> Result<()> {
        let file_name = self.file_name(service, kind);
        let separator = self.format.separator();

        match &mut self.destination {
            Destination::Stream { writer, .. } => {
                let context = || format!("{} {}", kind, service);
                writer
                    .write_all(data)
                    .and_then(|_| writer.write_all(separator.as_bytes()))
                    .and_then(|_| writer.write_all(b"\n"))
                    .and_then(|_| writer.flush())
                    .map_err(|e| KomposeError::write(context(), e))?;
            }
            Destination::Files(dir) => {
                let path = dir.join(&file_name);
                std::fs::write(&path, data)
                    .map_err(|e| KomposeError::write(format!("{} {}", kind, service), e))?;
                println!("file {:?} created", path.display().to_string());
                self.written.push(path);
            }
        }

        Ok(())
    }

    /// Report the aggregate file, if any, and close the sink
    pub fn finish(self) -> Result<Vec<PathBuf>> {
        let mut written = self.written;
        if let Destination::Stream {
            mut writer,
            path: Some(path),
        } = self.destination
        {
            writer
                .flush()
                .map_err(|e| KomposeError::write(format!("output file {}", path.display()), e))?;
            println!("file {:?} created", path.display().to_string());
            written.push(path);
        }
        Ok(written)
    }

    /// Aggregate file path, if writing to one
    pub fn aggregate_path(&self) -> Option<&Path> {
        match &self.destination {
            Destination::Stream { path, .. } => path.as_deref(),
            Destination::Files(_) => None,
        }
    }
}
