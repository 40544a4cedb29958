// ABOUTME: Deployment descriptor and the zip archive uploaded as the source bundle.
// ABOUTME: The descriptor tells the platform which image to run and which port it listens on.

use crate::types::{ApplicationName, ImageRef, VersionLabel};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

pub const DESCRIPTOR_FILENAME: &str = "Dockerrun.aws.json";
pub const ARCHIVE_FILENAME: &str = "deployment.zip";
pub const CONTAINER_PORT: u16 = 8000;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to serialize descriptor: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Single-container Docker descriptor (`Dockerrun.aws.json`, version 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    #[serde(rename = "AWSEBDockerrunVersion")]
    pub version: String,
    #[serde(rename = "Image")]
    pub image: DescriptorImage,
    #[serde(rename = "Ports")]
    pub ports: Vec<DescriptorPort>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescriptorImage {
    pub name: String,
    /// Pull the image on every deploy. The platform expects the string form.
    pub update: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescriptorPort {
    pub container_port: u16,
}

impl Descriptor {
    pub fn for_image(image: &ImageRef) -> Self {
        Self {
            version: "1".to_string(),
            image: DescriptorImage {
                name: image.to_string(),
                update: "true".to_string(),
            },
            ports: vec![DescriptorPort {
                container_port: CONTAINER_PORT,
            }],
        }
    }

    /// Serialize on one line with `", "` and `": "` separators.
    pub fn to_json(&self) -> Result<String, ArtifactError> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
        self.serialize(&mut ser)?;
        // serde_json only ever writes valid UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Compact JSON with a space after every `,` and `:`.
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }
}

/// Object key for an application version's archive.
pub fn archive_key(application: &ApplicationName, version: &VersionLabel) -> String {
    format!("{application}/{version}/{ARCHIVE_FILENAME}")
}

/// Write `deployment.zip` containing the descriptor into `dir`.
pub fn package(descriptor: &Descriptor, dir: &Path) -> Result<PathBuf, ArtifactError> {
    let path = dir.join(ARCHIVE_FILENAME);
    let json = descriptor.to_json()?;

    let mut writer = zip::ZipWriter::new(File::create(&path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file(DESCRIPTOR_FILENAME, options)?;
    writer.write_all(json.as_bytes())?;
    writer.finish()?;

    tracing::debug!("Packaged {} into {}", DESCRIPTOR_FILENAME, path.display());
    Ok(path)
}
