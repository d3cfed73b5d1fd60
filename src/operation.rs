//! Operation dispatch: a closed set of operations matched exhaustively.
//!
//! [`Operation::from_args`] validates a keyword plus positional arguments
//! before any file is touched; [`run`] hands the operation to its stage.

use crate::config::BatchConfig;
use crate::convert;
use crate::error::MediaBeltError;
use crate::output::{AssemblyReport, ConversionReport, DigestPair, ExtractionReport, StitchReport};
use serde::Serialize;
use std::path::PathBuf;

/// Usage text printed by the `help` operation.
pub const USAGE: &str = "\
Usage: mediabelt <operation> [argument1] [argument2] ...
    operations:
        hash-compare: compare the SHA-256 hash of two files.
            hash-compare file1 file2
        webp-to-jpg: convert every WEBP image in a folder into JPG.
            webp-to-jpg imageFolderPath
        images-to-doc: put every JPG image in a folder into a single PDF.
            images-to-doc imageFolderPath [finalSaveName]
        merge-docs: merge every PDF in a folder into a single PDF.
            merge-docs pdfFolderPath [finalSaveName]
        merge-images: stack every JPG image in a folder into a single image.
            merge-images imageFolderPath [finalSaveName]
        extract-images: write the images embedded in a PDF to files.
            extract-images pdfPath [outputFolder]
        help: print this message
";

/// Every operation the tool can perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    HashCompare {
        first: PathBuf,
        second: PathBuf,
    },
    WebpToJpg {
        folder: PathBuf,
    },
    /// `output` may be empty; the stage substitutes `output.pdf`.
    ImagesToPdf {
        folder: PathBuf,
        output: String,
        extension: String,
    },
    MergePdfs {
        folder: PathBuf,
        output: String,
    },
    /// `output` may be empty; the stage substitutes `output.jpg`.
    MergeImages {
        folder: PathBuf,
        output: String,
        extension: String,
    },
    ExtractImages {
        pdf: PathBuf,
        output_dir: Option<PathBuf>,
    },
    Help,
}

/// Which operation a keyword names, before its arguments are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    HashCompare,
    WebpToJpg,
    ImagesToPdf,
    MergePdfs,
    MergeImages,
    ExtractImages,
    Help,
}

impl OperationKind {
    pub const ALL: [OperationKind; 7] = [
        OperationKind::HashCompare,
        OperationKind::WebpToJpg,
        OperationKind::ImagesToPdf,
        OperationKind::MergePdfs,
        OperationKind::MergeImages,
        OperationKind::ExtractImages,
        OperationKind::Help,
    ];

    /// Canonical keyword.
    pub fn name(self) -> &'static str {
        match self {
            OperationKind::HashCompare => "hash-compare",
            OperationKind::WebpToJpg => "webp-to-jpg",
            OperationKind::ImagesToPdf => "images-to-doc",
            OperationKind::MergePdfs => "merge-docs",
            OperationKind::MergeImages => "merge-images",
            OperationKind::ExtractImages => "extract-images",
            OperationKind::Help => "help",
        }
    }

    /// Look up a keyword or one of the legacy short flags.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "hash-compare" | "-hash" => OperationKind::HashCompare,
            "webp-to-jpg" | "-w" => OperationKind::WebpToJpg,
            "images-to-doc" | "-p" => OperationKind::ImagesToPdf,
            "merge-docs" | "-m" => OperationKind::MergePdfs,
            "merge-images" | "-mi" => OperationKind::MergeImages,
            "extract-images" | "-extractImages" => OperationKind::ExtractImages,
            "help" | "-h" | "--help" => OperationKind::Help,
            _ => return None,
        })
    }
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::HashCompare { .. } => OperationKind::HashCompare,
            Operation::WebpToJpg { .. } => OperationKind::WebpToJpg,
            Operation::ImagesToPdf { .. } => OperationKind::ImagesToPdf,
            Operation::MergePdfs { .. } => OperationKind::MergePdfs,
            Operation::MergeImages { .. } => OperationKind::MergeImages,
            Operation::ExtractImages { .. } => OperationKind::ExtractImages,
            Operation::Help => OperationKind::Help,
        }
    }

    /// Canonical keyword for this operation.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Map a keyword, or one of the legacy short flags, to its canonical
    /// keyword. `None` for anything unrecognised.
    pub fn canonical_name(keyword: &str) -> Option<&'static str> {
        OperationKind::from_keyword(keyword).map(OperationKind::name)
    }

    /// Build an operation from a keyword and its positional arguments.
    ///
    /// Fails with [`MediaBeltError::InvalidArgument`] for an unknown keyword
    /// or a missing required argument. Extra arguments are ignored.
    pub fn from_args<S: AsRef<str>>(keyword: &str, args: &[S]) -> Result<Self, MediaBeltError> {
        let kind = OperationKind::from_keyword(keyword).ok_or_else(|| {
            MediaBeltError::InvalidArgument(format!("unknown operation '{keyword}'"))
        })?;
        let name = kind.name();

        let required = |i: usize, what: &str| -> Result<String, MediaBeltError> {
            args.get(i)
                .map(|s| s.as_ref().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    MediaBeltError::InvalidArgument(format!("{name}: missing {what}"))
                })
        };
        let optional = |i: usize| args.get(i).map(|s| s.as_ref().to_string()).unwrap_or_default();

        Ok(match kind {
            OperationKind::HashCompare => Operation::HashCompare {
                first: required(0, "first file")?.into(),
                second: required(1, "second file")?.into(),
            },
            OperationKind::WebpToJpg => Operation::WebpToJpg {
                folder: required(0, "image folder")?.into(),
            },
            OperationKind::ImagesToPdf => Operation::ImagesToPdf {
                folder: required(0, "image folder")?.into(),
                output: optional(1),
                extension: convert::JPG_EXTENSION.to_string(),
            },
            OperationKind::MergePdfs => Operation::MergePdfs {
                folder: required(0, "pdf folder")?.into(),
                output: optional(1),
            },
            OperationKind::MergeImages => Operation::MergeImages {
                folder: required(0, "image folder")?.into(),
                output: optional(1),
                extension: convert::JPG_EXTENSION.to_string(),
            },
            OperationKind::ExtractImages => Operation::ExtractImages {
                pdf: required(0, "pdf file")?.into(),
                output_dir: Some(optional(1)).filter(|s| !s.is_empty()).map(PathBuf::from),
            },
            OperationKind::Help => Operation::Help,
        })
    }
}

/// What an operation produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "operation", content = "report")]
pub enum OperationOutcome {
    Hash(DigestPair),
    Converted(ConversionReport),
    Assembled(AssemblyReport),
    Merged(AssemblyReport),
    Stitched(StitchReport),
    Extracted(ExtractionReport),
    Help(&'static str),
}

/// Execute `op`.
pub fn run(op: &Operation, config: &BatchConfig) -> Result<OperationOutcome, MediaBeltError> {
    tracing::debug!("Running {}", op.name());
    Ok(match op {
        Operation::HashCompare { first, second } => {
            OperationOutcome::Hash(convert::hash_compare(first, second)?)
        }
        Operation::WebpToJpg { folder } => {
            OperationOutcome::Converted(convert::webp_to_jpg(folder, config)?)
        }
        Operation::ImagesToPdf {
            folder,
            output,
            extension,
        } => OperationOutcome::Assembled(convert::images_to_pdf(folder, output, extension, config)?),
        Operation::MergePdfs { folder, output } => {
            OperationOutcome::Merged(convert::merge_pdfs(folder, output, config)?)
        }
        Operation::MergeImages {
            folder,
            output,
            extension,
        } => OperationOutcome::Stitched(convert::merge_images(folder, output, extension, config)?),
        Operation::ExtractImages { pdf, output_dir } => OperationOutcome::Extracted(
            convert::extract_images(pdf, output_dir.as_deref(), config)?,
        ),
        Operation::Help => OperationOutcome::Help(USAGE),
    })
}
