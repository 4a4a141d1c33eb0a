//! Tabs, operations and the per-operation descriptor table.
//!
//! Every decision that depends on "which operation is active" (accepted
//! media types, endpoint, request parameters, cleanup route, notification
//! wording) is read from one descriptor instead of branching on the tab.

use std::fmt;
use std::str::FromStr;

use crate::routing::Resource;

pub const IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/webp",
    "image/tiff",
];

pub const PDF_TYPES: &[&str] = &["application/pdf"];

pub const WORD_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
];

pub const VIDEO_TYPES: &[&str] = &[
    "video/mp4",
    "video/x-msvideo",
    "video/quicktime",
    "video/x-flv",
    "video/x-matroska",
    "video/webm",
];

/// Top-level tab of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Pdf,
    Media,
    Convert,
    Watermark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConversionDirection {
    #[default]
    PdfToWord,
    WordToPdf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WatermarkKind {
    #[default]
    Image,
    Pdf,
}

impl WatermarkKind {
    /// Value of the `fileType` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            WatermarkKind::Image => "image",
            WatermarkKind::Pdf => "pdf",
        }
    }
}

/// A requested transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CompressPdf,
    CompressImage,
    CompressVideo,
    ConvertPdfToWord,
    ConvertWordToPdf,
    RemoveWatermarkImage,
    RemoveWatermarkPdf,
}

/// Family of an operation, used for notification wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Compression,
    Conversion,
    WatermarkRemoval,
}

/// Which form fields accompany the upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSet {
    None,
    CompressionLevel,
    Watermark(WatermarkKind),
}

/// Static facts about one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub operation: Operation,
    pub kind: OperationKind,
    pub accepted_types: &'static [&'static str],
    /// Proxy endpoint receiving the upload.
    pub endpoint: &'static str,
    /// Resource that owns the produced file; decides the cleanup route.
    pub resource: Resource,
    pub params: ParamSet,
}

const DESCRIPTORS: [OperationDescriptor; 7] = [
    OperationDescriptor {
        operation: Operation::CompressPdf,
        kind: OperationKind::Compression,
        accepted_types: PDF_TYPES,
        endpoint: "/api/compress",
        resource: Resource::Pdf,
        params: ParamSet::CompressionLevel,
    },
    OperationDescriptor {
        operation: Operation::CompressImage,
        kind: OperationKind::Compression,
        accepted_types: IMAGE_TYPES,
        endpoint: "/api/image/compress",
        resource: Resource::Image,
        params: ParamSet::CompressionLevel,
    },
    OperationDescriptor {
        operation: Operation::CompressVideo,
        kind: OperationKind::Compression,
        accepted_types: VIDEO_TYPES,
        endpoint: "/api/video",
        resource: Resource::Video,
        params: ParamSet::CompressionLevel,
    },
    OperationDescriptor {
        operation: Operation::ConvertPdfToWord,
        kind: OperationKind::Conversion,
        accepted_types: PDF_TYPES,
        endpoint: "/api/convert/pdf-to-word",
        resource: Resource::Document,
        params: ParamSet::None,
    },
    OperationDescriptor {
        operation: Operation::ConvertWordToPdf,
        kind: OperationKind::Conversion,
        accepted_types: WORD_TYPES,
        endpoint: "/api/convert/word-to-pdf",
        resource: Resource::Document,
        params: ParamSet::None,
    },
    OperationDescriptor {
        operation: Operation::RemoveWatermarkImage,
        kind: OperationKind::WatermarkRemoval,
        accepted_types: IMAGE_TYPES,
        endpoint: "/api/watermark",
        resource: Resource::Watermark,
        params: ParamSet::Watermark(WatermarkKind::Image),
    },
    OperationDescriptor {
        operation: Operation::RemoveWatermarkPdf,
        kind: OperationKind::WatermarkRemoval,
        accepted_types: PDF_TYPES,
        endpoint: "/api/watermark",
        resource: Resource::Watermark,
        params: ParamSet::Watermark(WatermarkKind::Pdf),
    },
];

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::CompressPdf,
        Operation::CompressImage,
        Operation::CompressVideo,
        Operation::ConvertPdfToWord,
        Operation::ConvertWordToPdf,
        Operation::RemoveWatermarkImage,
        Operation::RemoveWatermarkPdf,
    ];

    pub fn descriptor(self) -> &'static OperationDescriptor {
        &DESCRIPTORS[self as usize]
    }

    pub fn accepts(self, media_type: &str) -> bool {
        self.descriptor().accepted_types.contains(&media_type)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::CompressPdf => "compress-pdf",
            Operation::CompressImage => "compress-image",
            Operation::CompressVideo => "compress-video",
            Operation::ConvertPdfToWord => "convert-pdf-to-word",
            Operation::ConvertWordToPdf => "convert-word-to-pdf",
            Operation::RemoveWatermarkImage => "remove-watermark-image",
            Operation::RemoveWatermarkPdf => "remove-watermark-pdf",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown operation '{}'", s))
    }
}

/// The active tab together with its sub-options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub tab: Tab,
    pub direction: ConversionDirection,
    pub watermark: WatermarkKind,
}

impl Selection {
    /// Operations a file may resolve to under this selection.
    ///
    /// The media tab admits both image and video compression; the file
    /// decides which one runs.
    pub fn candidates(&self) -> &'static [Operation] {
        match self.tab {
            Tab::Pdf => &[Operation::CompressPdf],
            Tab::Media => &[Operation::CompressImage, Operation::CompressVideo],
            Tab::Convert => match self.direction {
                ConversionDirection::PdfToWord => &[Operation::ConvertPdfToWord],
                ConversionDirection::WordToPdf => &[Operation::ConvertWordToPdf],
            },
            Tab::Watermark => match self.watermark {
                WatermarkKind::Image => &[Operation::RemoveWatermarkImage],
                WatermarkKind::Pdf => &[Operation::RemoveWatermarkPdf],
            },
        }
    }

    /// The operation `media_type` resolves to, if any.
    pub fn resolve(&self, media_type: &str) -> Option<Operation> {
        self.candidates()
            .iter()
            .copied()
            .find(|op| op.accepts(media_type))
    }

    /// Hint shown when a file of the wrong type is picked.
    pub fn type_hint(&self) -> &'static str {
        match self.tab {
            Tab::Pdf => "Please select a PDF file",
            Tab::Media => "Please select an image or video file",
            Tab::Convert => match self.direction {
                ConversionDirection::PdfToWord => {
                    "Please select a PDF file for PDF to Word conversion"
                }
                ConversionDirection::WordToPdf => {
                    "Please select a Word document for Word to PDF conversion"
                }
            },
            Tab::Watermark => match self.watermark {
                WatermarkKind::Image => "Please select an image file for watermark removal",
                WatermarkKind::Pdf => "Please select a PDF file for watermark removal",
            },
        }
    }

    /// Selection with the defaults a freshly opened `tab` starts from.
    pub fn for_tab(tab: Tab) -> Self {
        Selection {
            tab,
            direction: ConversionDirection::PdfToWord,
            watermark: WatermarkKind::Image,
        }
    }
}
