//! `multipart/form-data` bodies.
//!
//! A [`MultipartForm`] holds text fields and at most one image. Before
//! sending it is compressed into an [`EncodedForm`], which becomes a
//! `reqwest::multipart::Form`: text parts in sorted key order, then the JPEG
//! attachment under a random `.jpg` file name.

use std::collections::BTreeMap;
use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use rand::RngCore;
use reqwest::multipart::{Form, Part};

use super::error::NetworkError;

/// JPEG quality used when compressing attachments.
pub const JPEG_QUALITY: u8 = 70;

const IMAGE_JPEG: &str = "image/jpeg";

/// Image payload of an attachment.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Decoded pixels, compressed to JPEG at [`JPEG_QUALITY`] when the body is built.
    Raster(DynamicImage),
    /// Bytes that are already JPEG-encoded; sent unchanged.
    Jpeg(Vec<u8>),
}

impl ImageSource {
    /// Decode an encoded image (PNG, JPEG, ...) into pixels.
    pub fn decode(bytes: &[u8]) -> Result<Self, NetworkError> {
        image::load_from_memory(bytes)
            .map(ImageSource::Raster)
            .map_err(|e| NetworkError::InvalidRequest(format!("unreadable image: {e}")))
    }

    /// JPEG bytes for the wire.
    pub fn to_jpeg(&self) -> Result<Vec<u8>, NetworkError> {
        match self {
            ImageSource::Jpeg(bytes) => Ok(bytes.clone()),
            ImageSource::Raster(image) => {
                // JPEG has no alpha channel.
                let rgb = image.to_rgb8();
                let mut out = Cursor::new(Vec::new());
                JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
                    .encode_image(&rgb)
                    .map_err(|e| NetworkError::InvalidRequest(format!("JPEG encoding failed: {e}")))?;
                Ok(out.into_inner())
            }
        }
    }
}

/// The single binary part of a form.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub field: String,
    pub image: ImageSource,
}

/// Text fields plus at most one image attachment.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    fields: BTreeMap<String, String>,
    attachment: Option<Attachment>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set the attachment, replacing any previous one.
    pub fn image(mut self, field: impl Into<String>, image: ImageSource) -> Self {
        self.attachment = Some(Attachment {
            field: field.into(),
            image,
        });
        self
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Compress the attachment and name its file.
    pub fn encode(&self) -> Result<EncodedForm, NetworkError> {
        let attachment = match &self.attachment {
            Some(attachment) => Some(EncodedAttachment {
                field: attachment.field.clone(),
                file_name: format!("{}.jpg", random_hex(16)),
                jpeg: attachment.image.to_jpeg()?,
            }),
            None => None,
        };
        Ok(EncodedForm {
            fields: self.fields.clone(),
            attachment,
        })
    }
}

/// JPEG bytes ready to become a form part.
#[derive(Debug, Clone)]
pub struct EncodedAttachment {
    pub field: String,
    pub file_name: String,
    pub jpeg: Vec<u8>,
}

/// A form whose image work is done; cheap to turn into a `reqwest` form.
#[derive(Debug, Clone)]
pub struct EncodedForm {
    fields: BTreeMap<String, String>,
    attachment: Option<EncodedAttachment>,
}

impl EncodedForm {
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn attachment(&self) -> Option<&EncodedAttachment> {
        self.attachment.as_ref()
    }

    /// Build the wire form. `reqwest` picks the boundary and sets the
    /// `Content-Type` header when the form is attached to a request.
    pub fn to_form(&self) -> Result<Form, NetworkError> {
        let mut form = Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }
        if let Some(attachment) = &self.attachment {
            let part = Part::bytes(attachment.jpeg.clone())
                .file_name(attachment.file_name.clone())
                .mime_str(IMAGE_JPEG)
                .map_err(|e| NetworkError::InvalidRequest(format!("bad attachment part: {e}")))?;
            form = form.part(attachment.field.clone(), part);
        }
        Ok(form)
    }

    /// One-line description for logs.
    pub fn summary(&self) -> String {
        let fields: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        match &self.attachment {
            Some(a) => format!(
                "multipart fields [{}], {} = {} ({} bytes)",
                fields.join(", "),
                a.field,
                a.file_name,
                a.jpeg.len()
            ),
            None => format!("multipart fields [{}]", fields.join(", ")),
        }
    }
}

fn random_hex(len: usize) -> String {
    let mut buf = vec![0u8; len];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}
