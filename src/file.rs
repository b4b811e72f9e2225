//! The file handed to and returned by the normalizer.
//!
//! An [`ImageFile`] is an opaque byte payload tagged with a MIME type and a
//! display name, mirroring what an upload form hands over. It is immutable
//! once built: the normalizer either moves the caller's file straight back
//! out (passthrough) or returns a freshly allocated one.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use std::path::Path;

/// MIME tag used when nothing better can be determined.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// An immutable binary blob with a MIME-type tag and a name.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl ImageFile {
    /// Build a file from parts, trusting the caller's MIME tag.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Build a file and sniff its MIME tag from the payload, then the name.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = sniff_mime_type(&bytes, Some(&name));
        Self {
            name,
            mime_type: mime_type.to_string(),
            bytes,
        }
    }

    /// Read a local file. See [`crate::pipeline::input::read_local`].
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, crate::error::NormalizeError> {
        crate::pipeline::input::read_local(path.as_ref()).await
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Byte length of the payload.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The image format named by the MIME tag, if `image` knows it.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.mime_type)
    }

    /// Render the payload as a base64 `data:` URI, e.g. for a JSON upload body.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

// Reports describe the file; the payload itself is never serialised.
impl Serialize for ImageFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ImageFile", 3)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("mime_type", &self.mime_type)?;
        s.serialize_field("len", &self.len())?;
        s.end()
    }
}

/// Determine a MIME tag from magic bytes, falling back to the name's extension.
pub fn sniff_mime_type(bytes: &[u8], name_hint: Option<&str>) -> &'static str {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type();
    }
    name_hint
        .and_then(|name| ImageFormat::from_path(name).ok())
        .map(|format| format.to_mime_type())
        .unwrap_or(OCTET_STREAM)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn sniff_prefers_magic_over_extension() {
        assert_eq!(sniff_mime_type(PNG_MAGIC, Some("photo.jpg")), "image/png");
        assert_eq!(sniff_mime_type(JPEG_MAGIC, None), "image/jpeg");
    }

    #[test]
    fn sniff_falls_back_to_extension_then_octet_stream() {
        assert_eq!(sniff_mime_type(b"garbage", Some("photo.jpeg")), "image/jpeg");
        assert_eq!(sniff_mime_type(b"garbage", Some("notes.txt")), OCTET_STREAM);
        assert_eq!(sniff_mime_type(b"", None), OCTET_STREAM);
    }

    #[test]
    fn from_bytes_tags_and_reports_length() {
        let f = ImageFile::from_bytes("a.png", PNG_MAGIC.to_vec());
        assert_eq!(f.mime_type(), "image/png");
        assert_eq!(f.len(), PNG_MAGIC.len() as u64);
        assert_eq!(f.format(), Some(ImageFormat::Png));
        assert!(!f.is_empty());
    }

    #[test]
    fn data_uri_carries_mime_and_base64() {
        let f = ImageFile::new("x.bin", "image/png", vec![1, 2, 3]);
        assert_eq!(f.to_data_uri(), "data:image/png;base64,AQID");
    }

    #[test]
    fn serialisation_omits_payload() {
        let f = ImageFile::new("x.jpg", "image/jpeg", vec![0; 42]);
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["name"], "x.jpg");
        assert_eq!(json["len"], 42);
        assert!(json.get("bytes").is_none());
    }

    #[test]
    fn debug_does_not_dump_bytes() {
        let f = ImageFile::new("x.jpg", "image/jpeg", vec![7; 1024]);
        let dbg = format!("{f:?}");
        assert!(dbg.contains("len: 1024"), "got: {dbg}");
        assert!(!dbg.contains("7, 7"));
    }
}
