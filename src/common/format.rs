use serde::Serialize;

/// The closed set of source formats the pipeline accepts. Derived variants
/// are always re-encoded, so only `original` ever carries one of these
/// through to storage unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Jpg,
    Png,
    Gif,
    Bmp,
    Tga,
}

impl Format {
    /// Sniff the format from magic bytes. TGA has no magic number, so it is
    /// never detected here; callers fall back to the declared mime type.
    pub fn detect(data: &[u8]) -> Option<Format> {
        match infer::get(data) {
            Some(kind) => match kind.extension() {
                "jpg" | "jpeg" => Some(Format::Jpg),
                "png" => Some(Format::Png),
                "gif" => Some(Format::Gif),
                "bmp" => Some(Format::Bmp),
                _ => None,
            },
            None => None,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Format> {
        match mime {
            "image/jpeg" | "image/jpg" => Some(Format::Jpg),
            "image/png" => Some(Format::Png),
            "image/gif" => Some(Format::Gif),
            "image/bmp" | "image/x-bmp" => Some(Format::Bmp),
            "image/x-tga" | "image/x-targa" | "image/targa" => Some(Format::Tga),
            _ => None,
        }
    }

    pub fn content_type(&self) -> String {
        match self {
            Format::Jpg => String::from("image/jpeg"),
            Format::Png => String::from("image/png"),
            Format::Gif => String::from("image/gif"),
            Format::Bmp => String::from("image/bmp"),
            Format::Tga => String::from("image/x-tga"),
        }
    }

    pub fn extension(&self) -> String {
        match self {
            Format::Jpg => String::from("jpg"),
            Format::Png => String::from("png"),
            Format::Gif => String::from("gif"),
            Format::Bmp => String::from("bmp"),
            Format::Tga => String::from("tga"),
        }
    }

    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            Format::Jpg => image::ImageFormat::Jpeg,
            Format::Png => image::ImageFormat::Png,
            Format::Gif => image::ImageFormat::Gif,
            Format::Bmp => image::ImageFormat::Bmp,
            Format::Tga => image::ImageFormat::Tga,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_jpeg_and_png_magic_bytes() {
        let jpg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];
        assert_eq!(Format::detect(&jpg), Some(Format::Jpg));

        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];
        assert_eq!(Format::detect(&png), Some(Format::Png));
    }

    #[test]
    fn unknown_bytes_are_not_detected() {
        assert_eq!(Format::detect(&[0x00; 16]), None);
    }

    #[test]
    fn mime_covers_the_closed_set_only() {
        assert_eq!(Format::from_mime("image/jpeg"), Some(Format::Jpg));
        assert_eq!(Format::from_mime("image/x-tga"), Some(Format::Tga));
        assert_eq!(Format::from_mime("image/webp"), None);
        assert_eq!(Format::from_mime("video/mp4"), None);
    }
}
