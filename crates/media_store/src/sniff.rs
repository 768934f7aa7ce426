use crate::types::ImageKind;

/// Detects the image format of an upload from its magic bytes. Returns
/// `None` for anything that is not a supported image; the caller rejects
/// those before the bytes reach the store.
pub fn sniff_image(bytes: &[u8]) -> Option<ImageKind> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(ImageKind::Jpeg);
    }

    if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some(ImageKind::Png);
    }

    // RIFF container with a WEBP fourcc
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        return Some(ImageKind::Webp);
    }

    // ISO BMFF "ftyp" box with a HEIC/HEIF brand
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        let brand = &bytes[8..12];
        if matches!(brand, b"heic" | b"heix" | b"hevc" | b"heif" | b"mif1" | b"msf1") {
            return Some(ImageKind::Heic);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_jpeg() {
        let bytes = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
        assert_eq!(sniff_image(&bytes), Some(ImageKind::Jpeg));
    }

    #[test]
    fn test_detects_png() {
        let bytes = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
        assert_eq!(sniff_image(&bytes), Some(ImageKind::Png));
    }

    #[test]
    fn test_detects_webp() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&[0x24, 0x00, 0x00, 0x00]);
        bytes.extend_from_slice(b"WEBP");
        assert_eq!(sniff_image(&bytes), Some(ImageKind::Webp));
    }

    #[test]
    fn test_detects_heic() {
        let mut bytes = vec![0x00, 0x00, 0x00, 0x18];
        bytes.extend_from_slice(b"ftyp");
        bytes.extend_from_slice(b"heic");
        assert_eq!(sniff_image(&bytes), Some(ImageKind::Heic));
    }

    #[test]
    fn test_rejects_unsupported_gif() {
        assert_eq!(sniff_image(b"GIF89a\x01\x00\x01\x00"), None);
    }

    #[test]
    fn test_rejects_plain_text() {
        assert_eq!(sniff_image(b"<script>alert(1)</script>"), None);
    }

    #[test]
    fn test_rejects_truncated_input() {
        assert_eq!(sniff_image(&[0xFF]), None);
        assert_eq!(sniff_image(b"RIFF"), None);
        assert_eq!(sniff_image(&[]), None);
    }
}
