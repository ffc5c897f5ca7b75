//! AV1-in-HEIF transcoding — pure Rust, no system codec libraries.
//!
//! ## Crate mapping
//!
//! | Step | Crate / function |
//! |---|---|
//! | Container parse | `avif-parse` (ISOBMFF boxes, primary item extraction) |
//! | AV1 decode | `rav1d` (pure Rust port of dav1d) |
//! | YUV → RGB | custom BT.601 conversion (8/10/12-bit, all chroma layouts) |
//! | JPEG encode | `image::codecs::jpeg::JpegEncoder` |
//!
//! ## HEVC payloads
//!
//! Most HEIC files in the wild carry HEVC-coded pixels, and no pure Rust HEVC
//! decoder exists. Those containers are detected up front by their `ftyp`
//! brand (or an `hvc1`/`hev1` sample entry behind a generic brand) and
//! rejected with [`CodecError::UnsupportedPayload`], so the convert stage can
//! record a per-asset failure instead of aborting the build.

use super::codec::{CodecError, HeicCodec, JpegQuality};
use image::{ImageEncoder, RgbImage};

/// `ftyp` major brands that always mean HEVC-coded pixel data.
const HEVC_BRANDS: [&[u8; 4]; 4] = [b"heic", b"heix", b"hevc", b"hevx"];

/// How far into the container to look for an HEVC sample entry fourcc.
/// The `meta` box (which holds sample entries) precedes the pixel data.
const SNIFF_LIMIT: usize = 4096;

/// Production codec: decodes AV1-coded HEIF payloads and re-encodes as JPEG.
///
/// See the [module docs](self) for the crate-to-step mapping.
pub struct Av1HeifCodec;

impl Av1HeifCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Av1HeifCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl HeicCodec for Av1HeifCodec {
    fn transcode(&self, bytes: &[u8], quality: JpegQuality) -> Result<Vec<u8>, CodecError> {
        if is_hevc_container(bytes) {
            return Err(CodecError::UnsupportedPayload(
                "HEVC-coded pixels (no pure Rust HEVC decoder)".to_string(),
            ));
        }
        let avif = avif_parse::read_avif(&mut std::io::Cursor::new(bytes))
            .map_err(|e| CodecError::Container(format!("{e:?}")))?;
        let decoded = decode_av1(&avif.primary_item)?;
        encode_jpeg(&decoded, quality)
    }
}

/// Major brand of an ISOBMFF file, if the leading box is `ftyp`.
fn major_brand(bytes: &[u8]) -> Option<&[u8]> {
    (bytes.len() >= 12 && &bytes[4..8] == b"ftyp").then(|| &bytes[8..12])
}

/// True when the container advertises HEVC-coded pixel data.
fn is_hevc_container(bytes: &[u8]) -> bool {
    match major_brand(bytes) {
        Some(brand) if HEVC_BRANDS.iter().any(|b| &b[..] == brand) => true,
        // Generic brands say nothing about the codec; look for an HEVC
        // sample entry in the metadata region.
        Some(brand) if brand == b"mif1" || brand == b"msf1" => {
            let head = &bytes[..bytes.len().min(SNIFF_LIMIT)];
            head.windows(4).any(|w| w == b"hvc1" || w == b"hev1")
        }
        _ => false,
    }
}

/// Decode a raw AV1 payload (the container's primary item) into RGB8.
fn decode_av1(av1: &[u8]) -> Result<RgbImage, CodecError> {
    use rav1d::include::dav1d::data::Dav1dData;
    use rav1d::include::dav1d::dav1d::Dav1dSettings;
    use rav1d::include::dav1d::picture::Dav1dPicture;
    use std::ptr::NonNull;

    // A still image is a single frame; keep the decoder minimal.
    let mut settings = std::mem::MaybeUninit::<Dav1dSettings>::uninit();
    unsafe {
        rav1d::src::lib::dav1d_default_settings(NonNull::new(settings.as_mut_ptr()).unwrap())
    };
    let mut settings = unsafe { settings.assume_init() };
    settings.n_threads = 1;
    settings.max_frame_delay = 1;

    let mut ctx = None;
    let rc =
        unsafe { rav1d::src::lib::dav1d_open(NonNull::new(&mut ctx), NonNull::new(&mut settings)) };
    if rc.0 != 0 {
        return Err(CodecError::Decode(format!("decoder init failed ({})", rc.0)));
    }

    let mut data = Dav1dData::default();
    let buf = unsafe { rav1d::src::lib::dav1d_data_create(NonNull::new(&mut data), av1.len()) };
    if buf.is_null() {
        unsafe { rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx)) };
        return Err(CodecError::Decode("input buffer allocation failed".to_string()));
    }
    unsafe { std::ptr::copy_nonoverlapping(av1.as_ptr(), buf, av1.len()) };

    let rc = unsafe { rav1d::src::lib::dav1d_send_data(ctx, NonNull::new(&mut data)) };
    if rc.0 != 0 {
        unsafe {
            rav1d::src::lib::dav1d_data_unref(NonNull::new(&mut data));
            rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
        }
        return Err(CodecError::Decode(format!("send_data failed ({})", rc.0)));
    }

    let mut pic: Dav1dPicture = unsafe { std::mem::zeroed() };
    let rc = unsafe { rav1d::src::lib::dav1d_get_picture(ctx, NonNull::new(&mut pic)) };
    if rc.0 != 0 {
        unsafe { rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx)) };
        return Err(CodecError::Decode(format!("no picture decoded ({})", rc.0)));
    }

    // Convert before releasing the picture; defer the error until cleanup
    // has run so the decoder is torn down on every path.
    let converted = picture_to_rgb(&pic);

    unsafe {
        rav1d::src::lib::dav1d_picture_unref(NonNull::new(&mut pic));
        rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
    }

    let (width, height, pixels) = converted?;
    RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| CodecError::Decode("decoded plane size mismatch".to_string()))
}

/// Extract plane pointers from a decoded picture and interleave to RGB8.
fn picture_to_rgb(
    pic: &rav1d::include::dav1d::picture::Dav1dPicture,
) -> Result<(u32, u32, Vec<u8>), CodecError> {
    use rav1d::include::dav1d::headers::{
        DAV1D_PIXEL_LAYOUT_I400, DAV1D_PIXEL_LAYOUT_I420, DAV1D_PIXEL_LAYOUT_I422,
        DAV1D_PIXEL_LAYOUT_I444,
    };

    let width = pic.p.w as u32;
    let height = pic.p.h as u32;
    let bpc = pic.p.bpc as u32;

    let luma = pic.data[0]
        .ok_or_else(|| CodecError::Decode("missing luma plane".to_string()))?
        .as_ptr() as *const u8;

    let planes = if pic.p.layout == DAV1D_PIXEL_LAYOUT_I400 {
        Planes {
            luma,
            chroma: None,
            y_stride: pic.stride[0],
            uv_stride: 0,
            subsample: (false, false),
        }
    } else {
        let cb = pic.data[1]
            .ok_or_else(|| CodecError::Decode("missing cb plane".to_string()))?
            .as_ptr() as *const u8;
        let cr = pic.data[2]
            .ok_or_else(|| CodecError::Decode("missing cr plane".to_string()))?
            .as_ptr() as *const u8;
        let subsample = match pic.p.layout {
            DAV1D_PIXEL_LAYOUT_I420 => (true, true),
            DAV1D_PIXEL_LAYOUT_I422 => (true, false),
            DAV1D_PIXEL_LAYOUT_I444 => (false, false),
            other => {
                return Err(CodecError::Decode(format!(
                    "unsupported pixel layout {other}"
                )));
            }
        };
        Planes {
            luma,
            chroma: Some((cb, cr)),
            y_stride: pic.stride[0],
            uv_stride: pic.stride[1],
            subsample,
        }
    };

    Ok((width, height, planes.interleave_rgb(width, height, bpc)))
}

/// Decoded YUV plane pointers, ready for RGB conversion.
struct Planes {
    luma: *const u8,
    /// Cb and Cr planes; `None` for monochrome (I400) pictures.
    chroma: Option<(*const u8, *const u8)>,
    y_stride: isize,
    uv_stride: isize,
    /// Chroma subsampling (horizontal, vertical): I420 = (true, true).
    subsample: (bool, bool),
}

impl Planes {
    /// Interleaved RGB8 via BT.601, downscaling 10/12-bit samples to 8-bit.
    fn interleave_rgb(&self, width: u32, height: u32, bpc: u32) -> Vec<u8> {
        let max_val = ((1u32 << bpc) - 1) as f32;
        let center = (1u32 << (bpc - 1)) as f32;
        let scale = 255.0 / max_val;

        let mut rgb = vec![0u8; (width * height * 3) as usize];

        for row in 0..height {
            for col in 0..width {
                let y = sample(self.luma, self.y_stride, col, row, bpc);

                let (r, g, b) = match self.chroma {
                    None => {
                        let v = (y * scale).clamp(0.0, 255.0);
                        (v, v, v)
                    }
                    Some((cb_plane, cr_plane)) => {
                        let (ss_x, ss_y) = self.subsample;
                        let cx = if ss_x { col / 2 } else { col };
                        let cy = if ss_y { row / 2 } else { row };
                        let cb = sample(cb_plane, self.uv_stride, cx, cy, bpc) - center;
                        let cr = sample(cr_plane, self.uv_stride, cx, cy, bpc) - center;

                        // BT.601 YCbCr -> RGB, then scale to 8-bit
                        (
                            ((y + 1.402 * cr) * scale).clamp(0.0, 255.0),
                            ((y - 0.344136 * cb - 0.714136 * cr) * scale).clamp(0.0, 255.0),
                            ((y + 1.772 * cb) * scale).clamp(0.0, 255.0),
                        )
                    }
                };

                let at = ((row * width + col) * 3) as usize;
                rgb[at] = r as u8;
                rgb[at + 1] = g as u8;
                rgb[at + 2] = b as u8;
            }
        }

        rgb
    }
}

/// Read one sample from a plane, handling both 8-bit and 16-bit storage.
#[inline]
fn sample(plane: *const u8, stride: isize, x: u32, y: u32, bpc: u32) -> f32 {
    if bpc <= 8 {
        (unsafe { *plane.offset(y as isize * stride + x as isize) }) as f32
    } else {
        // 10-bit and 12-bit samples are stored as u16
        let offset = y as isize * stride + x as isize * 2;
        (unsafe { *(plane.offset(offset) as *const u16) }) as f32
    }
}

/// Encode an RGB image as a complete JPEG file at the given quality.
fn encode_jpeg(image: &RgbImage, quality: JpegQuality) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality.value() as u8);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(out)
}
