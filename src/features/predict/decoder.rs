//! base64 → BGR 像素数组的唯一解码路径。

use std::borrow::Cow;

use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use thiserror::Error;

/// 与浏览器/Python 端的 base64 编码器兼容：padding 可有可无，允许末尾多余比特。
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// 像素通道数（固定为 BGR 三通道）
pub const CHANNELS: usize = 3;

/// 解码错误
///
/// Display 只输出稳定的对外文案，具体原因通过 [`DecodeError::detail`] 取得，仅用于日志。
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid base64 payload")]
    InvalidBase64(String),

    #[error("unrecognized image data")]
    UnrecognizedImage(String),
}

impl DecodeError {
    pub fn detail(&self) -> &str {
        match self {
            DecodeError::InvalidBase64(d) | DecodeError::UnrecognizedImage(d) => d,
        }
    }
}

/// 解码后的图像：行优先、BGR 通道顺序，形状为 height × width × 3。
///
/// 生命周期仅限单次请求，不缓存、不持久化。
#[derive(Clone, PartialEq, Eq)]
pub struct PixelArray {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelArray {
    /// 由已按 BGR 排列的原始字节构建；长度不匹配时返回 None。
    pub fn from_bgr(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(CHANNELS)?;
        (data.len() == expected).then_some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        CHANNELS
    }

    /// (height, width, channels)
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, CHANNELS)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// 读取 (x, y) 处的 [b, g, r]；越界返回 None。
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = self.data.get(offset..offset + CHANNELS)?;
        Some([px[0], px[1], px[2]])
    }
}

// 不打印像素内容，避免图像数据进入日志。
impl std::fmt::Debug for PixelArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelArray")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &CHANNELS)
            .finish()
    }
}

/// 去掉 `data:<mime>;base64,` 前缀（浏览器 canvas 截图的常见格式）。
fn strip_data_uri(raw: &str) -> &str {
    const MARKER: &str = ";base64,";
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix("data:")
        && let Some(idx) = rest.find(MARKER)
    {
        return &rest[idx + MARKER.len()..];
    }
    trimmed
}

fn strip_whitespace(s: &str) -> Cow<'_, str> {
    if s.bytes().any(|b| b.is_ascii_whitespace()) {
        Cow::Owned(s.chars().filter(|c| !c.is_ascii_whitespace()).collect())
    } else {
        Cow::Borrowed(s)
    }
}

/// 将 base64 文本解码为原始字节
pub fn decode_base64(raw: &str) -> Result<Vec<u8>, DecodeError> {
    let payload = strip_whitespace(strip_data_uri(raw));
    if payload.is_empty() {
        return Err(DecodeError::InvalidBase64("empty payload".into()));
    }
    LENIENT_BASE64
        .decode(payload.as_bytes())
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))
}

/// 将图片字节（PNG/JPEG/GIF/BMP/WebP 等，按内容嗅探格式）解码为 BGR 像素数组
pub fn decode_image_bytes(bytes: &[u8]) -> Result<PixelArray, DecodeError> {
    let format =
        image::guess_format(bytes).map_err(|e| DecodeError::UnrecognizedImage(e.to_string()))?;
    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| DecodeError::UnrecognizedImage(e.to_string()))?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let mut data = rgb.into_raw();
    for px in data.chunks_exact_mut(CHANNELS) {
        px.swap(0, 2);
    }

    Ok(PixelArray {
        width,
        height,
        data,
    })
}

/// base64 文本 → BGR 像素数组
pub fn decode_base64_image(raw: &str) -> Result<PixelArray, DecodeError> {
    let bytes = decode_base64(raw)?;
    decode_image_bytes(&bytes)
}
