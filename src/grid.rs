use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, RgbaImage};

use crate::error::{Error, Result};

/// 缩放时使用的插值方式
const FILTER: FilterType = FilterType::Triangle;

/// 透明度低于该值的像素视为背景，不参与任何统计
pub const ALPHA_THRESHOLD: u8 = 128;

/// 解码后的原始图片
#[derive(Debug, Clone)]
pub struct SourceImage {
    image: DynamicImage,
}

impl SourceImage {
    /// 从内存中解码图片
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?;
        Self::from_image(image)
    }

    pub fn from_image(image: DynamicImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::Decode(format!("图片尺寸无效: {}x{}", width, height)));
        }
        Ok(Self { image })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// 等比缩放并居中裁剪到指定尺寸，返回 RGBA 采样网格
    pub fn rgba_grid(&self, width: u32, height: u32) -> PixelGrid {
        PixelGrid(self.image.resize_to_fill(width, height, FILTER).to_rgba8())
    }

    /// 等比缩放并居中裁剪到 side x side，返回灰度网格
    pub fn gray_grid(&self, side: u32) -> GrayGrid {
        GrayGrid::from(self.image.resize_to_fill(side, side, FILTER).to_luma8())
    }
}

/// 固定分析分辨率下的 RGBA 采样，只读
#[derive(Debug, Clone)]
pub struct PixelGrid(RgbaImage);

impl PixelGrid {
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.0.pixels().map(|p| p.0)
    }

    /// 所有不透明像素的 RGB 值
    pub fn opaque(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.pixels().filter(|p| p[3] >= ALPHA_THRESHOLD).map(|[r, g, b, _]| [r, g, b])
    }

    /// 每个颜色通道的标准差（总体标准差），网格为空时返回 None
    pub fn channel_stddev(&self) -> Option<[f64; 3]> {
        let n = (self.width() * self.height()) as u64;
        if n == 0 {
            return None;
        }
        let mut sum = [0u64; 3];
        let mut sum_sq = [0u64; 3];
        for p in self.pixels() {
            for c in 0..3 {
                sum[c] += p[c] as u64;
                sum_sq[c] += p[c] as u64 * p[c] as u64;
            }
        }
        let mut out = [0.0; 3];
        for c in 0..3 {
            out[c] = stddev_from_sums(n, sum[c] as u128, sum_sq[c] as u128);
        }
        Some(out)
    }
}

/// 固定分析分辨率下的灰度采样，只读
#[derive(Debug, Clone)]
pub struct GrayGrid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayGrid {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        assert_eq!(width * height, data.len(), "grid size mismatch");
        Self { width, height, data }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline(always)]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// 越界坐标取最近的边缘像素
    #[inline(always)]
    pub fn get_clamped(&self, x: isize, y: isize) -> u8 {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.get(x, y)
    }

    /// 返回 (均值, 标准差)，网格为空时返回 None
    pub fn mean_stddev(&self) -> Option<(f64, f64)> {
        if self.data.is_empty() {
            return None;
        }
        let n = self.data.len() as u64;
        let (sum, sum_sq) = self
            .data
            .iter()
            .fold((0u128, 0u128), |(s, sq), &v| (s + v as u128, sq + (v as u128).pow(2)));
        Some((sum as f64 / n as f64, stddev_from_sums(n, sum, sum_sq)))
    }
}

impl From<GrayImage> for GrayGrid {
    fn from(image: GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width as usize, height as usize, image.into_raw())
    }
}

/// 用整数累加和计算总体标准差，结果与像素顺序无关
pub(crate) fn stddev_from_sums(n: u64, sum: u128, sum_sq: u128) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as u128;
    // n * Σx² - (Σx)² 恒非负
    let numerator = (n * sum_sq).saturating_sub(sum * sum);
    (numerator as f64).sqrt() / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba};

    #[test]
    fn test_decode_garbage() {
        let result = SourceImage::decode(b"definitely not an image");
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_rgba_grid_size() {
        let img = RgbaImage::from_pixel(320, 180, Rgba([10, 20, 30, 255]));
        let src = SourceImage::from_image(DynamicImage::ImageRgba8(img)).unwrap();
        let grid = src.rgba_grid(100, 100);
        assert_eq!((grid.width(), grid.height()), (100, 100));
        assert!(grid.opaque().all(|p| p == [10, 20, 30]));
    }

    #[test]
    fn test_opaque_skips_transparent() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 255, 0, 0]));
        let grid = PixelGrid(img);
        assert_eq!(grid.opaque().collect::<Vec<_>>(), vec![[255, 0, 0]]);
    }

    #[test]
    fn test_gray_mean_stddev() {
        let img = GrayImage::from_fn(2, 2, |x, _| if x == 0 { Luma([0]) } else { Luma([200]) });
        let grid = GrayGrid::from(img);
        let (mean, stddev) = grid.mean_stddev().unwrap();
        assert_eq!(mean, 100.0);
        assert_eq!(stddev, 100.0);
    }

    #[test]
    fn test_get_clamped() {
        let grid = GrayGrid::new(2, 2, vec![1, 2, 3, 4]);
        assert_eq!(grid.get_clamped(-1, -1), 1);
        assert_eq!(grid.get_clamped(5, 0), 2);
        assert_eq!(grid.get_clamped(1, 9), 4);
    }
}
