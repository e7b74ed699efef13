use crate::features::{Complexity, Orientation, Symmetry};
use crate::grid::{GrayGrid, PixelGrid};
use crate::rules::classify_complexity;

/// 高通滤波后超过该强度的像素视为边缘
const EDGE_THRESHOLD: i32 = 50;

/// 分块大小
pub const BLOCK_SIZE: usize = 10;

/// 两个块的平均灰度差小于该值时视为相似
const BLOCK_THRESHOLD: f64 = 15.0;

/// 3x3 拉普拉斯高通滤波，统计边缘像素的百分比
///
/// 边界像素按最近的边缘像素延拓，负值截断为 0
pub fn edge_density(grid: &GrayGrid) -> Option<f64> {
    if grid.is_empty() {
        return None;
    }
    let (w, h) = (grid.width() as isize, grid.height() as isize);
    let mut edges = 0usize;
    for y in 0..h {
        for x in 0..w {
            let mut acc = 8 * grid.get(x as usize, y as usize) as i32;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if dx != 0 || dy != 0 {
                        acc -= grid.get_clamped(x + dx, y + dy) as i32;
                    }
                }
            }
            if acc.clamp(0, 255) > EDGE_THRESHOLD {
                edges += 1;
            }
        }
    }
    Some(edges as f64 / grid.data().len() as f64 * 100.0)
}

/// 比较水平方向与竖直方向相邻像素的差值总和
pub fn line_orientation(grid: &GrayGrid) -> Option<Orientation> {
    if grid.width() < 2 || grid.height() < 2 {
        return None;
    }
    let mut horizontal = 0u64;
    let mut vertical = 0u64;
    for y in 0..grid.height() - 1 {
        for x in 0..grid.width() - 1 {
            let v = grid.get(x, y);
            horizontal += v.abs_diff(grid.get(x + 1, y)) as u64;
            vertical += v.abs_diff(grid.get(x, y + 1)) as u64;
        }
    }
    if horizontal == 0 && vertical == 0 {
        return Some(Orientation::Mixed);
    }

    let ratio = horizontal as f64 / (vertical as f64 + 1.0);
    Some(if ratio > 1.3 {
        Orientation::Horizontal
    } else if ratio < 0.7 {
        Orientation::Vertical
    } else {
        Orientation::Mixed
    })
}

/// 分块平均灰度的两两相似比例，范围 0 ~ 100
///
/// 比较次数是块数的平方，调用方必须保证网格足够小
pub fn repetition(grid: &GrayGrid) -> Option<f64> {
    let blocks = block_means(grid);
    if blocks.len() < 2 {
        return None;
    }
    let mut similar = 0usize;
    for (i, a) in blocks.iter().enumerate() {
        similar += blocks[i + 1..].iter().filter(|b| (a - *b).abs() < BLOCK_THRESHOLD).count();
    }
    let total = blocks.len() * (blocks.len() - 1) / 2;
    Some(similar as f64 / total as f64 * 100.0)
}

fn block_means(grid: &GrayGrid) -> Vec<f64> {
    let mut blocks = vec![];
    let area = (BLOCK_SIZE * BLOCK_SIZE) as f64;
    for y in (0..grid.height()).step_by(BLOCK_SIZE) {
        if y + BLOCK_SIZE > grid.height() {
            break;
        }
        for x in (0..grid.width()).step_by(BLOCK_SIZE) {
            if x + BLOCK_SIZE > grid.width() {
                break;
            }
            let mut sum = 0u32;
            for by in y..y + BLOCK_SIZE {
                for bx in x..x + BLOCK_SIZE {
                    sum += grid.get(bx, by) as u32;
                }
            }
            blocks.push(sum as f64 / area);
        }
    }
    blocks
}

/// 左右镜像和上下镜像的相似度
pub fn symmetry(grid: &GrayGrid) -> Option<Symmetry> {
    let (w, h) = (grid.width(), grid.height());
    let (mid_x, mid_y) = (w / 2, h / 2);
    if mid_x == 0 || mid_y == 0 {
        return None;
    }

    let mut vertical = 0.0;
    for y in 0..h {
        for x in 0..mid_x {
            let diff = grid.get(x, y).abs_diff(grid.get(w - 1 - x, y));
            vertical += (255 - diff) as f64 / 255.0;
        }
    }

    let mut horizontal = 0.0;
    for x in 0..w {
        for y in 0..mid_y {
            let diff = grid.get(x, y).abs_diff(grid.get(x, h - 1 - y));
            horizontal += (255 - diff) as f64 / 255.0;
        }
    }

    let vertical = vertical / (mid_x * h) as f64 * 100.0;
    let horizontal = horizontal / (w * mid_y) as f64 * 100.0;
    Some(Symmetry {
        horizontal: horizontal.round() as u8,
        vertical: vertical.round() as u8,
        overall: ((horizontal + vertical) / 2.0).round() as u8,
    })
}

/// 边缘密度 40%，颜色通道离散度 40%，非重复度 20%
pub fn complexity(grid: &PixelGrid, edge_density: f64, repetition: f64) -> Option<Complexity> {
    let stddev = grid.channel_stddev()?;
    let color_variance = stddev.iter().sum::<f64>() / stddev.len() as f64;
    let score = edge_density * 0.4 + color_variance / 2.55 * 0.4 + (100.0 - repetition) * 0.2;
    Some(Complexity { score: score.round().clamp(0.0, 100.0) as u8, level: classify_complexity(score) })
}
