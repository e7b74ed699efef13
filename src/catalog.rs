//! 以 JSON 文件保存的商品目录
//!
//! 商业字段（价格、品牌、库存、评分、热度）由外部维护，`add` 只会更新视觉记录和图片哈希。

use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::features::VisualProfile;
use crate::ranker::Candidate;
use crate::similarity::Category;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// 类别标识，未知类别使用默认权重
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub purchases: u64,
    /// 图片路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// 图片的 blake3 哈希，用于判断是否需要重新分析
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_hash: Option<String>,
    #[serde(default)]
    pub visual: VisualProfile,
}

impl Product {
    /// 新商品，商业字段全部为空
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            category: String::new(),
            price: None,
            brand: None,
            in_stock: true,
            rating: None,
            views: 0,
            purchases: 0,
            image: None,
            image_hash: None,
            visual: VisualProfile::default(),
        }
    }

    pub fn category(&self) -> Category {
        self.category.parse().unwrap_or_default()
    }
}

impl Candidate for Product {
    fn id(&self) -> &str {
        &self.id
    }

    fn price(&self) -> Option<f64> {
        self.price
    }

    fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    fn in_stock(&self) -> bool {
        self.in_stock
    }

    fn rating(&self) -> Option<f64> {
        self.rating
    }

    fn views(&self) -> u64 {
        self.views
    }

    fn purchases(&self) -> u64 {
        self.purchases
    }

    fn profile(&self) -> &VisualProfile {
        &self.visual
    }
}

/// 写入视觉记录的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Added,
    Updated,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub products: Vec<Product>,
}

impl Catalog {
    /// 读取目录文件，文件不存在时返回空目录
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("catalog {} not found, starting empty", path.display());
            return Ok(Self::default());
        }
        let data = fs::read(path)?;
        let catalog: Catalog = serde_json::from_slice(&data)?;
        info!("加载商品目录: {}，共 {} 个商品", path.display(), catalog.len());
        Ok(catalog)
    }

    /// 先写临时文件再重命名，中途失败不会破坏原有目录
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(self)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn find(&self, id: &str) -> Result<&Product> {
        self.get(id).ok_or_else(|| Error::ProductNotFound(id.to_string()))
    }

    /// 图片哈希与记录一致时不需要重新分析
    pub fn is_unchanged(&self, id: &str, hash: &str) -> bool {
        self.get(id).and_then(|p| p.image_hash.as_deref()) == Some(hash)
    }

    /// 指定类别的商品，`None` 表示全部
    ///
    /// 类别忽略首尾空白和大小写，与解析 [`Category`] 的规则一致
    pub fn in_category(&self, category: Option<&str>) -> Vec<&Product> {
        match category {
            Some(category) => {
                let category = category.trim().to_lowercase();
                self.products.iter().filter(|p| p.category.trim().to_lowercase() == category).collect()
            }
            None => self.products.iter().collect(),
        }
    }

    /// 更新或新增商品的视觉记录，已有商品的其他字段保持不变
    pub fn upsert_visual(
        &mut self,
        id: &str,
        image: String,
        hash: String,
        visual: VisualProfile,
        category: Option<&str>,
    ) -> Upsert {
        let (product, result) = match self.products.iter().position(|p| p.id == id) {
            Some(i) => (&mut self.products[i], Upsert::Updated),
            None => {
                let mut product = Product::new(id);
                if let Some(category) = category {
                    product.category = category.to_string();
                }
                self.products.push(product);
                let last = self.products.len() - 1;
                (&mut self.products[last], Upsert::Added)
            }
        };
        product.image = Some(image);
        product.image_hash = Some(hash);
        product.visual = visual;
        result
    }
}
