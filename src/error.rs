use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// 图片无法解码，或者宽高为 0
    #[error("图片解码失败: {0}")]
    Decode(String),

    /// 调用方传入的参数不合法，此时不会对任何候选商品评分
    #[error("参数不合法: {name} = {value}")]
    InvalidOptions { name: &'static str, value: String },

    #[error("商品不存在: {0}")]
    ProductNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(name: &'static str, value: impl ToString) -> Self {
        Self::InvalidOptions { name, value: value.to_string() }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err.to_string())
    }
}
