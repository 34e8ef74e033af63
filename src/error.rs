use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid scale `{0}`, scale must be one of: linear, log")]
    InvalidScaleType(String),

    #[error("render() called while a render pass is already in progress")]
    ReentrantRender,

    #[error("chart host is not mounted")]
    NotMounted,
}
