pub mod area;
pub mod compare;
pub mod config;
pub mod error;
pub mod export;
pub mod routing;
pub mod sampler;
pub mod util;
