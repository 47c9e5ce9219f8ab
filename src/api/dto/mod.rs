//! Data Transfer Objects for REST request/response serialization.

pub mod common_dto;
pub mod fox_dto;
pub mod joke_dto;
pub mod user_dto;

pub use common_dto::*;
pub use fox_dto::*;
pub use joke_dto::*;
pub use user_dto::*;
