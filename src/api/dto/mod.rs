//! Data Transfer Objects for REST request/response serialization.
//!
//! All monetary fields carry a `_cents` suffix and travel as integer
//! cents, never as floating-point dollar values.

pub mod ad_dto;
pub mod category_dto;
pub mod checkout_dto;
pub mod common_dto;
pub mod placement_dto;
pub mod wallet_dto;

pub use ad_dto::*;
pub use category_dto::*;
pub use checkout_dto::*;
pub use common_dto::*;
pub use placement_dto::*;
pub use wallet_dto::*;
