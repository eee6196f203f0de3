#![doc = include_str!("../README.md")]

mod error;
mod flows;
mod identity;
mod model;
mod ports;
mod route;
mod validate;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::error::*;
pub use crate::flows::*;
pub use crate::identity::*;
pub use crate::model::*;
pub use crate::ports::*;
pub use crate::route::*;
pub use crate::validate::{
    LATITUDE_RANGE, LONGITUDE_RANGE, is_batch_valid, is_coordinate_pair_valid,
    is_coordinate_valid,
};
