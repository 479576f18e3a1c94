//! Discount codes.

mod book;
mod coupon;

pub use book::CouponBook;
pub(crate) use book::find_active;
pub use coupon::{normalize_code, Coupon, CouponCheck, CouponDiscount, NewCoupon};
