pub mod approval;
pub mod order_item;
pub mod product;
pub mod purchase_order;
pub mod quantity_limit;
pub mod receipt;
pub mod supplier;
pub mod unit;

pub use purchase_order::OrderStatus;
