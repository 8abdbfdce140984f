pub mod status;

pub use status::{derive_order_status, map_gateway_status, ItemStatus, OrderStatus, PaymentStatus};
