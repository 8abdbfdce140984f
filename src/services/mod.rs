pub mod cart_service;
pub mod order_item_service;
pub mod order_service;
pub mod payment_service;
pub mod product_service;

pub use cart_service::CartService;
pub use order_item_service::OrderItemService;
pub use order_service::{OrderLine, OrderService};
pub use payment_service::{CallbackInput, CallbackOutcome, PaymentService};
pub use product_service::ProductService;
