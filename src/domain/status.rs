//! Status vocabularies for orders, order items and payments.
//!
//! Item-level transitions are validated against a static adjacency table,
//! and the order-level status is derived from the statuses of its items.
//! The strings produced by these enums are persisted as Postgres enum
//! values and must match the database vocabulary exactly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fulfillment status of a single order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "order_item_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl ItemStatus {
    /// Legal successor statuses for `self`.
    ///
    /// `delivered` and `cancelled` are terminal and have no successors.
    pub fn successors(self) -> &'static [ItemStatus] {
        match self {
            ItemStatus::Pending | ItemStatus::Paid => {
                &[ItemStatus::Processing, ItemStatus::Cancelled]
            }
            ItemStatus::Processing => &[ItemStatus::Shipped, ItemStatus::Cancelled],
            ItemStatus::Shipped => &[ItemStatus::Delivered],
            ItemStatus::Delivered | ItemStatus::Cancelled => &[],
        }
    }

    /// True iff `self -> to` is a legal transition.
    pub fn can_transition(self, to: ItemStatus) -> bool {
        self.successors().contains(&to)
    }

    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Paid => "paid",
            ItemStatus::Processing => "processing",
            ItemStatus::Shipped => "shipped",
            ItemStatus::Delivered => "delivered",
            ItemStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate status of an order. Never set directly from item-level
/// updates; recomputed via [`derive_order_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Processing,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Terminal order statuses are never recomputed again.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a payment, updated once per terminal gateway notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Success,
    Cancel,
    Expired,
    Failed,
}

impl PaymentStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Cancel => "cancel",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recompute an order's status from its items' statuses.
///
/// Returns `None` when the current status must be retained. Rules, in
/// order: a terminal order is never recomputed; with no non-cancelled
/// items left the order is cancelled; all items delivered completes the
/// order; all items shipped-or-further marks it shipped; any processing
/// item marks it processing; otherwise the current status stands.
pub fn derive_order_status(current: OrderStatus, items: &[ItemStatus]) -> Option<OrderStatus> {
    if current.is_terminal() || items.is_empty() {
        return None;
    }

    let mut live = items
        .iter()
        .copied()
        .filter(|s| *s != ItemStatus::Cancelled)
        .peekable();

    if live.peek().is_none() {
        return Some(OrderStatus::Cancelled);
    }

    let live: Vec<ItemStatus> = live.collect();

    if live.iter().all(|s| *s == ItemStatus::Delivered) {
        return Some(OrderStatus::Completed);
    }
    if live
        .iter()
        .all(|s| matches!(s, ItemStatus::Shipped | ItemStatus::Delivered))
    {
        return Some(OrderStatus::Shipped);
    }
    if live.iter().any(|s| *s == ItemStatus::Processing) {
        return Some(OrderStatus::Processing);
    }

    None
}

/// Map the gateway's transaction-status vocabulary to the internal
/// payment/order status pair. Unrecognized statuses are treated as failed.
pub fn map_gateway_status(gateway_status: &str) -> (PaymentStatus, OrderStatus) {
    match gateway_status {
        "settlement" | "capture" => (PaymentStatus::Success, OrderStatus::Paid),
        "cancel" | "deny" => (PaymentStatus::Cancel, OrderStatus::Cancelled),
        "expire" => (PaymentStatus::Expired, OrderStatus::Cancelled),
        "pending" => (PaymentStatus::Pending, OrderStatus::Pending),
        _ => (PaymentStatus::Failed, OrderStatus::Cancelled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ITEM_STATUSES: [ItemStatus; 6] = [
        ItemStatus::Pending,
        ItemStatus::Paid,
        ItemStatus::Processing,
        ItemStatus::Shipped,
        ItemStatus::Delivered,
        ItemStatus::Cancelled,
    ];

    #[test]
    fn transition_table_allows_only_listed_pairs() {
        let allowed: &[(ItemStatus, ItemStatus)] = &[
            (ItemStatus::Pending, ItemStatus::Processing),
            (ItemStatus::Pending, ItemStatus::Cancelled),
            (ItemStatus::Paid, ItemStatus::Processing),
            (ItemStatus::Paid, ItemStatus::Cancelled),
            (ItemStatus::Processing, ItemStatus::Shipped),
            (ItemStatus::Processing, ItemStatus::Cancelled),
            (ItemStatus::Shipped, ItemStatus::Delivered),
        ];

        for from in ALL_ITEM_STATUSES {
            for to in ALL_ITEM_STATUSES {
                let expected = allowed.contains(&(from, to));
                assert_eq!(
                    from.can_transition(to),
                    expected,
                    "transition {} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn delivered_and_cancelled_are_terminal() {
        assert!(ItemStatus::Delivered.is_terminal());
        assert!(ItemStatus::Cancelled.is_terminal());
        assert!(!ItemStatus::Pending.is_terminal());
        assert!(!ItemStatus::Shipped.is_terminal());
    }

    #[test]
    fn all_items_delivered_completes_order() {
        let items = [ItemStatus::Delivered, ItemStatus::Delivered];
        assert_eq!(
            derive_order_status(OrderStatus::Shipped, &items),
            Some(OrderStatus::Completed)
        );
    }

    #[test]
    fn delivered_plus_cancelled_completes_order() {
        let items = [ItemStatus::Delivered, ItemStatus::Cancelled];
        assert_eq!(
            derive_order_status(OrderStatus::Processing, &items),
            Some(OrderStatus::Completed)
        );
    }

    #[test]
    fn all_shipped_marks_order_shipped() {
        let items = [ItemStatus::Shipped, ItemStatus::Shipped];
        assert_eq!(
            derive_order_status(OrderStatus::Processing, &items),
            Some(OrderStatus::Shipped)
        );
    }

    #[test]
    fn partially_delivered_order_stays_shipped() {
        // One item delivered while another is still shipped: not completed.
        let items = [ItemStatus::Delivered, ItemStatus::Shipped];
        assert_eq!(
            derive_order_status(OrderStatus::Shipped, &items),
            Some(OrderStatus::Shipped)
        );
    }

    #[test]
    fn any_processing_item_marks_order_processing() {
        let items = [ItemStatus::Processing, ItemStatus::Pending];
        assert_eq!(
            derive_order_status(OrderStatus::Paid, &items),
            Some(OrderStatus::Processing)
        );
    }

    #[test]
    fn pending_items_retain_current_status() {
        let items = [ItemStatus::Pending, ItemStatus::Pending];
        assert_eq!(derive_order_status(OrderStatus::Pending, &items), None);
        assert_eq!(derive_order_status(OrderStatus::Paid, &items), None);
    }

    #[test]
    fn all_items_cancelled_cancels_order() {
        let items = [ItemStatus::Cancelled, ItemStatus::Cancelled];
        assert_eq!(
            derive_order_status(OrderStatus::Pending, &items),
            Some(OrderStatus::Cancelled)
        );
    }

    #[test]
    fn terminal_order_status_is_sticky() {
        // Once completed, re-cancelling an already cancelled item must not
        // move the order off its terminal status.
        let items = [ItemStatus::Delivered, ItemStatus::Cancelled];
        assert_eq!(derive_order_status(OrderStatus::Completed, &items), None);
        assert_eq!(derive_order_status(OrderStatus::Cancelled, &items), None);
    }

    #[test]
    fn empty_item_list_retains_current_status() {
        assert_eq!(derive_order_status(OrderStatus::Pending, &[]), None);
    }

    #[test]
    fn recompute_is_commutative_across_update_orderings() {
        // Two items of the same order updated in either order must converge
        // to the same derived status once both updates are applied.
        let final_states = [ItemStatus::Shipped, ItemStatus::Cancelled];
        let reversed = [ItemStatus::Cancelled, ItemStatus::Shipped];
        assert_eq!(
            derive_order_status(OrderStatus::Processing, &final_states),
            derive_order_status(OrderStatus::Processing, &reversed)
        );
    }

    #[test]
    fn gateway_status_mapping() {
        assert_eq!(
            map_gateway_status("settlement"),
            (PaymentStatus::Success, OrderStatus::Paid)
        );
        assert_eq!(
            map_gateway_status("capture"),
            (PaymentStatus::Success, OrderStatus::Paid)
        );
        assert_eq!(
            map_gateway_status("cancel"),
            (PaymentStatus::Cancel, OrderStatus::Cancelled)
        );
        assert_eq!(
            map_gateway_status("deny"),
            (PaymentStatus::Cancel, OrderStatus::Cancelled)
        );
        assert_eq!(
            map_gateway_status("expire"),
            (PaymentStatus::Expired, OrderStatus::Cancelled)
        );
        assert_eq!(
            map_gateway_status("pending"),
            (PaymentStatus::Pending, OrderStatus::Pending)
        );
        assert_eq!(
            map_gateway_status("refund"),
            (PaymentStatus::Failed, OrderStatus::Cancelled)
        );
    }

    #[test]
    fn payment_terminal_statuses() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Success.is_terminal());
        assert!(PaymentStatus::Cancel.is_terminal());
        assert!(PaymentStatus::Expired.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
    }

    #[test]
    fn status_strings_match_persisted_vocabulary() {
        assert_eq!(ItemStatus::Pending.to_string(), "pending");
        assert_eq!(ItemStatus::Delivered.to_string(), "delivered");
        assert_eq!(OrderStatus::Completed.to_string(), "completed");
        assert_eq!(PaymentStatus::Expired.to_string(), "expired");
    }
}
