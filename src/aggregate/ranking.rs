//! Top-N product and customer rankings.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::rollup::ratio;
use crate::models::{Order, OrderLineItem, TopCustomer, TopProduct};

#[derive(Default)]
struct ProductTally<'a> {
    title: Option<&'a str>,
    revenue: f64,
    quantity: i64,
    orders: HashSet<&'a str>,
}

/// Products by line-item revenue, highest first, truncated to `limit`.
pub fn top_products(items: &[OrderLineItem], limit: usize) -> Vec<TopProduct> {
    let mut tallies: HashMap<&str, ProductTally<'_>> = HashMap::new();
    for item in items {
        let t = tallies.entry(item.product_id.as_str()).or_default();
        if t.title.is_none() {
            t.title = item.product_title.as_deref();
        }
        t.revenue += item.revenue();
        t.quantity += item.quantity;
        t.orders.insert(item.order_id.as_str());
    }

    let mut ranked: Vec<TopProduct> = tallies
        .into_iter()
        .map(|(id, t)| TopProduct {
            product_id: id.to_string(),
            title: t.title.map(str::to_string),
            revenue: t.revenue,
            quantity: t.quantity,
            orders: t.orders.len() as u64,
        })
        .collect();
    ranked.sort_by(|a, b| {
        by_revenue_desc(a.revenue, b.revenue).then_with(|| a.product_id.cmp(&b.product_id))
    });
    ranked.truncate(limit);
    ranked
}

/// Customers by order revenue, highest first, truncated to `limit`.
/// Orders without a customer are ignored.
pub fn top_customers(orders: &[Order], limit: usize) -> Vec<TopCustomer> {
    let mut tallies: HashMap<&str, (f64, HashSet<&str>)> = HashMap::new();
    for order in orders {
        if let Some(cid) = order.customer_id.as_deref() {
            let t = tallies.entry(cid).or_default();
            t.0 += order.total_price;
            t.1.insert(order.id.as_str());
        }
    }

    let mut ranked: Vec<TopCustomer> = tallies
        .into_iter()
        .map(|(id, (revenue, ids))| TopCustomer {
            customer_id: id.to_string(),
            revenue,
            orders: ids.len() as u64,
            avg_order_value: ratio(revenue, ids.len() as f64),
        })
        .collect();
    ranked.sort_by(|a, b| {
        by_revenue_desc(a.revenue, b.revenue).then_with(|| a.customer_id.cmp(&b.customer_id))
    });
    ranked.truncate(limit);
    ranked
}

fn by_revenue_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
