//! # HTTP Routes
//!
//! Each module exposes a `router()` returning `Router<AppState>`; they are
//! mounted under `/api` by [`crate::build_router`].
//!
//! | Module     | Prefix                 | Audience        |
//! |------------|------------------------|-----------------|
//! | `health`   | `/api/health`          | load balancers  |
//! | `menu`     | `/api/menu`, specialty | storefront      |
//! | `cart`     | `/api/cart`            | storefront      |
//! | `checkout` | `/api/checkout`, order | storefront      |
//! | `admin`    | `/api/admin`           | staff           |
//! | `kitchen`  | `/api/kitchen`         | kitchen display |

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod kitchen;
pub mod menu;

use serde::{Deserialize, Serialize};

use pizzeria_core::{Order, OrderItem, OrderItemCustomization};
use pizzeria_db::Database;

use crate::error::ApiResult;

/// Default and maximum page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 200;

/// `?limit=&offset=` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Pagination {
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }
}

/// One order line with its chosen options.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineDetail {
    #[serde(flatten)]
    pub item: OrderItem,
    pub customizations: Vec<OrderItemCustomization>,
}

/// An order with all of its lines, as returned after checkout and by the
/// order lookups.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderLineDetail>,
}

impl OrderDetail {
    pub async fn load(db: &Database, order: Order) -> ApiResult<Self> {
        let repo = db.orders();
        let items = repo.get_items(&order.id).await?;
        let mut customizations = repo.get_item_customizations(&order.id).await?;

        let items = items
            .into_iter()
            .map(|item| {
                let (mine, rest): (Vec<_>, Vec<_>) = customizations
                    .drain(..)
                    .partition(|c| c.order_item_id == item.id);
                customizations = rest;
                OrderLineDetail {
                    item,
                    customizations: mine,
                }
            })
            .collect();

        Ok(OrderDetail { order, items })
    }
}
