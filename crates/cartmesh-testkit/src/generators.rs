//! Proptest generators for property-based testing.

use proptest::prelude::*;

use cartmesh_core::{CartItem, ItemId, PeerId, Product, UpdateId};

/// Generate a random ItemId.
pub fn item_id() -> impl Strategy<Value = ItemId> {
    any::<[u8; 16]>().prop_map(ItemId::from_bytes)
}

/// Generate a random UpdateId.
pub fn update_id() -> impl Strategy<Value = UpdateId> {
    any::<[u8; 16]>().prop_map(UpdateId::from_bytes)
}

/// Generate a random PeerId.
pub fn peer_id() -> impl Strategy<Value = PeerId> {
    any::<[u8; 32]>().prop_map(PeerId::from_bytes)
}

/// Generate a product title.
pub fn title() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,31}".prop_map(String::from)
}

/// Generate a price display string.
pub fn price() -> impl Strategy<Value = String> {
    (1u32..100_000u32).prop_map(|cents| format!("${}.{:02}", cents / 100, cents % 100))
}

/// Generate a product.
pub fn product() -> impl Strategy<Value = Product> {
    (title(), price()).prop_map(|(title, price)| {
        let slug: String = title
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        Product::new(
            title,
            format!("https://shop.example/img/{slug}.jpg"),
            price,
            format!("https://shop.example/buy/{slug}"),
        )
    })
}

/// Generate a cart item with a random id.
pub fn cart_item() -> impl Strategy<Value = CartItem> {
    (item_id(), product()).prop_map(|(id, product)| CartItem::with_id(id, product))
}

/// Generate a cart of at most `max_len` items.
pub fn cart(max_len: usize) -> impl Strategy<Value = Vec<CartItem>> {
    prop::collection::vec(cart_item(), 0..=max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_items_roundtrip_ids(item in cart_item()) {
            let recovered = ItemId::from_hex(&item.id.to_hex()).unwrap();
            prop_assert_eq!(recovered, item.id);
        }

        #[test]
        fn generated_carts_respect_bound(cart in cart(8)) {
            prop_assert!(cart.len() <= 8);
        }
    }
}
