use crate::shopping::repo::ShoppingCategory;

/// Flips one item's checked flag in place. Returns false without touching
/// anything when either index is out of bounds.
pub fn set_item_checked(
    categories: &mut [ShoppingCategory],
    category_index: usize,
    item_index: usize,
    checked: bool,
) -> bool {
    match categories
        .get_mut(category_index)
        .and_then(|c| c.items.get_mut(item_index))
    {
        Some(item) => {
            item.checked = checked;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod toggle_tests {
    use super::*;
    use crate::shopping::repo::ShoppingItem;

    fn categories() -> Vec<ShoppingCategory> {
        vec![ShoppingCategory {
            category: "Frugt og Grønt".into(),
            items: vec![
                ShoppingItem {
                    name: "Æbler".into(),
                    amount: "6 stk".into(),
                    checked: false,
                },
                ShoppingItem {
                    name: "Gulerødder".into(),
                    amount: "500g".into(),
                    checked: false,
                },
            ],
        }]
    }

    #[test]
    fn test_toggle_in_range() {
        let mut cats = categories();
        assert!(set_item_checked(&mut cats, 0, 1, true));
        assert!(cats[0].items[1].checked);
        assert!(!cats[0].items[0].checked);
    }

    #[test]
    fn test_toggle_is_idempotent() {
        let mut cats = categories();
        assert!(set_item_checked(&mut cats, 0, 0, true));
        assert!(set_item_checked(&mut cats, 0, 0, true));
        assert!(cats[0].items[0].checked);

        assert!(set_item_checked(&mut cats, 0, 0, false));
        assert!(!cats[0].items[0].checked);
    }

    #[test]
    fn test_toggle_out_of_range_leaves_data_untouched() {
        let mut cats = categories();
        assert!(!set_item_checked(&mut cats, 1, 0, true));
        assert!(!set_item_checked(&mut cats, 0, 2, true));
        assert!(cats[0].items.iter().all(|i| !i.checked));
    }
}
