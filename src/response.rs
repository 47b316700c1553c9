use crate::category::Category;
use crate::knowledge::TourismItem;

const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// Full card for a single item. Optional fields are appended in a fixed order
/// and only when present.
pub fn render_item(item: &TourismItem) -> String {
    let (Some(name), Some(description)) = (&item.name, &item.description) else {
        return format!(
            "Sorry, I don't have enough information about this {}.",
            item.category
        );
    };

    let mut response = format!("**{}** - {}\n\n", name, description);
    if let Some(address) = &item.address {
        response.push_str(&format!("📍 **Address**: {}\n\n", address));
    }
    if let Some(timings_price) = &item.timings_price {
        response.push_str(&format!("⏰ **Hours/Price**: {}\n\n", timings_price));
    }
    if let Some(directions) = &item.directions {
        response.push_str(&format!("🚗 **Getting There**: {}\n\n", directions));
    }
    if let Some(map_url) = &item.map_url {
        response.push_str(&format!("🗺️ [View on Map]({})", map_url));
    }
    response
}

/// Numbered list of the first `limit` items, in the order given.
pub fn render_list(items: &[&TourismItem], category: &Category, limit: usize) -> String {
    let plural = category.plural();
    let mut response = format!("Here are some top {} in Bangalore:\n\n", plural);

    for (i, item) in items.iter().take(limit).enumerate() {
        let name = item.name.as_deref().unwrap_or_default();
        let preview: String = item
            .description
            .as_deref()
            .unwrap_or_default()
            .chars()
            .take(DESCRIPTION_PREVIEW_CHARS)
            .collect();
        response.push_str(&format!("{}. **{}** - {}...\n", i + 1, name, preview));
        if let Some(address) = &item.address {
            response.push_str(&format!("   📍 {}\n", address));
        }
        response.push('\n');
    }

    response.push_str(&format!(
        "\nWould you like more details about any of these {}?",
        plural
    ));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::tests::item;

    #[test]
    fn item_with_all_fields_keeps_field_order() {
        let mut lalbagh = item("Lalbagh", "place", "A 240-acre botanical garden.");
        lalbagh.address = Some("Mavalli, Bengaluru".to_string());
        lalbagh.timings_price = Some("6am-7pm, Rs 30".to_string());
        lalbagh.directions = Some("Lalbagh metro station".to_string());
        lalbagh.map_url = Some("https://maps.example/lalbagh".to_string());

        assert_eq!(
            render_item(&lalbagh),
            "**Lalbagh** - A 240-acre botanical garden.\n\n\
             📍 **Address**: Mavalli, Bengaluru\n\n\
             ⏰ **Hours/Price**: 6am-7pm, Rs 30\n\n\
             🚗 **Getting There**: Lalbagh metro station\n\n\
             🗺️ [View on Map](https://maps.example/lalbagh)"
        );
    }

    #[test]
    fn item_omits_missing_fields() {
        let mut mtr = item("MTR", "restaurant", "Dosa since 1924.");
        mtr.directions = Some("Near Lalbagh west gate".to_string());

        let rendered = render_item(&mtr);
        assert_eq!(
            rendered,
            "**MTR** - Dosa since 1924.\n\n🚗 **Getting There**: Near Lalbagh west gate\n\n"
        );
        assert!(!rendered.contains("Address"));
        assert!(!rendered.contains("View on Map"));
    }

    #[test]
    fn item_without_description_apologises() {
        let mut hotel = item("Taj", "hotel", "");
        hotel.description = None;
        assert_eq!(
            render_item(&hotel),
            "Sorry, I don't have enough information about this hotel."
        );
    }

    #[test]
    fn list_truncates_to_limit_and_keeps_order() {
        let hotels: Vec<TourismItem> = (1..=8)
            .map(|i| item(&format!("Hotel {}", i), "hotel", &"x".repeat(150)))
            .collect();
        let refs: Vec<&TourismItem> = hotels.iter().collect();

        let rendered = render_list(&refs, &Category::new("hotel"), 5);
        assert!(rendered.starts_with("Here are some top hotels in Bangalore:\n\n"));
        assert!(rendered.ends_with("\nWould you like more details about any of these hotels?"));
        for i in 1..=5 {
            assert!(rendered.contains(&format!("{}. **Hotel {}** - {}...\n", i, i, "x".repeat(100))));
        }
        assert!(!rendered.contains("6. "));
        assert!(!rendered.contains("Hotel 6"));
    }

    #[test]
    fn list_shows_address_when_present() {
        let mut a = item("A", "place", "short");
        a.address = Some("MG Road".to_string());
        let b = item("B", "place", "also short");
        let rendered = render_list(&[&a, &b], &Category::new("place"), 5);
        assert_eq!(
            rendered,
            "Here are some top places in Bangalore:\n\n\
             1. **A** - short...\n   📍 MG Road\n\n\
             2. **B** - also short...\n\n\
             \nWould you like more details about any of these places?"
        );
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        let temple = item("Temple", "place", &"ಬೆಂ".repeat(50));
        let rendered = render_list(&[&temple], &Category::new("place"), 5);
        let expected: String = "ಬೆಂ".repeat(50).chars().take(100).collect();
        assert!(rendered.contains(&format!("{}...", expected)));
    }
}
