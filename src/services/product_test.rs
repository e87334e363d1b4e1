use super::*;

fn input() -> ProductInput {
    ProductInput {
        name: "  Royal Castle  ".into(),
        description: " Big and bouncy ".into(),
        price: 8000.0,
        category: "Bouncing Castles".into(),
        image_url: Some("   ".into()),
        is_active: true,
    }
}

fn stored() -> Product {
    Product {
        id: Uuid::nil(),
        name: "Royal Castle".into(),
        description: "Big and bouncy".into(),
        price: 8000.0,
        category: "Bouncing Castles".into(),
        image_url: Some("https://cdn.example.com/castle.jpg".into()),
        is_active: true,
        created_at: "2026-01-01T00:00:00Z".into(),
        updated_at: "2026-01-01T00:00:00Z".into(),
    }
}

#[test]
fn categories_start_with_all() {
    assert_eq!(CATEGORIES[0], ALL_CATEGORIES);
    assert_eq!(CATEGORIES.len(), 11);
}

#[test]
fn all_is_not_a_product_category() {
    assert!(!is_product_category("All"));
    assert!(is_product_category("Trains"));
    assert!(!is_product_category("trains"));
}

#[test]
fn category_filter_treats_all_and_blank_as_unfiltered() {
    assert_eq!(category_filter(None), None);
    assert_eq!(category_filter(Some("All")), None);
    assert_eq!(category_filter(Some("  ")), None);
    assert_eq!(category_filter(Some(" Slides ")), Some("Slides"));
}

#[test]
fn validate_trims_and_drops_blank_image() {
    let valid = validate_product(input()).unwrap();
    assert_eq!(valid.name, "Royal Castle");
    assert_eq!(valid.description, "Big and bouncy");
    assert_eq!(valid.image_url, None);
}

#[test]
fn validate_rejects_blank_name() {
    let mut bad = input();
    bad.name = "   ".into();
    assert!(matches!(validate_product(bad), Err(ProductError::Invalid("Product name is required"))));
}

#[test]
fn validate_rejects_negative_or_nan_price() {
    for price in [-1.0, f64::NAN, f64::INFINITY] {
        let mut bad = input();
        bad.price = price;
        assert!(matches!(validate_product(bad), Err(ProductError::Invalid(_))), "price {price} should fail");
    }
}

#[test]
fn validate_rejects_all_and_unknown_categories() {
    for category in ["All", "Spaceships"] {
        let mut bad = input();
        bad.category = category.into();
        assert!(matches!(validate_product(bad), Err(ProductError::Invalid("Unknown category"))));
    }
}

#[test]
fn input_defaults_to_active_without_description() {
    let parsed: ProductInput =
        serde_json::from_str(r#"{"name":"Pony","price":1500,"category":"Horse and Camel Riding"}"#).unwrap();
    assert!(parsed.is_active);
    assert!(parsed.description.is_empty());
    assert!(parsed.image_url.is_none());
}

#[test]
fn merge_patch_keeps_untouched_fields() {
    let patch = ProductPatch { price: Some(9500.0), ..ProductPatch::default() };
    let merged = merge_patch(&stored(), patch).unwrap();
    assert_eq!(merged.name, "Royal Castle");
    assert!((merged.price - 9500.0).abs() < f64::EPSILON);
    assert_eq!(merged.image_url.as_deref(), Some("https://cdn.example.com/castle.jpg"));
}

#[test]
fn patch_null_image_clears_it_but_absent_keeps_it() {
    let clear: ProductPatch = serde_json::from_str(r#"{"image_url":null}"#).unwrap();
    assert_eq!(clear.image_url, Some(None));
    assert_eq!(merge_patch(&stored(), clear).unwrap().image_url, None);

    let keep: ProductPatch = serde_json::from_str(r#"{"is_active":false}"#).unwrap();
    assert_eq!(keep.image_url, None);
    let merged = merge_patch(&stored(), keep).unwrap();
    assert!(merged.image_url.is_some());
    assert!(!merged.is_active);
}

#[test]
fn merge_patch_validates_result() {
    let patch = ProductPatch { category: Some("All".into()), ..ProductPatch::default() };
    assert!(matches!(merge_patch(&stored(), patch), Err(ProductError::Invalid(_))));
}

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::state::test_helpers::integration_pool;

    fn unique_input(is_active: bool) -> ProductInput {
        ProductInput {
            name: format!("Live Castle {}", Uuid::new_v4().simple()),
            description: "Integration fixture".into(),
            price: 6000.0,
            category: "Bouncing Castles".into(),
            image_url: Some("https://img.example/castle.jpg".into()),
            is_active,
        }
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn product_create_partial_update_and_delete() {
        let pool = integration_pool().await;
        let created = create(&pool, validate_product(unique_input(true)).unwrap()).await.unwrap();
        assert_eq!(get_active(&pool, created.id).await.unwrap(), created);

        let patch = ProductPatch { price: Some(7500.0), ..ProductPatch::default() };
        let updated = update(&pool, created.id, patch).await.unwrap();
        assert!((updated.price - 7500.0).abs() < f64::EPSILON);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.image_url, created.image_url);
        assert!(updated.is_active);

        delete(&pool, created.id).await.unwrap();
        assert!(matches!(get(&pool, created.id).await, Err(ProductError::NotFound(_))));
        assert!(matches!(delete(&pool, created.id).await, Err(ProductError::NotFound(_))));
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn inactive_product_is_hidden_from_catalog_but_not_admin() {
        let pool = integration_pool().await;
        let created = create(&pool, validate_product(unique_input(false)).unwrap()).await.unwrap();

        assert!(matches!(get_active(&pool, created.id).await, Err(ProductError::NotFound(_))));
        assert!(!list_active(&pool, None).await.unwrap().iter().any(|p| p.id == created.id));
        assert!(list_all(&pool).await.unwrap().iter().any(|p| p.id == created.id));

        delete(&pool, created.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn update_missing_product_is_not_found() {
        let pool = integration_pool().await;
        let err = update(&pool, Uuid::new_v4(), ProductPatch::default()).await.unwrap_err();
        assert!(matches!(err, ProductError::NotFound(_)));
    }
}
