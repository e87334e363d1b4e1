use super::*;

#[test]
fn toggle_adds_like_for_new_visitor() {
    let before = LikeSummary { like_count: 4, liked: false };
    assert_eq!(before.toggled(), LikeSummary { like_count: 5, liked: true });
}

#[test]
fn toggle_removes_existing_like() {
    let before = LikeSummary { like_count: 5, liked: true };
    assert_eq!(before.toggled(), LikeSummary { like_count: 4, liked: false });
}

#[test]
fn toggling_twice_restores_original_count() {
    for before in [
        LikeSummary { like_count: 0, liked: false },
        LikeSummary { like_count: 7, liked: false },
        LikeSummary { like_count: 3, liked: true },
    ] {
        assert_eq!(before.toggled().toggled(), before);
    }
}

#[test]
fn unlike_never_goes_negative() {
    let inconsistent = LikeSummary { like_count: 0, liked: true };
    assert_eq!(inconsistent.toggled().like_count, 0);
}

#[test]
fn default_summary_is_unliked_zero() {
    assert_eq!(LikeSummary::default(), LikeSummary { like_count: 0, liked: false });
}

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::state::test_helpers::integration_pool;

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn toggle_like_twice_restores_count_in_db() {
        let pool = integration_pool().await;
        let product_id: Uuid = sqlx::query_scalar(
            "INSERT INTO products (name, price, category) VALUES ('Test Slide', 100, 'Slides') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        let session = format!("anon_test_{}", Uuid::new_v4().simple());
        let first = toggle_like(&pool, product_id, &session).await.unwrap();
        assert_eq!(first, LikeSummary { like_count: 1, liked: true });
        let second = toggle_like(&pool, product_id, &session).await.unwrap();
        assert_eq!(second, LikeSummary { like_count: 0, liked: false });

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn toggle_like_missing_product_is_not_found() {
        let pool = integration_pool().await;
        let err = toggle_like(&pool, Uuid::new_v4(), "anon_missing").await.unwrap_err();
        assert!(matches!(err, LikeError::ProductNotFound(_)));
    }
}
