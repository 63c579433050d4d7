//! Macro-generated test suite for `CatStore` contract validation.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use pawprint::storage::InMemoryCatStore;
//!
//! cat_store_tests!(InMemoryCatStore::new());
//! ```
//!
//! # Generated Tests
//!
//! ## Records
//! - `test_insert_and_get` — every field survives a round trip through the store
//! - `test_get_nonexistent` — unknown id returns None
//! - `test_list_newest_first`
//! - `test_set_status` / `test_delete` — report whether a row was touched
//!
//! ## Pages
//! - `test_full_scan_order` — every sort order, ties broken by id
//! - `test_keyset_walk` — pages of 5 chained by last id cover the order exactly
//! - `test_take_limits_rows`
//! - `test_filters` — every predicate field, including literal LIKE wildcards
//! - `test_inverted_age_range_matches_nothing`
//! - `test_cursor_outside_filter` — a cursor need not match the predicate
//! - `test_unknown_cursor`
//!
//! ## Applications
//! - `test_application_round_trip` — newest first per user, pending count from rows
//! - `test_one_pending_application_per_user`
//! - `test_delete_cascades_to_applications`
//!
//! ## Concurrency
//! - `test_concurrent_inserts`
//! - `test_cursor_deleted_while_paging` — a page is complete or the cursor is reported missing

/// Generate a full `CatStore` conformance test suite.
///
/// `$factory` must evaluate to an empty store implementing
/// `CatStore + Clone + 'static`. It is re-evaluated for each test.
#[macro_export]
macro_rules! cat_store_tests {
    ($factory:expr) => {
        mod cat_store_contract_tests {
            use super::*;
            use pawprint::prelude::*;

            // ==================================================================
            // Records
            // ==================================================================

            #[tokio::test]
            async fn test_insert_and_get() {
                let store = $factory;
                let mut cat = harness_cat(42, "Pepper", 5, 9, Sex::Female, CatStatus::Pending);
                cat.owner_id = Some(Uuid::new_v4());
                cat.primary_image_url = Some("https://img.example/pepper.jpg".to_string());

                let inserted = store.insert(cat.clone()).await.unwrap();
                assert_eq!(inserted, cat);

                let fetched = store.get(&cat.id).await.unwrap();
                assert_eq!(fetched, Some(cat));
            }

            #[tokio::test]
            async fn test_get_nonexistent() {
                let store = $factory;
                assert!(store.get(&Uuid::new_v4()).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_list_newest_first() {
                let store = $factory;
                let cats = catalogue();
                load(&store, &cats).await;

                let listed = store.list().await.unwrap();
                let order = SortOrder::new(SortBy::CreatedAt, SortDir::Desc);
                assert_eq!(ids(&listed), expected_ids(&cats, &CatFilter::default(), order));
            }

            #[tokio::test]
            async fn test_set_status() {
                let store = $factory;
                let cats = catalogue();
                load(&store, &cats).await;

                assert!(store.set_status(&cats[0].id, CatStatus::Adopted).await.unwrap());
                let cat = store.get(&cats[0].id).await.unwrap().unwrap();
                assert_eq!(cat.status, CatStatus::Adopted);

                assert!(!store
                    .set_status(&Uuid::new_v4(), CatStatus::Adopted)
                    .await
                    .unwrap());
            }

            #[tokio::test]
            async fn test_delete() {
                let store = $factory;
                let cats = catalogue();
                load(&store, &cats).await;

                assert!(store.delete(&cats[3].id).await.unwrap());
                assert!(store.get(&cats[3].id).await.unwrap().is_none());
                assert!(!store.delete(&cats[3].id).await.unwrap());
                assert_eq!(store.list().await.unwrap().len(), cats.len() - 1);
            }

            // ==================================================================
            // Pages
            // ==================================================================

            #[tokio::test]
            async fn test_full_scan_order() {
                let store = $factory;
                let cats = catalogue();
                load(&store, &cats).await;

                let filter = CatFilter::default();
                for order in ALL_ORDERS {
                    let page = store.fetch_page(&filter, order, None, 100).await.unwrap();
                    assert_eq!(ids(&page), expected_ids(&cats, &filter, order), "{:?}", order);
                }
            }

            #[tokio::test]
            async fn test_keyset_walk() {
                let store = $factory;
                let cats = catalogue();
                load(&store, &cats).await;

                let filter = CatFilter::default();
                for order in ALL_ORDERS {
                    let mut walked = Vec::new();
                    let mut after = None;
                    loop {
                        let page = store.fetch_page(&filter, order, after, 5).await.unwrap();
                        assert!(page.len() <= 5);
                        walked.extend(ids(&page));
                        match page.last() {
                            Some(last) if page.len() == 5 => after = Some(last.id),
                            _ => break,
                        }
                    }
                    assert_eq!(walked, expected_ids(&cats, &filter, order), "{:?}", order);
                }
            }

            #[tokio::test]
            async fn test_take_limits_rows() {
                let store = $factory;
                load(&store, &catalogue()).await;

                let page = store
                    .fetch_page(&CatFilter::default(), SortOrder::default(), None, 4)
                    .await
                    .unwrap();
                assert_eq!(page.len(), 4);
            }

            #[tokio::test]
            async fn test_filters() {
                let store = $factory;
                let cats = catalogue();
                load(&store, &cats).await;

                let filters = vec![
                    CatFilter {
                        statuses: Some(vec![CatStatus::Available]),
                        ..Default::default()
                    },
                    CatFilter {
                        sexes: Some(vec![Sex::Male, Sex::Unknown]),
                        ..Default::default()
                    },
                    CatFilter {
                        min_age: Some(3),
                        max_age: Some(14),
                        ..Default::default()
                    },
                    CatFilter {
                        breeds: Some(vec!["Siamese".to_string()]),
                        vaccinated: Some(true),
                        ..Default::default()
                    },
                    CatFilter {
                        desexed: Some(false),
                        microchipped: Some(false),
                        ..Default::default()
                    },
                    CatFilter {
                        name_contains: Some("lu".to_string()),
                        ..Default::default()
                    },
                    CatFilter {
                        name_contains: Some("bel".to_string()),
                        ..Default::default()
                    },
                    CatFilter {
                        name_contains: Some("0% t".to_string()),
                        ..Default::default()
                    },
                    CatFilter {
                        name_contains: Some("a_j".to_string()),
                        ..Default::default()
                    },
                    CatFilter {
                        statuses: Some(vec![CatStatus::Available, CatStatus::Pending]),
                        sexes: Some(vec![Sex::Female]),
                        min_age: Some(10),
                        name_contains: Some("l".to_string()),
                        ..Default::default()
                    },
                ];

                let order = SortOrder::new(SortBy::Name, SortDir::Asc);
                for filter in filters {
                    let page = store.fetch_page(&filter, order, None, 100).await.unwrap();
                    let expected = expected_ids(&cats, &filter, order);
                    assert!(!expected.is_empty(), "{:?}", filter);
                    assert_eq!(ids(&page), expected, "{:?}", filter);
                }

                // `_` and `%` are literal, not wildcards
                for text in ["_", "%", "l_na"] {
                    let filter = CatFilter {
                        name_contains: Some(text.to_string()),
                        ..Default::default()
                    };
                    let page = store.fetch_page(&filter, order, None, 100).await.unwrap();
                    assert_eq!(ids(&page), expected_ids(&cats, &filter, order), "{}", text);
                }
            }

            #[tokio::test]
            async fn test_inverted_age_range_matches_nothing() {
                let store = $factory;
                load(&store, &catalogue()).await;

                let filter = CatFilter {
                    min_age: Some(20),
                    max_age: Some(10),
                    ..Default::default()
                };
                let page = store
                    .fetch_page(&filter, SortOrder::default(), None, 100)
                    .await
                    .unwrap();
                assert!(page.is_empty());
            }

            #[tokio::test]
            async fn test_cursor_outside_filter() {
                let store = $factory;
                let cats = catalogue();
                load(&store, &cats).await;

                let filter = CatFilter {
                    statuses: Some(vec![CatStatus::Available]),
                    ..Default::default()
                };
                let order = SortOrder::new(SortBy::CreatedAt, SortDir::Asc);
                // Oliver (created 20) is adopted, so outside the filter
                let cursor = &cats[3];

                let page = store
                    .fetch_page(&filter, order, Some(cursor.id), 100)
                    .await
                    .unwrap();
                let expected: Vec<Uuid> = expected_ids(&cats, &filter, order)
                    .into_iter()
                    .filter(|id| {
                        let cat = cats.iter().find(|c| c.id == *id).unwrap();
                        order.is_after(cat, cursor)
                    })
                    .collect();
                assert_eq!(ids(&page), expected);
                // Lucy shares Oliver's timestamp but has a larger id
                assert_eq!(page[0].name, "Lucy");
            }

            #[tokio::test]
            async fn test_unknown_cursor() {
                let store = $factory;
                load(&store, &catalogue()).await;

                let missing = Uuid::new_v4();
                let err = store
                    .fetch_page(&CatFilter::default(), SortOrder::default(), Some(missing), 10)
                    .await
                    .unwrap_err();
                assert!(matches!(err, StoreError::CursorNotFound { id } if id == missing));
            }

            // ==================================================================
            // Applications
            // ==================================================================

            #[tokio::test]
            async fn test_application_round_trip() {
                let store = $factory;
                let cats = catalogue();
                load(&store, &cats).await;
                let user = Uuid::new_v4();

                let older = harness_application(&cats[0], user, 1);
                let newer = harness_application(&cats[1], user, 2);
                let other = harness_application(&cats[0], Uuid::new_v4(), 3);
                for app in [&older, &newer, &other] {
                    assert!(store.insert_application(app).await.unwrap());
                }

                assert_eq!(store.get_application(&older.id).await.unwrap(), Some(older.clone()));
                assert!(store.get_application(&Uuid::new_v4()).await.unwrap().is_none());

                let mine = store.applications_for_user(&user).await.unwrap();
                assert_eq!(mine, vec![newer.clone(), older.clone()]);
                assert_eq!(store.pending_applications(&cats[0].id).await.unwrap(), 2);

                let rejected = store
                    .set_application_status(&other.id, ApplicationStatus::Rejected)
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(rejected.status, ApplicationStatus::Rejected);
                assert_eq!(rejected.cat_id, other.cat_id);
                assert_eq!(store.pending_applications(&cats[0].id).await.unwrap(), 1);
                assert_eq!(store.pending_applications(&cats[2].id).await.unwrap(), 0);

                assert!(store
                    .set_application_status(&Uuid::new_v4(), ApplicationStatus::Approved)
                    .await
                    .unwrap()
                    .is_none());
            }

            #[tokio::test]
            async fn test_one_pending_application_per_user() {
                let store = $factory;
                let cats = catalogue();
                load(&store, &cats).await;
                let user = Uuid::new_v4();

                let first = harness_application(&cats[0], user, 1);
                assert!(store.insert_application(&first).await.unwrap());
                assert!(!store
                    .insert_application(&harness_application(&cats[0], user, 2))
                    .await
                    .unwrap());

                store
                    .set_application_status(&first.id, ApplicationStatus::Rejected)
                    .await
                    .unwrap();
                assert!(store
                    .insert_application(&harness_application(&cats[0], user, 3))
                    .await
                    .unwrap());
                assert_eq!(store.applications_for_user(&user).await.unwrap().len(), 2);
            }

            #[tokio::test]
            async fn test_delete_cascades_to_applications() {
                let store = $factory;
                let cats = catalogue();
                load(&store, &cats).await;
                let user = Uuid::new_v4();

                let doomed = harness_application(&cats[0], user, 1);
                let kept = harness_application(&cats[1], user, 2);
                store.insert_application(&doomed).await.unwrap();
                store.insert_application(&kept).await.unwrap();

                assert!(store.delete(&cats[0].id).await.unwrap());
                assert!(store.get_application(&doomed.id).await.unwrap().is_none());
                assert_eq!(store.applications_for_user(&user).await.unwrap(), vec![kept]);
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_inserts() {
                let store = $factory;
                let mut handles = Vec::new();
                for i in 0..10u128 {
                    let store = store.clone();
                    handles.push(tokio::spawn(async move {
                        let cat = harness_cat(100 + i, "Twin", 1, 1, Sex::Male, CatStatus::Available);
                        store.insert(cat).await.unwrap();
                    }));
                }
                for handle in handles {
                    handle.await.unwrap();
                }
                assert_eq!(store.list().await.unwrap().len(), 10);
            }

            #[tokio::test]
            async fn test_cursor_deleted_while_paging() {
                let store = $factory;
                let cats = catalogue();
                load(&store, &cats).await;

                let filter = CatFilter::default();
                let order = SortOrder::new(SortBy::CreatedAt, SortDir::Asc);
                let cursor = cats[5].clone();
                let remainder: Vec<Uuid> = expected_ids(&cats, &filter, order)
                    .into_iter()
                    .filter(|id| {
                        let cat = cats.iter().find(|c| c.id == *id).unwrap();
                        order.is_after(cat, &cursor)
                    })
                    .collect();
                assert!(!remainder.is_empty());

                let mut readers = Vec::new();
                for _ in 0..8 {
                    let store = store.clone();
                    let filter = filter.clone();
                    let cursor_id = cursor.id;
                    readers.push(tokio::spawn(async move {
                        store.fetch_page(&filter, order, Some(cursor_id), 100).await
                    }));
                }
                let deleter = {
                    let store = store.clone();
                    let cursor_id = cursor.id;
                    tokio::spawn(async move { store.delete(&cursor_id).await })
                };

                for reader in readers {
                    match reader.await.unwrap() {
                        Ok(page) => assert_eq!(ids(&page), remainder),
                        Err(StoreError::CursorNotFound { id }) => assert_eq!(id, cursor.id),
                        Err(other) => panic!("unexpected store error: {}", other),
                    }
                }
                assert!(deleter.await.unwrap().unwrap());

                let err = store
                    .fetch_page(&filter, order, Some(cursor.id), 100)
                    .await
                    .unwrap_err();
                assert!(matches!(err, StoreError::CursorNotFound { .. }));
            }
        }
    };
}
