mod common;

use std::time::Duration;

use uuid::Uuid;

use common::{Harness, Seed, draft};
use inkpost_core::DomainError;
use inkpost_core::cancel::run_cancellable;
use inkpost_core::domain::{NewPost, PostUpdate, Role};
use inkpost_core::ports::{BaseRepository, PostRepository};
use inkpost_core::services::Actor;

#[tokio::test]
async fn create_uploads_image_and_starts_unfeatured() {
    let h = Harness::new();
    let ada = h.user("ada", Role::User).await;

    let post = h
        .service
        .create_post(
            ada.id,
            NewPost {
                image: Some("data:image/png;base64,AAAA".into()),
                ..draft("With Cover")
            },
        )
        .await
        .unwrap();

    let image = post.image.clone().expect("image reference");
    assert!(h.images.contains(&image.public_id).await);
    assert_eq!(post.user_id, ada.id);
    assert_eq!(post.visit, 0);
    assert!(!post.is_featured);
}

#[tokio::test]
async fn create_rejects_unknown_author_and_blank_title() {
    let h = Harness::new();

    let unknown = h.service.create_post(Uuid::new_v4(), draft("Hi")).await;
    assert!(matches!(unknown, Err(DomainError::NotFound { .. })));

    let ada = h.user("ada", Role::User).await;
    let blank = h.service.create_post(ada.id, draft("   ")).await;
    assert!(matches!(blank, Err(DomainError::InvalidInput(_))));
}

#[tokio::test]
async fn failed_create_discards_the_uploaded_image() {
    let h = Harness::new();
    let ada = h.user("ada", Role::User).await;
    h.posts
        .always_conflict
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let result = h
        .service
        .create_post(
            ada.id,
            NewPost {
                image: Some("https://cdn.example.com/x.png".into()),
                ..draft("Doomed")
            },
        )
        .await;

    assert!(result.is_err());
    assert_eq!(h.images.len().await, 0);
}

#[tokio::test]
async fn update_keeps_untouched_fields_and_reslugs_on_title_change() {
    let h = Harness::new();
    let ada = h.user("ada", Role::User).await;
    let post = h.service.create_post(ada.id, draft("First Name")).await.unwrap();

    let updated = h
        .service
        .update_post(
            Actor::new(ada.id, Role::User),
            post.id,
            PostUpdate {
                title: Some("Second Name".into()),
                desc: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.slug, "second-name");
    assert_eq!(updated.desc, post.desc);
    assert_eq!(updated.category, post.category);
    assert_eq!(updated.created_at, post.created_at);
}

#[tokio::test]
async fn update_replaces_and_discards_old_image() {
    let h = Harness::new();
    let ada = h.user("ada", Role::User).await;
    let post = h
        .service
        .create_post(
            ada.id,
            NewPost {
                image: Some("https://cdn.example.com/old.png".into()),
                ..draft("Pictured")
            },
        )
        .await
        .unwrap();
    let old = post.image.clone().unwrap();

    let updated = h
        .service
        .update_post(
            Actor::new(ada.id, Role::User),
            post.id,
            PostUpdate {
                image: Some("https://cdn.example.com/new.png".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let new = updated.image.unwrap();
    assert_eq!(new.url, "https://cdn.example.com/new.png");
    assert!(!h.images.contains(&old.public_id).await);
    assert!(h.images.contains(&new.public_id).await);
}

#[tokio::test]
async fn only_owner_or_admin_may_modify() {
    let h = Harness::new();
    let ada = h.user("ada", Role::User).await;
    let eve = h.user("eve", Role::User).await;
    let root = h.user("root", Role::Admin).await;
    let post = h.seed(&ada, Seed::titled("Guarded")).await;

    let denied = h
        .service
        .update_post(
            Actor::new(eve.id, eve.role),
            post.id,
            PostUpdate {
                content: Some("defaced".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(denied, Err(DomainError::Forbidden(_))));

    let denied = h
        .service
        .delete_post(Actor::new(eve.id, eve.role), post.id)
        .await;
    assert!(matches!(denied, Err(DomainError::Forbidden(_))));

    h.service
        .delete_post(Actor::new(root.id, root.role), post.id)
        .await
        .unwrap();
    assert!(h.posts.find_by_id(post.id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_removes_stored_image() {
    let h = Harness::new();
    let ada = h.user("ada", Role::User).await;
    let post = h
        .service
        .create_post(
            ada.id,
            NewPost {
                image: Some("data:image/png;base64,BBBB".into()),
                ..draft("Short Lived")
            },
        )
        .await
        .unwrap();

    h.service
        .delete_post(Actor::new(ada.id, ada.role), post.id)
        .await
        .unwrap();

    assert_eq!(h.images.len().await, 0);
    let missing = h
        .service
        .delete_post(Actor::new(ada.id, ada.role), post.id)
        .await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn reading_a_post_counts_the_visit() {
    let h = Harness::new();
    let ada = h.user("ada", Role::User).await;
    h.seed(&ada, Seed::titled("Popular Read").visits(41)).await;

    let post = h.service.get_post("popular-read").await.unwrap();
    assert_eq!(post.visit, 42);

    let missing = h.service.get_post("nope").await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn featuring_is_admin_only_and_toggles() {
    let h = Harness::new();
    let ada = h.user("ada", Role::User).await;
    let root = h.user("root", Role::Admin).await;
    let post = h.seed(&ada, Seed::titled("Spotlight")).await;

    let denied = h
        .service
        .toggle_featured(Actor::new(ada.id, ada.role), post.id)
        .await;
    assert!(matches!(denied, Err(DomainError::Forbidden(_))));

    let admin = Actor::new(root.id, root.role);
    assert!(h.service.toggle_featured(admin, post.id).await.unwrap().is_featured);
    assert!(!h.service.toggle_featured(admin, post.id).await.unwrap().is_featured);
}

#[tokio::test]
async fn cancelled_read_leaves_no_mutation() {
    let h = Harness::new();
    let ada = h.user("ada", Role::User).await;
    h.seed(&ada, Seed::titled("Anything")).await;

    let result = run_cancellable(std::future::ready(()), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        h.service.get_post("anything").await
    })
    .await;

    assert!(matches!(result, Err(DomainError::Cancelled)));
    let untouched = h.posts.find_by_slug("anything", None).await.unwrap().unwrap();
    assert_eq!(untouched.visit, 0);
}
