//! Integration tests for the event aggregate against a real PostgreSQL.
//!
//! Docker must be running; run with `cargo test -- --ignored`.

#![allow(clippy::expect_used, clippy::panic, clippy::indexing_slicing)]

mod common;

use common::{create_admin, image, new_event, setup};
use gazette::domain::{
    AdminId, EventId, EventPatch, EventUpdate, EventVisibility, ImageId, PageRequest,
};
use gazette::error::{GazetteError, ValidationError};
use gazette::persistence::authors::associate_admin_with_event;
use gazette::persistence::images::set_display_image_for_event;

async fn display_flags(fx: &common::Fixture, event_id: EventId) -> Vec<(ImageId, bool)> {
    let event = fx.events.get_event_by_id(event_id).await.expect("event readable");
    event.images.iter().map(|img| (img.id, img.is_display)).collect()
}

async fn event_rows(fx: &common::Fixture) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM events")
        .fetch_one(fx.db.pool())
        .await
        .expect("count")
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn create_then_read_returns_whole_aggregate() {
    let fx = setup().await;
    let author = create_admin(&fx, "Ann", "ann@mail.com").await;
    let co_author = create_admin(&fx, "Ben", "ben@mail.com").await;

    let mut event = new_event("Spring Gala 2024!");
    event.images = vec![image("one"), image("two"), image("three")];
    event.co_authors = vec![co_author];
    let id = fx.events.create_event(&event, author).await.expect("create");

    let stored = fx.events.get_event_by_id(id).await.expect("read");
    assert_eq!(stored.slug, "spring-gala-2024");
    assert_eq!(stored.images.len(), 3);
    assert_eq!(
        stored.images.iter().map(|i| i.alt_text.as_str()).collect::<Vec<_>>(),
        ["one", "two", "three"]
    );
    assert_eq!(stored.display_image().map(|i| i.alt_text.as_str()), Some("one"));
    let author_ids: Vec<AdminId> = stored.authors.iter().map(|a| a.id).collect();
    assert!(author_ids.contains(&author));
    assert!(author_ids.contains(&co_author));
    assert!(stored.published_at.is_some());

    let by_slug = fx
        .events
        .get_event_by_slug("spring-gala-2024")
        .await
        .expect("read by slug");
    assert_eq!(by_slug, stored);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn flagged_image_becomes_display() {
    let fx = setup().await;
    let author = create_admin(&fx, "Ann", "ann@mail.com").await;

    let mut event = new_event("Harbour walk");
    event.images = vec![image("first"), image("second").as_display()];
    let id = fx.events.create_event(&event, author).await.expect("create");

    let flags = display_flags(&fx, id).await;
    assert_eq!(flags.iter().filter(|(_, d)| *d).count(), 1);
    assert!(!flags[0].1);
    assert!(flags[1].1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn promoting_an_image_moves_the_display_flag() {
    let fx = setup().await;
    let author = create_admin(&fx, "Ann", "ann@mail.com").await;
    let mut event = new_event("Scenario B");
    event.images = vec![image("img1"), image("img2")];
    let id = fx.events.create_event(&event, author).await.expect("create");

    let before = display_flags(&fx, id).await;
    let (img1, img2) = (before[0].0, before[1].0);

    let mut update = EventUpdate::by(author);
    update.new_display_image = Some(img2);
    fx.events.update_event_by_id(id, &update).await.expect("update");

    let after = display_flags(&fx, id).await;
    assert_eq!(after, vec![(img1, false), (img2, true)]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn failed_removal_rolls_back_the_whole_update() {
    let fx = setup().await;
    let author = create_admin(&fx, "Ann", "ann@mail.com").await;
    let editor = create_admin(&fx, "Eve", "eve@mail.com").await;
    let mut event = new_event("Scenario C");
    event.images = vec![image("keep"), image("other")];
    let id = fx.events.create_event(&event, author).await.expect("create");
    let before = fx.events.get_event_by_id(id).await.expect("read");

    let update = EventUpdate {
        patch: EventPatch {
            title: Some("Changed".into()),
            description: Some("Changed too".into()),
            ..EventPatch::default()
        },
        new_images: vec![image("added")],
        removed_image_ids: vec![ImageId::new()],
        new_display_image: Some(before.images[1].id),
        editor,
    };
    let result = fx.events.update_event_by_id(id, &update).await;
    assert!(matches!(result, Err(GazetteError::NotFound("image"))));

    let after = fx.events.get_event_by_id(id).await.expect("read");
    assert_eq!(before, after);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn removed_image_cannot_be_promoted() {
    let fx = setup().await;
    let author = create_admin(&fx, "Ann", "ann@mail.com").await;
    let mut event = new_event("Removal");
    event.images = vec![image("a"), image("b")];
    let id = fx.events.create_event(&event, author).await.expect("create");
    let b = display_flags(&fx, id).await[1].0;

    let mut update = EventUpdate::by(author);
    update.removed_image_ids = vec![b];
    update.new_display_image = Some(b);
    let result = fx.events.update_event_by_id(id, &update).await;
    assert!(matches!(result, Err(GazetteError::NotFound(_))));
    assert_eq!(display_flags(&fx, id).await.len(), 2);

    let mut update = EventUpdate::by(author);
    update.removed_image_ids = vec![b];
    let removed = fx.events.update_event_by_id(id, &update).await.expect("update");
    assert_eq!(removed, vec!["https://cdn.example.org/b.jpg".to_string()]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn image_of_another_event_is_not_found() {
    let fx = setup().await;
    let author = create_admin(&fx, "Ann", "ann@mail.com").await;
    let mut first = new_event("First");
    first.images = vec![image("mine")];
    let first_id = fx.events.create_event(&first, author).await.expect("create");
    let second_id = fx
        .events
        .create_event(&new_event("Second"), author)
        .await
        .expect("create");
    let foreign = display_flags(&fx, first_id).await[0].0;

    let mut update = EventUpdate::by(author);
    update.new_display_image = Some(foreign);
    let result = fx.events.update_event_by_id(second_id, &update).await;
    assert!(matches!(result, Err(GazetteError::NotFound("image"))));
    assert_eq!(display_flags(&fx, first_id).await, vec![(foreign, true)]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn authorship_is_idempotent() {
    let fx = setup().await;
    let author = create_admin(&fx, "Ann", "ann@mail.com").await;
    let id = fx
        .events
        .create_event(&new_event("Twice"), author)
        .await
        .expect("create");

    let mut tx = fx.db.pool().begin().await.expect("begin");
    let added = associate_admin_with_event(&mut tx, author, id)
        .await
        .expect("associate");
    assert!(!added);
    tx.commit().await.expect("commit");

    fx.events
        .update_event_by_id(id, &EventUpdate::by(author))
        .await
        .expect("update");

    let authors = fx.authors.get_authors_by_event_id(id).await.expect("authors");
    assert_eq!(authors.len(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn editor_joins_authors_and_survives_soft_delete() {
    let fx = setup().await;
    let author = create_admin(&fx, "Ann", "ann@mail.com").await;
    let editor = create_admin(&fx, "Eve", "eve@mail.com").await;
    let id = fx
        .events
        .create_event(&new_event("Edited"), author)
        .await
        .expect("create");

    fx.events
        .update_event_by_id(id, &EventUpdate::by(editor))
        .await
        .expect("update");
    fx.admins.delete_admin(editor).await.expect("soft delete");

    let authors = fx.authors.get_authors_by_event_id(id).await.expect("authors");
    assert_eq!(authors.len(), 2);
    assert!(authors.iter().any(|a| a.id == editor && !a.is_live()));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn display_invariant_holds_after_direct_promotion() {
    let fx = setup().await;
    let author = create_admin(&fx, "Ann", "ann@mail.com").await;
    let mut event = new_event("Direct");
    event.images = vec![image("a"), image("b"), image("c")];
    let id = fx.events.create_event(&event, author).await.expect("create");
    let c = display_flags(&fx, id).await[2].0;

    let mut tx = fx.db.pool().begin().await.expect("begin");
    set_display_image_for_event(&mut tx, c, id)
        .await
        .expect("promote");
    tx.commit().await.expect("commit");

    let flags = display_flags(&fx, id).await;
    let displayed: Vec<ImageId> = flags.iter().filter(|(_, d)| *d).map(|(i, _)| *i).collect();
    assert_eq!(displayed, vec![c]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn publish_cycle_keeps_first_publication_time() {
    let fx = setup().await;
    let author = create_admin(&fx, "Ann", "ann@mail.com").await;
    let mut event = new_event("Draft first");
    event.is_draft = true;
    let id = fx.events.create_event(&event, author).await.expect("create");
    assert_eq!(
        fx.events.get_event_by_id(id).await.expect("read").published_at,
        None
    );

    let publish = |is_draft| EventUpdate {
        patch: EventPatch {
            is_draft: Some(is_draft),
            ..EventPatch::default()
        },
        ..EventUpdate::by(author)
    };

    fx.events.update_event_by_id(id, &publish(false)).await.expect("publish");
    let first = fx
        .events
        .get_event_by_id(id)
        .await
        .expect("read")
        .published_at
        .expect("published");

    fx.events.update_event_by_id(id, &publish(false)).await.expect("republish");
    let again = fx.events.get_event_by_id(id).await.expect("read").published_at;
    assert_eq!(again, Some(first));

    fx.events.update_event_by_id(id, &publish(true)).await.expect("unpublish");
    let draft = fx.events.get_event_by_id(id).await.expect("read");
    assert!(draft.is_draft);
    assert_eq!(draft.published_at, None);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn two_display_images_are_rejected() {
    let fx = setup().await;
    let author = create_admin(&fx, "Ann", "ann@mail.com").await;
    let mut event = new_event("Greedy");
    event.images = vec![image("a").as_display(), image("b").as_display()];

    let result = fx.events.create_event(&event, author).await;
    assert!(matches!(
        result,
        Err(GazetteError::Validation(ValidationError::MultipleDisplayImages))
    ));
    assert_eq!(event_rows(&fx).await, 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn unknown_co_author_leaves_nothing_behind() {
    let fx = setup().await;
    let author = create_admin(&fx, "Ann", "ann@mail.com").await;
    let mut event = new_event("Ghost writer");
    event.images = vec![image("a")];
    event.co_authors = vec![AdminId::new()];

    let result = fx.events.create_event(&event, author).await;
    assert!(matches!(
        result,
        Err(GazetteError::Validation(ValidationError::UnknownReference("admin")))
    ));
    assert_eq!(event_rows(&fx).await, 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn soft_deleted_admin_cannot_author() {
    let fx = setup().await;
    let author = create_admin(&fx, "Ann", "ann@mail.com").await;
    let gone = create_admin(&fx, "Gus", "gus@mail.com").await;
    fx.admins.delete_admin(gone).await.expect("soft delete");

    let mut event = new_event("Late co-author");
    event.co_authors = vec![gone];
    assert!(matches!(
        fx.events.create_event(&event, author).await,
        Err(GazetteError::Validation(ValidationError::UnknownReference("admin")))
    ));
    assert!(matches!(
        fx.events.create_event(&new_event("Late author"), gone).await,
        Err(GazetteError::Validation(ValidationError::UnknownReference("admin")))
    ));
    assert_eq!(event_rows(&fx).await, 0);

    let id = fx
        .events
        .create_event(&new_event("Kept"), author)
        .await
        .expect("create");
    let update = EventUpdate {
        patch: EventPatch {
            title: Some("Renamed".into()),
            ..EventPatch::default()
        },
        ..EventUpdate::by(gone)
    };
    assert!(matches!(
        fx.events.update_event_by_id(id, &update).await,
        Err(GazetteError::Validation(ValidationError::UnknownReference("admin")))
    ));
    let event = fx.events.get_event_by_id(id).await.expect("read");
    assert_eq!(event.title, "Kept");
    assert_eq!(event.authors.len(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn duplicate_slug_conflicts() {
    let fx = setup().await;
    let author = create_admin(&fx, "Ann", "ann@mail.com").await;
    fx.events
        .create_event(&new_event("Same title"), author)
        .await
        .expect("create");

    let result = fx.events.create_event(&new_event("Same title"), author).await;
    assert!(matches!(result, Err(GazetteError::Conflict(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn listings_respect_visibility() {
    let fx = setup().await;
    let author = create_admin(&fx, "Ann", "ann@mail.com").await;
    for i in 0..3 {
        fx.events
            .create_event(&new_event(&format!("Published {i}")), author)
            .await
            .expect("create");
    }
    let mut draft = new_event("Hidden");
    draft.is_draft = true;
    fx.events.create_event(&draft, author).await.expect("create");

    let published = fx
        .events
        .list_events(PageRequest::default(), EventVisibility::Published)
        .await
        .expect("list");
    assert_eq!(published.len(), 3);
    assert_eq!(published[0].slug, "published-2");
    assert!(published.iter().all(|e| !e.is_draft));

    let all = fx
        .events
        .list_events(PageRequest::default(), EventVisibility::All)
        .await
        .expect("list");
    assert_eq!(all.len(), 4);
    assert_eq!(all[0].slug, "hidden");

    assert_eq!(fx.events.event_count(EventVisibility::Published).await.expect("count"), 3);
    assert_eq!(fx.events.event_count(EventVisibility::All).await.expect("count"), 4);

    let recent = fx.events.recent_published_events(2).await.expect("recent");
    assert_eq!(recent.len(), 2);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn delete_returns_image_urls_and_cascades() {
    let fx = setup().await;
    let author = create_admin(&fx, "Ann", "ann@mail.com").await;
    let mut event = new_event("Short lived");
    event.images = vec![image("x"), image("y")];
    let id = fx.events.create_event(&event, author).await.expect("create");

    let urls = fx.events.delete_event_by_id(id).await.expect("delete");
    assert_eq!(
        urls,
        vec![
            "https://cdn.example.org/x.jpg".to_string(),
            "https://cdn.example.org/y.jpg".to_string(),
        ]
    );
    assert!(matches!(
        fx.events.get_event_by_id(id).await,
        Err(GazetteError::NotFound("event"))
    ));
    assert!(fx.authors.get_authors_by_event_id(id).await.expect("authors").is_empty());
    assert!(matches!(
        fx.events.delete_event_by_id(id).await,
        Err(GazetteError::NotFound("event"))
    ));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn update_of_unknown_event_is_not_found() {
    let fx = setup().await;
    let author = create_admin(&fx, "Ann", "ann@mail.com").await;
    let result = fx
        .events
        .update_event_by_id(EventId::new(), &EventUpdate::by(author))
        .await;
    assert!(matches!(result, Err(GazetteError::NotFound("event"))));
}
