//! End-to-end journal behavior against an in-memory store.

use chrono::{TimeZone, Utc};
use skypass_core::{EntryFilter, TravelEntry, TravelTag};
use skypass_db::{Database, DbConfig, Journal, JournalError};

async fn journal() -> Journal {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
        .journal()
}

fn entry(title: &str, category: &str) -> TravelEntry {
    let date = Utc.with_ymd_and_hms(2024, 8, 3, 10, 0, 0).unwrap();
    TravelEntry::new(title, "", date, 45.0, 7.0, 270.0).with_category(category)
}

#[tokio::test]
async fn new_entry_round_trips() {
    let journal = journal().await;
    let saved = entry("Hike", "Hiking").with_distance(Some(11.2));

    let id = journal.save_entry_with_tags(&saved, &[]).await.unwrap();

    assert!(id > 0);
    assert_eq!(journal.get_entry(id).await.unwrap(), Some(saved.with_id(id)));
}

#[tokio::test]
async fn tag_lifecycle_on_one_entry() {
    let journal = journal().await;
    let id = journal
        .insert_entry(&entry("Hike", "Hiking"))
        .await
        .unwrap();
    let tag_id = journal.create_tag("Mountain", "#795548").await.unwrap();
    journal.add_tag_to_entry(id, tag_id).await.unwrap();

    let with_tags = journal.live_entry_with_tags(id).first().await.unwrap().unwrap();
    assert_eq!(with_tags.tags.len(), 1);
    assert_eq!(with_tags.tags[0].name, "Mountain");

    let tag = journal.get_tag(tag_id).await.unwrap().unwrap();
    journal.delete_tag(&tag).await.unwrap();

    let after = journal.live_entry_with_tags(id).first().await.unwrap().unwrap();
    assert!(after.tags.is_empty());
    assert_eq!(after.entry, with_tags.entry);
}

#[tokio::test]
async fn fresh_store_lists_default_categories() {
    let journal = journal().await;

    let names: Vec<String> = journal
        .live_categories()
        .first()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();

    assert_eq!(
        names,
        vec!["City Tour", "General", "Hiking", "Road Trip", "Vacation"]
    );
}

#[tokio::test]
async fn blank_title_is_rejected_and_nothing_persists() {
    let journal = journal().await;

    let err = journal
        .save_entry_with_tags(&entry("", "General"), &[])
        .await
        .unwrap_err();

    assert!(matches!(err, JournalError::Validation(_)));
    assert!(journal.live_entries().first().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_entry_drops_associations_but_keeps_tags() {
    let journal = journal().await;
    let alps = journal.create_tag("Alps", "#000000").await.unwrap();
    let id = journal
        .save_entry_with_tags(&entry("Hike", "Hiking"), &[alps])
        .await
        .unwrap();

    assert!(journal.delete_entry_by_id(id).await.unwrap());

    assert!(journal.tag_refs_for_entry(id).await.unwrap().is_empty());
    assert!(journal.get_tag(alps).await.unwrap().is_some());
    assert!(journal.category_exists("Hiking").await.unwrap());
}

#[tokio::test]
async fn deleting_tag_keeps_entry_and_its_other_tags() {
    let journal = journal().await;
    let a = journal.create_tag("A", "#000001").await.unwrap();
    let b = journal.create_tag("B", "#000002").await.unwrap();
    let id = journal
        .save_entry_with_tags(&entry("Hike", "Hiking"), &[a, b])
        .await
        .unwrap();

    journal
        .delete_tag(&TravelTag { id: a, name: "A".into(), color: "#000001".into() })
        .await
        .unwrap();

    let with_tags = journal.live_entry_with_tags(id).first().await.unwrap().unwrap();
    assert_eq!(with_tags.tag_ids(), vec![b]);
}

#[tokio::test]
async fn resave_replaces_associations_exactly() {
    let journal = journal().await;
    let tags: Vec<i64> = create_tags(&journal, &["A", "B", "C", "D"]).await;
    let id = journal
        .save_entry_with_tags(&entry("Hike", "Hiking"), &tags[..3])
        .await
        .unwrap();

    journal
        .save_entry_with_tags(&entry("Hike", "Hiking").with_id(id), &[tags[3], tags[0]])
        .await
        .unwrap();

    let with_tags = journal.live_entry_with_tags(id).first().await.unwrap().unwrap();
    assert_eq!(with_tags.tag_ids(), vec![tags[0], tags[3]]);
}

#[tokio::test]
async fn existing_category_keeps_id_and_color() {
    let journal = journal().await;
    let general = journal.get_category_by_name("General").await.unwrap().unwrap();

    let id = journal.create_category("General", "#000000").await.unwrap();

    assert_eq!(id, general.id);
    assert_eq!(
        journal.get_category(id).await.unwrap().unwrap().color,
        "#4A90E2"
    );
}

#[tokio::test]
async fn live_list_and_filter_stay_current() {
    let journal = journal().await;
    let mut live = journal.live_entries_with_tags();
    assert!(live.next().await.unwrap().unwrap().is_empty());

    journal
        .save_entry_with_tags(&entry("Lake hike", "Hiking"), &[])
        .await
        .unwrap();
    journal
        .save_entry_with_tags(&entry("Old town", "City Tour"), &[])
        .await
        .unwrap();

    live.next().await.unwrap().unwrap();
    let all = live.next().await.unwrap().unwrap();
    assert_eq!(all.len(), 2);

    let filter = EntryFilter::new().with_category("Hiking").with_query("LAKE");
    let visible = filter.apply(&all);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].entry.title, "Lake hike");
}

#[tokio::test]
async fn bulk_detach_clears_only_that_entry() {
    let journal = journal().await;
    let tags = create_tags(&journal, &["A", "B"]).await;
    let first = journal
        .save_entry_with_tags(&entry("One", "General"), &tags)
        .await
        .unwrap();
    let second = journal
        .save_entry_with_tags(&entry("Two", "General"), &tags[..1])
        .await
        .unwrap();

    assert_eq!(journal.remove_all_tags_from_entry(first).await.unwrap(), 2);

    assert!(journal.tag_refs_for_entry(first).await.unwrap().is_empty());
    assert_eq!(journal.tag_refs_for_entry(second).await.unwrap().len(), 1);
}

async fn create_tags(journal: &Journal, names: &[&str]) -> Vec<i64> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        ids.push(journal.create_tag(name, "#123456").await.unwrap());
    }
    ids
}
