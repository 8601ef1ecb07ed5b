use std::sync::Arc;
use std::time::Duration;
use providers::chrome::ChromeFilePlatform;
use tagmark_core::flatten::Flattener;
use tagmark_core::reconciler::Reconciler;

const PROFILE: &str = r#"{
   "roots": {
      "bookmark_bar": {
         "children": [ {
            "date_added": "13300000000000000",
            "id": "4",
            "name": "Rust",
            "type": "url",
            "url": "https://www.rust-lang.org/"
         } ],
         "date_added": "13200000000000000",
         "id": "1",
         "name": "Bookmarks bar",
         "type": "folder"
      },
      "other": {
         "children": [ {
            "children": [ {
               "date_added": "13310000000000000",
               "id": "6",
               "name": "",
               "type": "url",
               "url": "https://news.ycombinator.com/"
            } ],
            "date_added": "13200000000000000",
            "id": "5",
            "name": "Imported From Safari",
            "type": "folder"
         } ],
         "date_added": "13200000000000000",
         "id": "2",
         "name": "Other bookmarks",
         "type": "folder"
      },
      "synced": {
         "children": [ ],
         "date_added": "13200000000000000",
         "id": "3",
         "name": "Mobile bookmarks",
         "type": "folder"
      }
   },
   "version": 1
}"#;

#[tokio::test]
async fn tagging_against_a_profile_file_survives_a_fresh_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Bookmarks");
    std::fs::write(&path, PROFILE).unwrap();

    let mut rec = Reconciler::new(
        Arc::new(ChromeFilePlatform::new(&path)),
        Flattener::default(),
        "1",
        Duration::from_secs(5),
    );
    rec.reload().await.unwrap();
    let ids: Vec<_> = rec.view().bookmarks().iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["6", "4"]);
    assert_eq!(rec.view().find("6").unwrap().title, "Untitled");
    assert!(rec.view().tags().is_empty());

    rec.assign_tag("6", "News").await.unwrap();

    let mut fresh = Reconciler::new(
        Arc::new(ChromeFilePlatform::new(&path)),
        Flattener::default(),
        "1",
        Duration::from_secs(5),
    );
    fresh.reload().await.unwrap();
    assert_eq!(fresh.view().find("6").unwrap().tags, vec!["News"]);
    assert_eq!(fresh.view().tags(), ["News".to_string()]);
}
