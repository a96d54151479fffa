mod migrations;

use crate::db::Database;
use crate::types::Post;
use tempfile::NamedTempFile;

/// Open a fresh database in a temp file (keep the file alive for the test)
pub(super) async fn test_db() -> (Database, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();
    (db, temp_file)
}

/// A post with tags in every category, favorites and pools
pub(super) fn sample_post(id: i64) -> Post {
    Post {
        id,
        created_at: "2017-03-01T12:00:00.000-05:00".to_string(),
        updated_at: "2017-03-02T08:30:00.000-05:00".to_string(),
        uploader_id: 99,
        score: 12,
        source: "https://example.com/art".to_string(),
        md5: Some("d41d8cd98f00b204e9800998ecf8427e".to_string()),
        rating: "s".to_string(),
        image_width: 800,
        image_height: 600,
        file_ext: "jpg".to_string(),
        parent_id: None,
        has_children: false,
        file_size: 123_456,
        fav_string: "fav:1 fav:2 fav:3".to_string(),
        pool_string: "pool:10".to_string(),
        up_score: 14,
        down_score: -2,
        bit_flags: 0,
        tag_string_artist: "some_artist".to_string(),
        tag_string_character: "hero".to_string(),
        tag_string_copyright: "original".to_string(),
        tag_string_general: "1girl solo smile".to_string(),
        file_url: Some(format!("/data/{}.jpg", id)),
        ..Default::default()
    }
}
