//! A fake booru API served by wiremock

use serde_json::{Value, json};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Body served for every post file
pub const FILE_BODY: &[u8] = b"not really a png";

/// Hex MD5 of [`FILE_BODY`]
pub fn file_md5() -> String {
    format!("{:x}", md5::compute(FILE_BODY))
}

/// JSON for one post as the API returns it
pub fn post_json(id: i64) -> Value {
    let pool_string = if id % 10 == 0 {
        format!("pool:{}", id / 10)
    } else {
        String::new()
    };

    json!({
        "id": id,
        "created_at": "2017-03-01T12:00:00.000-05:00",
        "updated_at": "2017-03-02T08:30:00.000-05:00",
        "uploader_id": 1,
        "score": id % 13,
        "source": "",
        "md5": file_md5(),
        "rating": "s",
        "image_width": 640,
        "image_height": 480,
        "file_ext": "png",
        "parent_id": null,
        "has_children": false,
        "file_size": FILE_BODY.len(),
        "fav_string": format!("fav:{} fav:{}", id % 5, 100 + id % 3),
        "pool_string": pool_string,
        "up_score": 3,
        "down_score": 0,
        "is_pending": false,
        "is_flagged": false,
        "is_deleted": false,
        "is_banned": false,
        "pixiv_id": null,
        "bit_flags": 0,
        "tag_string_artist": format!("artist_{}", id % 4),
        "tag_string_character": "",
        "tag_string_copyright": "original",
        "tag_string_general": "1girl solo",
        "file_url": format!("/data/{}.png", id),
    })
}

/// Answers `posts.json?tags=id:<N&limit=L` like the real search endpoint
///
/// Returns posts with ids in `[first, last]` below `N`, newest first, at most
/// `L` of them.
pub struct FakeBooru {
    /// Lowest post id on the board
    pub first: i64,
    /// Highest post id on the board
    pub last: i64,
}

impl Respond for FakeBooru {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut upper = None;
        let mut limit = 100;
        for (key, value) in request.url.query_pairs() {
            match key.as_ref() {
                "tags" => upper = value.strip_prefix("id:<").and_then(|v| v.parse::<i64>().ok()),
                "limit" => limit = value.parse().unwrap_or(limit),
                _ => {}
            }
        }
        let Some(upper) = upper else {
            return ResponseTemplate::new(422);
        };

        let top = (upper - 1).min(self.last);
        let posts: Vec<Value> = (self.first..=top).rev().take(limit).map(post_json).collect();
        ResponseTemplate::new(200).set_body_json(Value::Array(posts))
    }
}

/// Start a mock server holding posts `first..=last` and their files
pub async fn start_booru(first: i64, last: i64) -> MockServer {
    let server = MockServer::start().await;
    mount_booru(&server, first, last).await;
    server
}

/// Mount the search endpoint and the file endpoint on `server`
pub async fn mount_booru(server: &MockServer, first: i64, last: i64) {
    Mock::given(method("GET"))
        .and(path("/posts.json"))
        .respond_with(FakeBooru { first, last })
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/data/\d+\.png$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(FILE_BODY))
        .mount(server)
        .await;
}
