use std::sync::Arc;

use maihere_bot::api::ApiClient;
use maihere_bot::store::Store;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn shop_json(id: u64, number: u32) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "shop_name": format!("机厅{id}"),
        "shop_number": number,
        "shop_source": "测试(1) \n时间：12:00:00",
        "shop_address": "测试路1号"
    })
}

fn test_client(server: &MockServer, ttl: f64) -> (ApiClient, Arc<Store>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::load(dir.path()));
    let client = ApiClient::new(&server.uri(), "test-key", ttl, Arc::clone(&store));
    (client, store, dir)
}

#[tokio::test]
async fn get_shop_within_ttl_hits_cache_not_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maihere/query/getData_solo.php"))
        .and(query_param("id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(shop_json(42, 5)))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store, _dir) = test_client(&server, 60.0);

    let first = client.get_shop(42).await.unwrap();
    assert_eq!(first.shop_number, 5);

    // Second lookup within the TTL must be answered from cache
    let second = client.get_shop(42).await.unwrap();
    assert_eq!(second.shop_number, 5);

    server.verify().await;
}

#[tokio::test]
async fn get_shop_after_ttl_expiry_refetches_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maihere/query/getData_solo.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(shop_json(42, 5)))
        .expect(2)
        .mount(&server)
        .await;

    // Zero TTL: every entry is immediately stale
    let (client, _store, _dir) = test_client(&server, 0.0);
    client.get_shop(42).await.unwrap();
    client.get_shop(42).await.unwrap();

    server.verify().await;
}

#[tokio::test]
async fn get_shop_serves_stale_cache_on_remote_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maihere/query/getData_solo.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(shop_json(42, 7)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/maihere/query/getData_solo.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (client, _store, _dir) = test_client(&server, 0.0);

    let fresh = client.get_shop(42).await.unwrap();
    assert_eq!(fresh.shop_number, 7);

    // TTL is zero so this goes to the network, fails, and falls back to
    // the stale record instead of reporting NotFound
    let stale = client.get_shop(42).await.unwrap();
    assert_eq!(stale.shop_number, 7);
}

#[tokio::test]
async fn get_shop_maps_error_body_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maihere/query/getData_solo.php"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"error": "不存在"})),
        )
        .mount(&server)
        .await;

    let (client, _store, _dir) = test_client(&server, 60.0);
    assert!(client.get_shop(404).await.is_none());
}

#[tokio::test]
async fn city_lookup_is_two_phase_and_warms_shop_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maihere/query/queryCity.php"))
        .and(query_param("name", "杭州"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([{"city_id": 5}])),
        )
        .expect(1)
        .mount(&server)
        .await;
    // One entry is a dict, one a JSON-encoded string; both must decode
    Mock::given(method("GET"))
        .and(path("/maihere/query/getData_city.php"))
        .and(query_param("cityid", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            shop_json(1, 3),
            shop_json(2, 0).to_string(),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/maihere/query/getData_solo.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(shop_json(1, 3)))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _store, _dir) = test_client(&server, 60.0);

    let shops = client.get_city_shops("杭州").await.unwrap();
    assert_eq!(shops.len(), 2);
    assert_eq!(shops[0].id, 1);
    assert_eq!(shops[1].id, 2);

    // Side-populated single-shop entries answer without a solo request
    let warmed = client.get_shop(1).await.unwrap();
    assert_eq!(warmed.shop_number, 3);

    // A second city lookup within the TTL is served from cache
    let again = client.get_city_shops("杭州").await.unwrap();
    assert_eq!(again.len(), 2);

    server.verify().await;
}

#[tokio::test]
async fn malformed_city_response_yields_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maihere/query/queryCity.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"nope": 1})))
        .mount(&server)
        .await;

    let (client, _store, _dir) = test_client(&server, 60.0);
    assert!(client.get_city_shops("不存在市").await.is_none());
}

#[tokio::test]
async fn update_is_optimistic_and_survives_remote_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maihere/query/getData_solo.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(shop_json(42, 5)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/maihere/upload/uploadData.php"))
        .and(query_param("id", "42"))
        .and(query_param("number", "8"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store, _dir) = test_client(&server, 60.0);
    client.get_shop(42).await.unwrap();

    // Remote write fails but the local cache keeps the new number
    let ok = client.update_shop_number(42, 8, "测试(1)").await;
    assert!(!ok);

    let cached = client.get_shop(42).await.unwrap();
    assert_eq!(cached.shop_number, 8);
    assert_eq!(cached.shop_source, "测试(1)");

    server.verify().await;
}

#[tokio::test]
async fn successful_update_reports_true() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maihere/upload/uploadData.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("success"))
        .expect(1)
        .mount(&server)
        .await;

    // No cached record: the optimistic step is a no-op, the upload still goes out
    let (client, _store, _dir) = test_client(&server, 60.0);
    assert!(client.update_shop_number(42, 3, "测试(1)").await);

    server.verify().await;
}
