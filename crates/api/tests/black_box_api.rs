use std::sync::Arc;

use ecoblock_service::{InventoryService, ServiceConfig};
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, fresh in-memory stores, ephemeral port.
        let service = InventoryService::in_memory(&ServiceConfig::default()).unwrap();
        let app = ecoblock_api::app::build_app(Arc::new(service));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn add_brick(client: &reqwest::Client, base_url: &str) -> serde_json::Value {
    let res = client
        .post(format!("{}/materials", base_url))
        .json(&json!({
            "material": "RecycledBrick",
            "quantity": 100,
            "source": "PlantA",
            "carbon_savings": 12.5,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn intake_list_and_get_use_contract_field_names() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = add_brick(&client, &srv.base_url).await;
    assert_eq!(created["material"], "RecycledBrick");
    assert_eq!(created["carbon_savings"], 12.5);

    let list: serde_json::Value = client
        .get(format!("{}/materials", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["quantity"], 100.0);
    assert_eq!(list[0]["source"], "PlantA");

    let res = client
        .get(format!("{}/materials/RecycledBrick", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let got: serde_json::Value = res.json().await.unwrap();
    assert_eq!(got, created);
}

#[tokio::test]
async fn negative_quantity_is_a_bad_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/materials", srv.base_url))
        .json(&json!({
            "material": "Cork",
            "quantity": -1,
            "source": "PlantA",
            "carbon_savings": 1.0,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn usage_then_predict_returns_weighted_estimate() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    add_brick(&client, &srv.base_url).await;

    for (amount, ts) in [(5, "2024-01-01T00:00:01Z"), (7, "2024-01-01T00:00:02Z")] {
        let res = client
            .post(format!("{}/materials/RecycledBrick/usage", srv.base_url))
            .json(&json!({ "amount": amount, "timestamp": ts }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .get(format!("{}/predict/RecycledBrick", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["material"], "RecycledBrick");
    let predicted = body["predicted_usage"].as_f64().unwrap();
    assert!(predicted > 6.0 && predicted < 7.0, "got {predicted}");
    assert_eq!(body["basis"]["method"], "weighted_average");
}

#[tokio::test]
async fn out_of_order_usage_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    add_brick(&client, &srv.base_url).await;

    let url = format!("{}/materials/RecycledBrick/usage", srv.base_url);
    let res = client
        .post(&url)
        .json(&json!({ "amount": 1, "timestamp": "2024-01-01T00:00:10Z" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(&url)
        .json(&json!({ "amount": 1, "timestamp": "2024-01-01T00:00:05Z" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_material_prediction_is_not_found() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/predict/Unobtainium", srv.base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_data");
}

#[tokio::test]
async fn remove_then_get_is_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    add_brick(&client, &srv.base_url).await;

    let url = format!("{}/materials/RecycledBrick", srv.base_url);
    let res = client.delete(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client.delete(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn analytics_and_export() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    add_brick(&client, &srv.base_url).await;

    let summary: serde_json::Value = client
        .get(format!("{}/analytics/carbon_savings", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["total"], 12.5);
    assert_eq!(summary["average"], 12.5);

    let res = client
        .get(format!("{}/materials/export", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/csv");
    let csv = res.text().await.unwrap();
    assert!(csv.starts_with(
        "id,material,quantity,source,carbon_savings,project_location,used_in_project,date_added\n"
    ));
    assert!(csv.contains("\"RecycledBrick\",100,\"PlantA\",12.5"));

    let alternatives: serde_json::Value = client
        .get(format!("{}/suggest-materials/RecycledBrick", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(alternatives.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn csv_import_stores_rows_with_project_metadata() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let csv = "material,quantity,source,carbon_savings,project_location,used_in_project,date_added\n\
               Hempcrete,120,PlantA,45.5,Bristol,Community Hall,2024-02-10\n";
    let res = client
        .post(format!("{}/materials/import", srv.base_url))
        .header("content-type", "text/csv")
        .body(csv)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let summary: serde_json::Value = res.json().await.unwrap();
    assert_eq!(summary["imported"], 1);
    assert_eq!(summary["skipped"], 0);

    let got: serde_json::Value = client
        .get(format!("{}/materials/Hempcrete", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(got["project_location"], "Bristol");
    assert_eq!(got["used_in_project"], "Community Hall");
    assert_eq!(got["date_added"], "2024-02-10");

    let res = client
        .post(format!("{}/materials/import", srv.base_url))
        .body("material,quantity\nCork,1\n")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
