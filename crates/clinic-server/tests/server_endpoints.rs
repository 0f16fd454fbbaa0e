use clinic_server::{AppConfig, build_app};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

async fn start_server() -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let app = build_app(&AppConfig::default()).await;

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, server)
}

async fn create(client: &reqwest::Client, base: &str, collection: &str, payload: Value) -> String {
    let resp = client
        .post(format!("{base}/api/{collection}"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201, "create in {collection}");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_endpoints_work() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["service"], "Clinic Server");
    assert_eq!(body["status"], "ok");

    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let resp = client.get(format!("{base}/readyz")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ready");

    // Responses carry a request id
    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert!(resp.headers().contains_key("x-request-id"));

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn patient_crud_round_trip() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let id = create(
        &client,
        &base,
        "patients",
        json!({"name": "Ada Lovelace", "contact": "555-0101", "dob": "1990-12-10"}),
    )
    .await;

    // List contains the new record
    let resp = client
        .get(format!("{base}/api/patients"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], id.as_str());
    assert_eq!(listed[0]["name"], "Ada Lovelace");

    // Read single
    let resp = client
        .get(format!("{base}/api/patients/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["dob"], "1990-12-10");

    // Update replaces fields
    let resp = client
        .put(format!("{base}/api/patients/{id}"))
        .json(&json!({"name": "Ada King", "contact": "555-0102"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);

    let resp = client
        .get(format!("{base}/api/patients/{id}"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "Ada King");

    // Delete, then the record is gone
    let resp = client
        .delete(format!("{base}/api/patients/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = client
        .get(format!("{base}/api/patients/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn invalid_payloads_and_paths_are_rejected() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    // Patient without a name
    let resp = client
        .post(format!("{base}/api/patients"))
        .json(&json!({"contact": "555-0101"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    // Unknown collection
    let resp = client
        .get(format!("{base}/api/vehicles"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    // Update of a record that does not exist
    let resp = client
        .put(format!("{base}/api/doctors/missing"))
        .json(&json!({"name": "Dr. Who"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn paying_a_bill_deducts_inventory() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let item_id = create(
        &client,
        &base,
        "inventory",
        json!({"item": "Bandage", "quantity": 10, "price": 2.5}),
    )
    .await;

    let bill_id = create(
        &client,
        &base,
        "billing",
        json!({
            "patient": "p-1",
            "total": 7.5,
            "items": [
                {"name": "Bandage", "quantity": 3, "price": 2.5, "inventoryItemId": item_id}
            ]
        }),
    )
    .await;

    let resp = client
        .post(format!("{base}/api/billing/pay/{bill_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["bill"]["status"], "Paid");
    assert_eq!(body["inventory"][0]["quantity"], 7);

    // The stored records reflect the payment
    let resp = client
        .get(format!("{base}/api/inventory/{item_id}"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["quantity"], 7);

    let resp = client
        .get(format!("{base}/api/billing/{bill_id}"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "Paid");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn failed_payments_leave_no_trace() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let item_id = create(
        &client,
        &base,
        "inventory",
        json!({"item": "Gauze", "quantity": 2, "price": 1.0}),
    )
    .await;

    let bill_id = create(
        &client,
        &base,
        "billing",
        json!({
            "patient": "p-1",
            "total": 5.0,
            "items": [
                {"name": "Gauze", "quantity": 5, "price": 1.0, "inventoryItemId": item_id}
            ]
        }),
    )
    .await;

    // Not enough stock: 400 and nothing changes
    let resp = client
        .post(format!("{base}/api/billing/pay/{bill_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);

    let resp = client
        .get(format!("{base}/api/inventory/{item_id}"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["quantity"], 2);

    let resp = client
        .get(format!("{base}/api/billing/{bill_id}"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "Pending");

    // Unknown bill id is the client's mistake too
    let resp = client
        .post(format!("{base}/api/billing/pay/no-such-bill"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn paying_twice_is_rejected() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let bill_id = create(
        &client,
        &base,
        "billing",
        json!({
            "patient": "p-1",
            "total": 30.0,
            "items": [
                {"name": "Consultation", "quantity": 1, "price": 30.0, "nonStock": true}
            ]
        }),
    )
    .await;

    let resp = client
        .post(format!("{base}/api/billing/pay/{bill_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = client
        .post(format!("{base}/api/billing/pay/{bill_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
