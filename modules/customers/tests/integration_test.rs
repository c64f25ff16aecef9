use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use api_ingress::ApiIngress;
use customers::{
    api::rest::dto::CustomerDto,
    contract::model::Customer,
    domain::{repo::CustomersRepository, service::Service},
    infra::storage::InMemoryCustomersRepository,
};

/// Create a test HTTP router over an empty in-memory store
fn create_test_router() -> Router {
    let repo = Arc::new(InMemoryCustomersRepository::new());
    router_with(repo)
}

fn router_with(repo: Arc<dyn CustomersRepository>) -> Router {
    let service = Arc::new(Service::new(repo));
    let routes = customers::api::rest::routes::register_routes(Router::new(), service);
    ApiIngress::default().build_router(routes)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: Response) -> Result<Value> {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn create(router: &Router, body: Value) -> Result<CustomerDto> {
    let response = router
        .clone()
        .oneshot(json_request("POST", "/customers", body))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    Ok(serde_json::from_value(body_json(response).await?)?)
}

#[tokio::test]
async fn test_customer_lifecycle() -> Result<()> {
    let router = create_test_router();

    let created = create(
        &router,
        json!({"name": "John Doe", "email": "john.doe@example.com"}),
    )
    .await?;
    assert!(!created.id.is_empty());
    assert_eq!(created.name, "John Doe");
    assert_eq!(created.email, "john.doe@example.com");
    assert_eq!(created.telephone, "");

    let uri = format!("/customers/{}", created.id);
    let response = router.clone().oneshot(empty_request("GET", &uri)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: CustomerDto = serde_json::from_value(body_json(response).await?)?;
    assert_eq!(fetched, created);

    let response = router.clone().oneshot(empty_request("DELETE", &uri)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await?,
        json!({"message": "Customer deleted successfully"})
    );

    let response = router.clone().oneshot(empty_request("GET", &uri)).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await?["error"], "Customer not found");

    Ok(())
}

#[tokio::test]
async fn test_telephone_is_always_serialized() -> Result<()> {
    let router = create_test_router();

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/customers",
            json!({"name": "Ann", "email": "ann@example.com"}),
        ))
        .await?;
    let json = body_json(response).await?;
    assert_eq!(json["telephone"], "");

    let with_phone = create(
        &router,
        json!({"name": "Bob", "email": "bob@example.com", "telephone": "+1 555 0100"}),
    )
    .await?;
    assert_eq!(with_phone.telephone, "+1 555 0100");

    Ok(())
}

#[tokio::test]
async fn test_create_keeps_client_id_and_generates_missing_ones() -> Result<()> {
    let router = create_test_router();

    let explicit = create(
        &router,
        json!({"id": "cust-42", "name": "A", "email": "a@example.com"}),
    )
    .await?;
    assert_eq!(explicit.id, "cust-42");

    let first = create(&router, json!({"id": "", "name": "B", "email": "b@example.com"})).await?;
    let second = create(&router, json!({"name": "C", "email": "c@example.com"})).await?;
    assert!(!first.id.is_empty());
    assert!(!second.id.is_empty());
    assert_ne!(first.id, second.id);

    Ok(())
}

#[tokio::test]
async fn test_create_validation_errors() -> Result<()> {
    let router = create_test_router();

    let bad_bodies = [
        json!({"name": "John Doe"}),
        json!({"name": "   ", "email": "john@example.com"}),
        json!({"name": "John", "email": "invalid-email"}),
        json!({"email": "john@example.com"}),
    ];

    for body in bad_bodies {
        let response = router
            .clone()
            .oneshot(json_request("POST", "/customers", body.clone()))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let json = body_json(response).await?;
        assert!(json["error"].is_string(), "{body}");
        assert_eq!(json["code"], 400);
    }

    let response = router.clone().oneshot(empty_request("GET", "/customers")).await?;
    assert_eq!(body_json(response).await?, json!([]));

    Ok(())
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() -> Result<()> {
    let router = create_test_router();

    let request = Request::builder()
        .method("POST")
        .uri("/customers")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))?;
    let response = router.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await?["error"].is_string());

    // No content type at all is still a client error with a JSON body
    let request = Request::builder()
        .method("POST")
        .uri("/customers")
        .body(Body::from(r#"{"name":"a","email":"a@b.co"}"#))?;
    let response = router.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_list_customers() -> Result<()> {
    let router = create_test_router();

    let response = router.clone().oneshot(empty_request("GET", "/customers")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?, json!([]));

    create(&router, json!({"name": "A", "email": "a@example.com"})).await?;
    create(&router, json!({"name": "B", "email": "b@example.com"})).await?;

    let response = router.oneshot(empty_request("GET", "/customers")).await?;
    let list: Vec<CustomerDto> = serde_json::from_value(body_json(response).await?)?;
    let mut names: Vec<_> = list.into_iter().map(|c| c.name).collect();
    names.sort();
    assert_eq!(names, ["A", "B"]);

    Ok(())
}

#[tokio::test]
async fn test_update_uses_path_id() -> Result<()> {
    let router = create_test_router();
    let created = create(&router, json!({"name": "Old", "email": "old@example.com"})).await?;
    let uri = format!("/customers/{}", created.id);

    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &uri,
            json!({"id": "something-else", "name": "New", "email": "new@example.com", "telephone": "123"}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: CustomerDto = serde_json::from_value(body_json(response).await?)?;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "New");
    assert_eq!(updated.telephone, "123");

    let response = router
        .clone()
        .oneshot(empty_request("GET", "/customers/something-else"))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router.oneshot(empty_request("GET", "/customers")).await?;
    let list: Vec<CustomerDto> = serde_json::from_value(body_json(response).await?)?;
    assert_eq!(list, vec![updated]);

    Ok(())
}

#[tokio::test]
async fn test_update_checks_existence_before_body() -> Result<()> {
    let router = create_test_router();

    // Missing customer wins over a bad body
    let request = Request::builder()
        .method("PUT")
        .uri("/customers/ghost")
        .header("content-type", "application/json")
        .body(Body::from("{broken"))?;
    let response = router.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            "/customers/ghost",
            json!({"name": "X", "email": "x@example.com"}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Existing customer with an invalid body
    let created = create(&router, json!({"name": "A", "email": "a@example.com"})).await?;
    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/customers/{}", created.id),
            json!({"name": "A", "email": "nope"}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_delete_twice_is_not_found() -> Result<()> {
    let router = create_test_router();
    let created = create(&router, json!({"name": "A", "email": "a@example.com"})).await?;
    let uri = format!("/customers/{}", created.id);

    let first = router.clone().oneshot(empty_request("DELETE", &uri)).await?;
    assert_eq!(first.status(), StatusCode::OK);

    let second = router.oneshot(empty_request("DELETE", &uri)).await?;
    assert_eq!(second.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_responses_carry_cors_headers() -> Result<()> {
    let router = create_test_router();

    let response = router
        .clone()
        .oneshot(empty_request("GET", "/customers/missing"))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    let response = router
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/customers")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response.headers()["access-control-allow-methods"],
        "GET, POST, PUT, DELETE, OPTIONS"
    );

    Ok(())
}

/// Store that fails every call, to exercise the 500 paths.
struct BrokenRepo;

#[async_trait]
impl CustomersRepository for BrokenRepo {
    async fn put(&self, _customer: Customer) -> anyhow::Result<()> {
        anyhow::bail!("store unavailable at 10.0.0.7")
    }

    async fn find_by_id(&self, _id: &str) -> anyhow::Result<Option<Customer>> {
        anyhow::bail!("store unavailable at 10.0.0.7")
    }

    async fn list(&self) -> anyhow::Result<Vec<Customer>> {
        anyhow::bail!("store unavailable at 10.0.0.7")
    }

    async fn delete(&self, _id: &str) -> anyhow::Result<()> {
        anyhow::bail!("store unavailable at 10.0.0.7")
    }
}

#[tokio::test]
async fn test_store_failures_are_generic_500s() -> Result<()> {
    let router = router_with(Arc::new(BrokenRepo));
    let valid = json!({"name": "A", "email": "a@example.com"});

    let cases = [
        (json_request("POST", "/customers", valid.clone()), "Failed to create customer"),
        (empty_request("GET", "/customers"), "Failed to get customers"),
        (empty_request("GET", "/customers/x"), "Failed to get customer"),
        (json_request("PUT", "/customers/x", valid), "Failed to check customer"),
        (empty_request("DELETE", "/customers/x"), "Failed to check customer"),
    ];

    for (request, message) in cases {
        let response = router.clone().oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await?;
        assert_eq!(json["error"], message);
        assert!(!json.to_string().contains("10.0.0.7"));
    }

    Ok(())
}

/// In-memory store whose scan takes longer than any sensible handler timeout.
struct SlowListRepo {
    inner: InMemoryCustomersRepository,
    delay: Duration,
}

#[async_trait]
impl CustomersRepository for SlowListRepo {
    async fn put(&self, customer: Customer) -> anyhow::Result<()> {
        self.inner.put(customer).await
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Customer>> {
        self.inner.find_by_id(id).await
    }

    async fn list(&self) -> anyhow::Result<Vec<Customer>> {
        tokio::time::sleep(self.delay).await;
        self.inner.list().await
    }

    async fn delete(&self, id: &str) -> anyhow::Result<()> {
        self.inner.delete(id).await
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_store_still_answers() -> Result<()> {
    let router = router_with(Arc::new(SlowListRepo {
        inner: InMemoryCustomersRepository::new(),
        delay: Duration::from_secs(31),
    }));
    create(&router, json!({"name": "Slow", "email": "slow@example.com"})).await?;

    let response = router.clone().oneshot(empty_request("GET", "/customers")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await?;
    assert_eq!(json.as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn test_error_bodies_carry_request_id() -> Result<()> {
    let router = create_test_router();

    let request = Request::builder()
        .uri("/customers/missing")
        .header("x-request-id", "rid-404")
        .body(Body::empty())?;
    let response = router.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await?;
    assert_eq!(json["error"], "Customer not found");
    assert_eq!(json["request_id"], "rid-404");

    let request = Request::builder()
        .method("POST")
        .uri("/customers")
        .header("content-type", "application/json")
        .body(Body::from(json!({"name": "John Doe"}).to_string()))?;
    let response = router.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let header_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("x-request-id should be generated");
    let json = body_json(response).await?;
    assert_eq!(json["request_id"], header_id);

    Ok(())
}
