use super::*;
use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    posted_expenses: Arc<Mutex<Vec<Value>>>,
    chat_messages: Arc<Mutex<Vec<Value>>>,
}

async fn list_expenses_handler() -> Json<Value> {
    Json(json!([
        { "id": 1, "title": "Coffee", "amount": 3.5, "category": "Food", "date": "2024-01-01" },
        { "id": 2, "title": "Taxi", "amount": "12", "category": "Transport", "date": "2024-01-02" },
    ]))
}

async fn create_expense_handler(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.posted_expenses.lock().await.push(body);
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Expense Added", "id": 7 })),
    )
}

async fn chat_handler(State(state): State<ServerState>, Json(body): Json<Value>) -> Json<Value> {
    state.chat_messages.lock().await.push(body);
    Json(json!({ "bot_response": "Hi, I can help you track your expenses." }))
}

async fn failing_handler() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "code": "internal", "message": "database offline" })),
    )
}

async fn slow_handler() -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(500)).await;
    Json(json!([]))
}

async fn spawn_server(app: Router) -> ServiceEndpoints {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let base = format!("http://{addr}");
    ServiceEndpoints::new(&base, &base).expect("endpoints")
}

async fn spawn_backend() -> (ServiceEndpoints, ServerState) {
    let state = ServerState::default();
    let app = Router::new()
        .route(
            "/expenses",
            get(list_expenses_handler).post(create_expense_handler),
        )
        .route("/chat", post(chat_handler))
        .with_state(state.clone());
    (spawn_server(app).await, state)
}

#[tokio::test]
async fn lists_expenses_with_lenient_amounts() {
    let (endpoints, _state) = spawn_backend().await;
    let store = HttpExpenseStore::new(&endpoints).expect("store");

    let expenses = store.list_expenses().await.expect("list");
    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[0].id, Some(ExpenseId::new("1")));
    assert_eq!(expenses[1].amount, Some(12.0));
}

#[tokio::test]
async fn create_posts_numeric_amount_and_returns_store_id() {
    let (endpoints, state) = spawn_backend().await;
    let store = HttpExpenseStore::new(&endpoints).expect("store");

    let id = store
        .create_expense(&NewExpense {
            title: "Coffee".into(),
            amount: 12.5,
            category: "Food".into(),
            date: "2024-01-01".into(),
        })
        .await
        .expect("create");

    assert_eq!(id, ExpenseId::new("7"));
    let posted = state.posted_expenses.lock().await.clone();
    assert_eq!(
        posted,
        vec![json!({
            "title": "Coffee",
            "amount": 12.5,
            "category": "Food",
            "date": "2024-01-01"
        })]
    );
}

#[tokio::test]
async fn ask_sends_user_message_and_returns_bot_response() {
    let (endpoints, state) = spawn_backend().await;
    let chat = HttpChatService::new(&endpoints).expect("chat");

    let reply = chat.ask("hello").await.expect("reply");
    assert_eq!(reply, "Hi, I can help you track your expenses.");
    assert_eq!(
        *state.chat_messages.lock().await,
        vec![json!({ "user_message": "hello" })]
    );
}

#[tokio::test]
async fn non_success_status_maps_to_status_error() {
    let app = Router::new()
        .route("/expenses", get(failing_handler).post(failing_handler))
        .route("/chat", post(failing_handler));
    let endpoints = spawn_server(app).await;
    let store = HttpExpenseStore::new(&endpoints).expect("store");

    let err = store.list_expenses().await.expect_err("should fail");
    assert!(matches!(
        err,
        ClientError::Status { status } if status == StatusCode::INTERNAL_SERVER_ERROR
    ));

    let chat = HttpChatService::new(&endpoints).expect("chat");
    let err = chat.ask("hello").await.expect_err("should fail");
    assert_eq!(err.category(), crate::error::ErrorCategory::Transport);
}

#[tokio::test]
async fn create_response_without_id_is_a_decode_error() {
    let app = Router::new().route(
        "/expenses",
        post(|| async { Json(json!({ "message": "Expense Added" })) }),
    );
    let endpoints = spawn_server(app).await;
    let store = HttpExpenseStore::new(&endpoints).expect("store");

    let err = store
        .create_expense(&NewExpense {
            title: "Coffee".into(),
            amount: 1.0,
            category: "Food".into(),
            date: "2024-01-01".into(),
        })
        .await
        .expect_err("should fail");
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn slow_service_surfaces_as_timeout() {
    let app = Router::new().route("/expenses", get(slow_handler));
    let endpoints = spawn_server(app)
        .await
        .with_request_timeout(Duration::from_millis(100));
    let store = HttpExpenseStore::new(&endpoints).expect("store");

    let err = store.list_expenses().await.expect_err("should time out");
    assert!(err.is_timeout(), "unexpected error: {err}");
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let base = format!("http://{addr}");
    let endpoints = ServiceEndpoints::new(&base, &base).expect("endpoints");
    let store = HttpExpenseStore::new(&endpoints).expect("store");

    let err = store.list_expenses().await.expect_err("should fail");
    assert!(matches!(err, ClientError::Transport(_)));
}
