use std::time::Duration;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum_server::Handle;
use log::{error, info};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod auth;
mod chat;
mod error;
mod event;
#[cfg(test)]
mod fake;
mod integration;
mod message;
mod project;
mod request;
mod role;
mod schema;
mod state;
mod task;
mod user;

use error::Result;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn router(state: AppState) -> Router {
    let authorize = from_fn_with_state(state.clone(), auth::middleware::authorize);

    let api = Router::new()
        .merge(auth::api(state.clone()))
        .merge(user::api(state.clone()))
        .merge(project::api(state.clone()))
        .merge(request::api(state.clone()))
        .merge(task::api(state.clone()))
        .merge(chat::api(state.clone()))
        .merge(message::api(state.clone()))
        .nest(
            "/admin",
            Router::new()
                .merge(role::admin(state.clone()))
                .merge(user::admin(state.clone()))
                .merge(project::admin(state.clone()))
                .merge(request::admin(state.clone()))
                .merge(task::admin(state.clone()))
                .merge(chat::admin(state.clone())),
        )
        .route_layer(authorize.clone());

    Router::new()
        .nest("/api", auth::public(state.clone()).merge(api))
        .merge(event::ws(state.clone()).route_layer(authorize))
        .nest_service("/static", ServeDir::new(state.storage.static_dir()))
}

#[tokio::main]
async fn main() {
    let cfg = integration::Config::default();
    let state = AppState::init(&cfg);
    let hub = state.hub.clone();

    let app = router(state).layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
            .allow_origin(cfg.env.allow_origin())
            .allow_methods(cfg.env.allow_methods())
            .allow_headers(cfg.env.allow_headers()),
    );

    let handle = Handle::new();
    tokio::spawn(shutdown(handle.clone(), hub));

    let addr = cfg.env.addr();
    info!("Starting service on {addr}");

    if let Err(e) = axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await
    {
        error!("Service stopped with error: {e}");
    }
}

async fn shutdown(handle: Handle, hub: event::Hub) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        return;
    }

    info!("Shutting down");
    hub.close_all().await;
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

#[cfg(test)]
mod test {
    use std::net::SocketAddr;

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use futures::StreamExt;
    use serde_json::{Value, json};
    use tokio::net::{TcpListener, TcpStream};
    use tokio_tungstenite::tungstenite;
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
    use tower::ServiceExt;

    use super::*;
    use crate::fake::Store;
    use crate::state::Repositories;

    fn app(store: &Store) -> Router {
        router(AppState::wire(
            &integration::Config::test(),
            Repositories::fake(store),
        ))
    }

    async fn json_body(res: axum::response::Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn signup_and_login(app: &Router, store: &Store, name: &str) -> String {
        let role = store.role("USER");
        let email = format!("{}@welt.io", name.to_lowercase());

        let signup = json!({
            "first_name": name,
            "email": email,
            "password": "secret",
            "role_id": role.id(),
        });
        let res = app
            .clone()
            .oneshot(
                Request::post("/api/auth/signup")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(signup.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = app
            .clone()
            .oneshot(
                Request::post("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(format!("username={email}&password=secret")))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        json_body(res).await["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => req.body(Body::empty()),
        };

        app.clone().oneshot(req.unwrap()).await.unwrap()
    }

    type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

    async fn serve(app: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        addr
    }

    async fn connect(addr: SocketAddr, chat_id: &str, token: &str) -> tungstenite::Result<Socket> {
        let url = format!("ws://{addr}/ws/chats/{chat_id}?access_token={token}");
        let (ws, _) = connect_async(url).await?;
        Ok(ws)
    }

    async fn wait_tracked(hub: &event::Hub, chat_id: &chat::Id, tracked: bool) {
        for _ in 0..100 {
            if hub.is_tracked(chat_id).await == tracked {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("chat {chat_id} tracked state never became {tracked}");
    }

    /// Two signed up users sharing a private chat, plus an outsider.
    struct Room {
        hub: event::Hub,
        app: Router,
        jora: String,
        valera: String,
        igor: String,
        chat_id: String,
    }

    impl Room {
        fn chat(&self) -> chat::Id {
            chat::Id::from(uuid::Uuid::parse_str(&self.chat_id).unwrap())
        }
    }

    async fn room() -> Room {
        let store = Store::default();
        let state = AppState::wire(
            &integration::Config::test(),
            Repositories::fake(&store),
        );
        let hub = state.hub.clone();
        let app = router(state);

        let jora = signup_and_login(&app, &store, "Jora").await;
        let valera = signup_and_login(&app, &store, "Valera").await;
        let igor = signup_and_login(&app, &store, "Igor").await;

        let res = call(&app, Method::GET, "/api/auth/me", &valera, None).await;
        let valera_id = json_body(res).await["id"].clone();
        let res = call(
            &app,
            Method::POST,
            "/api/chats/private",
            &jora,
            Some(json!({ "user_id": valera_id })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let chat_id = json_body(res).await["id"].as_str().unwrap().to_string();

        Room {
            hub,
            app,
            jora,
            valera,
            igor,
            chat_id,
        }
    }

    #[tokio::test]
    async fn should_stream_message_events_to_participant() {
        let room = room().await;
        let addr = serve(room.app.clone()).await;

        let mut ws = connect(addr, &room.chat_id, &room.valera).await.unwrap();
        wait_tracked(&room.hub, &room.chat(), true).await;

        let res = call(
            &room.app,
            Method::POST,
            "/api/messages",
            &room.jora,
            Some(json!({ "text": "Salut", "chat_id": room.chat_id })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let message_id = json_body(res).await["id"].clone();

        let frame = ws.next().await.unwrap().unwrap();
        assert_eq!(frame.to_text().unwrap(), "New message received");

        let res = call(
            &room.app,
            Method::DELETE,
            "/api/messages",
            &room.jora,
            Some(json!({ "id": message_id })),
        )
        .await;
        assert!(res.status().is_success());

        let frame = ws.next().await.unwrap().unwrap();
        let payload: Value = serde_json::from_str(frame.to_text().unwrap()).unwrap();
        assert_eq!(
            payload,
            json!({ "action": "delete", "message_id": message_id })
        );

        ws.close(None).await.unwrap();
        wait_tracked(&room.hub, &room.chat(), false).await;
    }

    #[tokio::test]
    async fn should_release_listener_when_client_vanishes() {
        let room = room().await;
        let addr = serve(room.app.clone()).await;

        let ws = connect(addr, &room.chat_id, &room.jora).await.unwrap();
        wait_tracked(&room.hub, &room.chat(), true).await;

        drop(ws);
        wait_tracked(&room.hub, &room.chat(), false).await;
    }

    #[tokio::test]
    async fn should_refuse_upgrade_for_outsider_and_unknown_chat() {
        let room = room().await;
        let addr = serve(room.app.clone()).await;

        let Err(tungstenite::Error::Http(res)) = connect(addr, &room.chat_id, &room.igor).await
        else {
            panic!("outsider must not subscribe");
        };
        assert_eq!(res.status().as_u16(), 403);

        let unknown = chat::Id::random().to_string();
        let Err(tungstenite::Error::Http(res)) = connect(addr, &unknown, &room.jora).await else {
            panic!("unknown chat must not be subscribable");
        };
        assert_eq!(res.status().as_u16(), 404);

        assert!(!room.hub.is_tracked(&room.chat()).await);
    }

    #[tokio::test]
    async fn should_create_group_with_creator_only() {
        let room = room().await;

        let res = call(
            &room.app,
            Method::POST,
            "/api/chats",
            &room.jora,
            Some(json!({ "name": "Echipa", "is_group_chat": true })),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let chat = json_body(res).await;
        assert_eq!(chat["name"], "Echipa");
        assert_eq!(chat["is_group_chat"], true);
    }

    #[tokio::test]
    async fn should_reject_api_call_without_credentials() {
        let store = Store::default();

        let res = app(&store)
            .oneshot(Request::get("/api/chats/my").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(res).await["message"],
            "Could not validate credentials"
        );
    }

    #[tokio::test]
    async fn should_chat_privately_after_login() {
        let store = Store::default();
        let app = app(&store);

        let jora = signup_and_login(&app, &store, "Jora").await;
        let igor = signup_and_login(&app, &store, "Igor").await;

        let res = app
            .clone()
            .oneshot(
                Request::get("/api/auth/me")
                    .header(header::AUTHORIZATION, format!("Bearer {igor}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let igor_id = json_body(res).await["id"].clone();

        let res = app
            .clone()
            .oneshot(
                Request::post("/api/chats/private")
                    .header(header::AUTHORIZATION, format!("Bearer {jora}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "user_id": igor_id }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let chat_id = json_body(res).await["id"].clone();

        let res = app
            .clone()
            .oneshot(
                Request::post("/api/messages")
                    .header(header::AUTHORIZATION, format!("Bearer {jora}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "text": "Salut", "chat_id": chat_id }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(res.status().is_success());

        let res = app
            .clone()
            .oneshot(
                Request::get("/api/chats/my")
                    .header(header::AUTHORIZATION, format!("Bearer {igor}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let directory = json_body(res).await;
        let chats = directory["chats"].as_array().unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0]["name"], "Jora");
        assert_eq!(chats[0]["last_message"]["text"], "Salut");
        assert!(directory["users_without_chats"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_keep_admin_routes_for_staff() {
        let store = Store::default();
        let app = app(&store);
        let token = signup_and_login(&app, &store, "Jora").await;

        let res = app
            .oneshot(
                Request::get("/api/admin/projects")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
