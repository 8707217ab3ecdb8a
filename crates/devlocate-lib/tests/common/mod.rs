//! Common test utilities and fixture helpers.
//!
//! Provides an in-process stand-in for the OSRM route API so proxy tests can
//! exercise real HTTP round trips without network access.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// How the fake upstream answers every request.
#[derive(Debug, Clone)]
pub enum Upstream {
    /// Reply immediately with the given status and JSON body.
    Json(StatusCode, Value),
    /// Reply with a raw, non-JSON body.
    Raw(StatusCode, &'static str),
    /// Wait before replying with a 200 JSON body.
    Slow(Duration, Value),
}

#[derive(Clone)]
struct FakeState {
    behaviour: Upstream,
    hits: Arc<AtomicUsize>,
    last_uri: Arc<Mutex<Option<String>>>,
}

/// Handle to a running fake OSRM server.
pub struct FakeOsrm {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    last_uri: Arc<Mutex<Option<String>>>,
}

impl FakeOsrm {
    /// Start a server on an ephemeral loopback port.
    pub async fn start(behaviour: Upstream) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let last_uri = Arc::new(Mutex::new(None));
        let state = FakeState {
            behaviour,
            hits: hits.clone(),
            last_uri: last_uri.clone(),
        };

        let app = Router::new().fallback(respond).with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake osrm");
        let addr = listener.local_addr().expect("fake osrm addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}/route/v1"),
            hits,
            last_uri,
        }
    }

    /// Number of requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Path and query of the most recent request.
    pub fn last_uri(&self) -> Option<String> {
        self.last_uri.lock().expect("uri lock").clone()
    }
}

async fn respond(State(state): State<FakeState>, uri: Uri) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_uri.lock().expect("uri lock") = Some(uri.to_string());

    match state.behaviour {
        Upstream::Json(status, body) => (status, Json(body)).into_response(),
        Upstream::Raw(status, body) => (status, body).into_response(),
        Upstream::Slow(delay, body) => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, Json(body)).into_response()
        }
    }
}

/// A loopback address nothing is listening on.
pub async fn closed_port_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr: SocketAddr = listener.local_addr().expect("probe addr");
    drop(listener);
    format!("http://{addr}/route/v1")
}

/// Successful OSRM body with one route.
pub fn ok_route(distance_m: f64, duration_s: f64) -> Value {
    json!({
        "code": "Ok",
        "routes": [{
            "distance": distance_m,
            "duration": duration_s,
            "geometry": {
                "type": "LineString",
                "coordinates": [[-74.006, 40.7128], [-73.99, 40.73], [-73.9776, 40.7614]]
            },
            "legs": [],
            "weight": duration_s,
            "weight_name": "routability"
        }],
        "waypoints": []
    })
}
