// ============================================================================
// Segmentator Cloud - Serveur HTTP de test
// ============================================================================
// Remplace le service distant: enregistre chaque requête et répond avec le
// code et le corps configurés pour le chemin. Tourne dans son propre thread
// (système actix dédié) pour que le client bloquant reste hors runtime.
// ============================================================================

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use std::collections::HashMap;
use std::sync::{mpsc, Mutex};
use std::thread;

/// Requête reçue par le serveur de test
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("JSON body")
    }

    /// Valeur d'un champ texte d'un corps multipart
    pub fn multipart_field(&self, name: &str) -> Option<String> {
        let body = self.body_text();
        let marker = format!("name=\"{}\"", name);
        let start = body.find(&marker)?;
        let rest = &body[start..];
        let value_start = rest.find("\r\n\r\n")? + 4;
        let value = &rest[value_start..];
        let value_end = value.find("\r\n--")?;
        Some(value[..value_end].to_string())
    }
}

struct StubState {
    routes: HashMap<String, (u16, String)>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct StubServer {
    base_url: String,
    state: web::Data<StubState>,
    handle: ServerHandle,
}

impl StubServer {
    /// Démarre le serveur; `routes` = (chemin, code, corps). Les chemins
    /// absents répondent 404.
    pub fn start(routes: &[(&str, u16, &str)]) -> Self {
        let state = web::Data::new(StubState {
            routes: routes
                .iter()
                .map(|(path, status, body)| (path.to_string(), (*status, body.to_string())))
                .collect(),
            requests: Mutex::new(Vec::new()),
        });

        let server_state = state.clone();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            actix_web::rt::System::new().block_on(async move {
                let server = HttpServer::new(move || {
                    App::new()
                        .app_data(server_state.clone())
                        .app_data(web::PayloadConfig::new(16 * 1024 * 1024))
                        .default_service(web::to(record_request))
                })
                .workers(1)
                .bind(("127.0.0.1", 0))
                .expect("bind stub server");

                let port = server.addrs()[0].port();
                let server = server.run();
                tx.send((port, server.handle())).expect("publish stub address");
                let _ = server.await;
            });
        });

        let (port, handle) = rx.recv().expect("stub server started");

        Self {
            base_url: format!("http://127.0.0.1:{}/api", port),
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        // La commande d'arrêt part immédiatement, inutile d'attendre la future
        drop(self.handle.stop(false));
    }
}

async fn record_request(req: HttpRequest, body: web::Bytes, state: web::Data<StubState>) -> HttpResponse {
    let content_type = req
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    state.requests.lock().unwrap().push(RecordedRequest {
        method: req.method().to_string(),
        path: req.path().to_string(),
        query: req.query_string().to_string(),
        content_type,
        body: body.to_vec(),
    });

    match state.routes.get(req.path()) {
        Some((status, body)) => HttpResponse::build(StatusCode::from_u16(*status).unwrap())
            .content_type("application/json")
            .body(body.clone()),
        None => HttpResponse::NotFound().finish(),
    }
}

/// URL vers un port fermé (connexion refusée)
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api", port)
}
