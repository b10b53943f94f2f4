use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// One scripted endpoint: exact method + url (query string included) mapped
/// to a canned response.
#[derive(Debug, Clone)]
pub struct StubRoute {
    pub method: &'static str,
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl StubRoute {
    pub fn json(method: &'static str, url: &str, status: u16, body: serde_json::Value) -> Self {
        Self {
            method,
            url: url.to_owned(),
            status,
            body: body.to_string(),
        }
    }

    pub fn text(method: &'static str, url: &str, status: u16, body: &str) -> Self {
        Self {
            method,
            url: url.to_owned(),
            status,
            body: body.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub body: String,
    pub authorization: Option<String>,
}

/// In-process stand-in for the catalog backend, recording every request it
/// receives so tests can assert on traffic (including its absence).
pub struct BackendStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl BackendStub {
    pub fn spawn(routes: Vec<StubRoute>) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start backend stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let method = request.method().to_string();
                let url = request.url().to_owned();
                let authorization = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Authorization"))
                    .map(|h| h.value.as_str().to_owned());

                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);

                recorded
                    .lock()
                    .expect("record request")
                    .push(RecordedRequest {
                        method: method.clone(),
                        url: url.clone(),
                        body,
                        authorization,
                    });

                let route = routes
                    .iter()
                    .find(|r| r.method.eq_ignore_ascii_case(&method) && r.url == url);
                let response = match route {
                    Some(route) => {
                        tiny_http::Response::from_string(route.body.clone())
                            .with_status_code(route.status)
                    }
                    None => tiny_http::Response::from_string("not found").with_status_code(404),
                };
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("read requests").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("count requests").len()
    }
}

impl Drop for BackendStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
