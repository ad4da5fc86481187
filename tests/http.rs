use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct ProgramMetric {
    name: String,
    value: u64,
    target: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct KpiProgress {
    name: String,
    current: u64,
    target: u64,
    percentage: u64,
    status: String,
}

#[derive(Debug, Deserialize)]
struct SmsCampaign {
    name: String,
    delivered: u64,
    clicked: u64,
    rate: f64,
}

#[derive(Debug, Deserialize)]
struct DashboardState {
    program_metrics: Vec<ProgramMetric>,
    sms_campaigns: Vec<SmsCampaign>,
    kpis: Vec<KpiProgress>,
    last_updated: String,
}

impl DashboardState {
    fn kpi(&self, name: &str) -> &KpiProgress {
        self.kpis
            .iter()
            .find(|kpi| kpi.name == name)
            .expect("missing kpi")
    }

    fn campaign(&self, name: &str) -> Option<&SmsCampaign> {
        self.sms_campaigns.iter().find(|campaign| campaign.name == name)
    }
}

#[derive(Debug, Deserialize)]
struct FunnelStage {
    stage: String,
    value: u64,
    percent_of_previous: f64,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "wellness_dashboard_http_{}_{}.json",
        std::process::id(),
        nanos
    ));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/state")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_wellness_dashboard"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn fetch_state(client: &Client, base_url: &str) -> DashboardState {
    client
        .get(format!("{base_url}/api/state"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_state_starts_from_defaults_or_saved_snapshot() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let state = fetch_state(&client, &server.base_url).await;
    let registrants = state
        .program_metrics
        .iter()
        .find(|metric| metric.name == "Registrants")
        .expect("missing registrants");
    assert_eq!(registrants.target, Some(10_000));
    assert!(registrants.value > 0);
    assert!(!state.last_updated.is_empty());

    let enrollment = state.kpi("Enrollment");
    assert_eq!(enrollment.current, registrants.value);
}

#[tokio::test]
async fn http_registrant_update_recomputes_enrollment() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/program", server.base_url))
        .json(&serde_json::json!({ "values": { "Registrants": 12000 } }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let saved: DashboardState = response.json().await.unwrap();
    let enrollment = saved.kpi("Enrollment");
    assert_eq!(enrollment.target, 10_000);
    assert_eq!(enrollment.percentage, 120);
    assert_eq!(enrollment.status, "Achieved");

    let state = fetch_state(&client, &server.base_url).await;
    assert_eq!(state.kpi("Enrollment").percentage, 120);
    assert_eq!(state.last_updated, saved.last_updated);
}

#[tokio::test]
async fn http_add_campaign_rejects_duplicates() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let body = serde_json::json!({ "name": "Week 3 Reminder", "delivered": 1000, "clicked": 75 });

    let first = client
        .post(format!("{}/api/sms/campaigns", server.base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert!(first.status().is_success());
    let saved: DashboardState = first.json().await.unwrap();
    let campaign = saved.campaign("Week 3 Reminder").expect("campaign missing");
    assert_eq!(campaign.delivered, 1_000);
    assert_eq!(campaign.clicked, 75);
    assert_eq!(campaign.rate, 7.5);

    let second = client
        .post(format!("{}/api/sms/campaigns", server.base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let state = fetch_state(&client, &server.base_url).await;
    let count = state
        .sms_campaigns
        .iter()
        .filter(|campaign| campaign.name == "Week 3 Reminder")
        .count();
    assert_eq!(count, 1);
    assert_eq!(state.last_updated, saved.last_updated);
}

#[tokio::test]
async fn http_blank_campaign_name_is_bad_request() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/sms/campaigns", server.base_url))
        .json(&serde_json::json!({ "name": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_funnel_has_five_ordered_stages() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let funnel: Vec<FunnelStage> = client
        .get(format!("{}/api/funnel", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(funnel.len(), 5);
    assert_eq!(funnel[0].stage, "Impressions (Ads)");
    assert_eq!(funnel[0].percent_of_previous, 100.0);
    assert_eq!(funnel[4].stage, "Week 0 Complete");
    assert!(funnel.iter().all(|stage| stage.value > 0));
}

#[tokio::test]
async fn http_index_renders_dashboard() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client.get(&server.base_url).send().await.unwrap();
    assert!(response.status().is_success());
    let body = response.text().await.unwrap();
    assert!(body.contains("Self-Care School Dashboard"));
    assert!(body.contains("Program Funnel"));
    assert!(!body.contains("{{"));
}

#[tokio::test]
async fn http_form_campaign_redirects_home() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let response = client
        .post(format!("{}/sms/add", server.base_url))
        .form(&[("name", "Form Campaign"), ("delivered", "500"), ("clicked", "50")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/");

    let state = fetch_state(&client, &server.base_url).await;
    let campaign = state.campaign("Form Campaign").expect("campaign missing");
    assert_eq!(campaign.delivered, 500);
    assert_eq!(campaign.clicked, 50);
    assert_eq!(campaign.rate, 10.0);
}

#[tokio::test]
async fn http_podcast_plays_update_summary() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/podcast", server.base_url))
        .json(&serde_json::json!({
            "series": "Black History Bootcamp",
            "week": 2,
            "day": 2,
            "plays": 1500
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let summary: serde_json::Value = client
        .get(format!("{}/api/summary", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let bootcamp = summary["podcasts"]
        .as_array()
        .unwrap()
        .iter()
        .find(|series| series["name"] == "Black History Bootcamp")
        .expect("missing bootcamp series");
    assert_eq!(bootcamp["total_plays"], 6_015);
    assert_eq!(bootcamp["total_episodes"], 4);

    let missing = client
        .post(format!("{}/api/podcast", server.base_url))
        .json(&serde_json::json!({
            "series": "Black History Bootcamp",
            "week": 9,
            "day": 1,
            "plays": 10
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_fresh_server_serves_default_snapshot() {
    let _guard = TEST_LOCK.lock().await;
    let server = spawn_server().await;
    let client = Client::new();

    let state = fetch_state(&client, &server.base_url).await;
    let registrants = state
        .program_metrics
        .iter()
        .find(|metric| metric.name == "Registrants")
        .expect("missing registrants");
    assert_eq!(registrants.value, 10_595);
    assert_eq!(registrants.target, Some(10_000));

    let statuses: Vec<(&str, &str)> = state
        .kpis
        .iter()
        .map(|kpi| (kpi.name.as_str(), kpi.status.as_str()))
        .collect();
    assert_eq!(
        statuses,
        [
            ("Enrollment", "Achieved"),
            ("18-25 Enrollment", "At Risk"),
            ("Week 0 Completion", "Behind"),
            ("Average Weekly Badges", "Behind"),
            ("Site Traffic", "At Risk"),
            ("Downloads", "At Risk"),
            ("Stories Submitted", "Achieved"),
        ]
    );
    assert_eq!(state.kpi("Site Traffic").percentage, 12);
    assert_eq!(state.kpi("Downloads").percentage, 22);
}
