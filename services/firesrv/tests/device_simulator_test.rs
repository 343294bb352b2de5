//! End-to-end tests against the device simulator over loopback TCP

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use firesrv::api::{create_routes, AppState};
use firesrv::config::FireplaceConfig;
use firesrv::protocol::simulator::SimulatedDevice;
use firesrv::protocol::{hardware_to_percentage, Command};
use firesrv::{
    create_controller, ApiKeyStore, AppConfig, ControllerKind, DeviceSimulator, FireSrvError,
    FireplaceClient,
};
use tower::util::ServiceExt;

fn fireplace_config(addr: SocketAddr) -> FireplaceConfig {
    FireplaceConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        connect_timeout_ms: 1000,
        command_timeout_ms: 200,
        status_timeout_ms: 200,
        step_timeout_ms: 200,
        step_pause_ms: 10,
        ..FireplaceConfig::default()
    }
}

async fn start_simulator() -> (DeviceSimulator, FireplaceClient) {
    let simulator = DeviceSimulator::new();
    let addr = simulator.start("127.0.0.1:0").await.unwrap();
    let client = FireplaceClient::tcp(&fireplace_config(addr)).unwrap();
    (simulator, client)
}

#[tokio::test]
async fn test_initial_status() {
    let (_simulator, client) = start_simulator().await;

    let status = client.get_status().await.unwrap();
    assert!(!status.power);
    assert_eq!(status.flame_level, 0);
    assert!(!status.burner2);
    assert!(status.pilot);
    assert_eq!(status.raw_response.len(), 106);
}

#[tokio::test]
async fn test_status_reflects_preset_state() {
    let simulator = DeviceSimulator::with_state(SimulatedDevice {
        power: true,
        flame: 0x8A,
        burner2: true,
        pilot: true,
        ignition_stage: 0,
    });
    let addr = simulator.start("127.0.0.1:0").await.unwrap();
    let client = FireplaceClient::tcp(&fireplace_config(addr)).unwrap();

    let status = client.get_status().await.unwrap();
    assert!(status.power);
    assert_eq!(status.flame_level, hardware_to_percentage(0x8A));
    assert!(status.burner2);
    assert!(status.pilot);
}

#[tokio::test]
async fn test_power_on_flame_burner2_power_off() {
    let (simulator, client) = start_simulator().await;

    assert!(client.power_on().await);
    let status = client.get_status().await.unwrap();
    assert!(status.power);
    assert_eq!(status.flame_level, hardware_to_percentage(0xBF));

    assert!(client.set_flame_level(100).await.unwrap());
    assert!(client.burner2_on().await);
    let status = client.get_status().await.unwrap();
    assert_eq!(status.flame_level, 100);
    assert!(status.burner2);

    assert!(client.burner2_off().await);
    assert!(client.power_off().await);
    let status = client.get_status().await.unwrap();
    assert!(!status.power);
    assert!(!status.burner2);

    let received = simulator.received_commands().await;
    assert_eq!(
        &received[..4],
        &[
            Command::PowerOnInit,
            Command::FirmwareQuery,
            Command::Ignite,
            Command::Status,
        ]
    );
    assert!(received.contains(&Command::SetFlame(0xFF)));
}

#[tokio::test]
async fn test_silent_device() {
    let (simulator, client) = start_simulator().await;
    simulator.set_silent(true);

    // Commands do not need an acknowledgement
    assert!(client.burner2_on().await);
    assert!(simulator.state().await.burner2);

    let err = client.get_status().await.unwrap_err();
    assert!(matches!(err, FireSrvError::ProtocolError(_)));
}

#[tokio::test]
async fn test_unreachable_device() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = FireplaceClient::tcp(&fireplace_config(addr)).unwrap();
    let err = client.get_status().await.unwrap_err();
    assert!(err.is_connection_error());
    assert!(!client.power_on().await);
    assert!(!client.power_off().await);
    assert!(!client.set_flame_level(10).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_clients_share_one_device() {
    let (simulator, client) = start_simulator().await;
    let client = Arc::new(client);

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                if i % 2 == 0 {
                    client.get_status().await.map(|_| true)
                } else {
                    client.set_flame_level(i * 10).await
                }
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().unwrap());
    }
    assert_eq!(simulator.received_commands().await.len(), 10);
}

#[tokio::test]
async fn test_device_controller_from_config_file() {
    let simulator = DeviceSimulator::new();
    let addr = simulator.start("127.0.0.1:0").await.unwrap();

    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "fireplace:\n  host: \"{}\"\n  port: {}\n  controller: real\n  step_pause_ms: 10",
        addr.ip(),
        addr.port()
    )
    .unwrap();

    let config = AppConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.fireplace.controller, ControllerKind::Device);

    let client = Arc::new(FireplaceClient::tcp(&config.fireplace).unwrap());
    let controller = create_controller(config.fireplace.controller, client);
    assert!(controller.power_on().await);
    assert!(controller.get_status().await.unwrap().power);
}

#[tokio::test]
async fn test_http_api_drives_simulator() {
    let simulator = DeviceSimulator::new();
    let addr = simulator.start("127.0.0.1:0").await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.fireplace = fireplace_config(addr);
    config.api.database_path = dir.path().join("keys.db").display().to_string();

    let keys = ApiKeyStore::open(&config.api.database_path).await.unwrap();
    let key = keys.create("integration").await.unwrap().key;

    let client = Arc::new(FireplaceClient::tcp(&config.fireplace).unwrap());
    let controller = create_controller(ControllerKind::Device, Arc::clone(&client));
    let app = create_routes(Arc::new(AppState::new(controller, client, keys, config)));

    for uri in ["/api/power/on", "/api/flame/40"] {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("X-API-Key", key.as_str())
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }

    let state = simulator.state().await;
    assert!(state.power);
    assert_eq!(hardware_to_percentage(state.flame), 40);
}
