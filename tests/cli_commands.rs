use solekit::commands::{self, SessionSource};
use solekit::{Config, FootSide, ShoeSize};
use solekit_designer::{
    DimensionStore, EditorSession, JsonFileSessionStore, PieceDimensions, SessionStore,
};
use std::sync::Arc;

fn quick_config(dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.print.settle_delay_ms = 0;
    config.storage.sessions_dir = dir.join("sessions");
    config
}

async fn store_session(config: &Config, patient: &str) -> EditorSession {
    let store: Arc<dyn SessionStore> =
        Arc::new(JsonFileSessionStore::new(&config.storage.sessions_dir));
    let dims = DimensionStore::catalog_only();
    let mut session = EditorSession::new(
        patient,
        FootSide::Right,
        ShoeSize::new(39).expect("size"),
        config.editor.clone(),
    );
    let state = session.controller_mut().state_mut();
    state.toggle_piece("medial_arch_support", &dims).expect("toggle");
    state.toggle_piece("heel_spur_pad", &dims).expect("toggle");
    session.save(store).await;
    session
}

#[tokio::test]
async fn print_stored_session_by_patient() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = quick_config(dir.path());
    store_session(&config, "patient-42").await;

    let output = dir.path().join("page.svg");
    let doc = commands::print_session(
        SessionSource::Stored {
            patient_id: "patient-42".to_string(),
            side: FootSide::Right,
        },
        &output,
        &config,
    )
    .await
    .expect("print");

    assert_eq!(doc.shoe_size.value(), 39);
    let svg = std::fs::read_to_string(&output).expect("read");
    assert!(svg.contains("piece-medial_arch_support"));
    assert!(svg.contains("piece-heel_spur_pad"));
}

#[tokio::test]
async fn print_snapshot_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = quick_config(dir.path());
    let session = store_session(&config, "patient-43").await;

    let file = dir.path().join("snapshot.json");
    let json = serde_json::to_string(&session.snapshot()).expect("encode");
    std::fs::write(&file, json).expect("write");

    let output = dir.path().join("out").join("page.svg");
    let doc = commands::print_session(SessionSource::File(file), &output, &config)
        .await
        .expect("print");
    assert_eq!(doc.foot_side, FootSide::Right);
    assert!(output.exists());
}

#[tokio::test]
async fn missing_stored_session_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = quick_config(dir.path());
    let result = commands::print_session(
        SessionSource::Stored {
            patient_id: "ghost".to_string(),
            side: FootSide::Left,
        },
        &dir.path().join("page.svg"),
        &config,
    )
    .await;
    assert!(result.is_err());
}

#[test]
fn catalog_uses_configured_overrides() {
    let dir = tempfile::tempdir().expect("tempdir");
    let overrides = dir.path().join("overrides.json");
    let dims = vec![PieceDimensions {
        id: "toe_crest".to_string(),
        name: "Toe crest".to_string(),
        thickness_mm: 8.0,
        width_cm: 7.0,
        depth_cm: 2.5,
        material: "Silicone".to_string(),
        is_complete: true,
    }];
    std::fs::write(&overrides, serde_json::to_string(&dims).expect("encode")).expect("write");

    let mut config = quick_config(dir.path());
    config.storage.overrides_file = Some(overrides);
    let store = commands::dimension_store(&config).expect("store");
    let lines = commands::catalog_report(ShoeSize::default(), &store);
    let toe = lines.iter().find(|l| l.id == "toe_crest").expect("toe crest");
    assert_eq!(toe.width_cm, 7.0);
    assert_eq!(toe.material, "Silicone");
}

#[test]
fn explicit_config_file_is_loaded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("solekit.toml");
    std::fs::write(&path, "[print]\nmargin_units = 40.0\n").expect("write");

    let config = commands::load_config(Some(&path)).expect("config");
    assert_eq!(config.print.margin_units, 40.0);

    let missing = dir.path().join("absent.toml");
    assert!(commands::load_config(Some(&missing)).is_err());
}
