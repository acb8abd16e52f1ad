use std::sync::Arc;

use student_records::{
    config::Config,
    store::{RecordStore, Student},
    summarization::{OllamaChatClient, SummaryGateway},
};

#[tokio::test]
#[ignore = "Requires live Ollama"]
async fn live_ollama_summary_roundtrip() {
    let config = Config::from_env().expect("config");
    let store = Arc::new(RecordStore::new());
    store
        .create(Student {
            id: 1,
            name: "Ana".into(),
            age: 20,
            email: "ana@example.com".into(),
        })
        .expect("seed");
    let client = OllamaChatClient::from_config(&config).expect("client");
    let gateway = SummaryGateway::new(store, Arc::new(client));

    let summary = gateway
        .summarize(1)
        .await
        .expect("failed to request summary from Ollama");
    assert!(!summary.trim().is_empty(), "summary should not be empty");
}
