use std::sync::Arc;

use qadesk_core::parse_document;
use qadesk_engine::{NO_MATCH_MESSAGE, QaService, ResponseKind};
use qadesk_journal::{Journals, LogRecord, MemorySink};

const DOCUMENT: &str = r#"Question: Why is `https://api.example.com/user/101` returning 403 Forbidden?
Answer: Access is denied for this account. Sample response:

https://api.example.com/user/101
{
    "ID": 101,
    "Name": "Alice",
    "Contact": "9876543210"
}
---
Question: What causes `https://api.example.com/login` to return 401?
Answer: Invalid credentials. Example:

https://api.example.com/login
{
    "error": "Invalid email or password",
    "status": 401
}
"#;

fn service(audit: Arc<MemorySink>, feedback: Arc<MemorySink>) -> QaService {
    let dataset = parse_document(DOCUMENT);
    assert_eq!(dataset.len(), 2);

    let journals = Journals::new(audit, Arc::new(MemorySink::new()), feedback);
    QaService::new(dataset, journals).unwrap()
}

#[test]
fn test_answer_masks_url_and_record() {
    let audit = Arc::new(MemorySink::new());
    let service = service(audit.clone(), Arc::new(MemorySink::new()));

    let response = service.respond("why is the user endpoint returning 403 forbidden");

    assert_eq!(response.kind, ResponseKind::Answered);
    assert_eq!(response.index, Some(0));
    let text = response.text;
    assert!(text.contains("xxxxx://xxx.xxxxxxx.xxx/xxxx/xxx"));
    assert!(text.contains(r#""ID": "X""#));
    assert!(text.contains(r#""Name": "XXX""#));
    assert!(text.contains(r#""Contact": "9XXXXXX210""#));
    assert!(!text.contains("Alice"));
    assert!(!text.contains("9876543210"));
    assert!(!text.contains("api.example.com"));
    assert_eq!(audit.len(), 1);
}

/// The single JSON record embedded in an answer
fn embedded_record(text: &str) -> serde_json::Value {
    let start = text.find('{').unwrap();
    let end = text.rfind('}').unwrap();
    serde_json::from_str(&text[start..=end]).unwrap()
}

#[test]
fn test_masked_records_stay_valid_json() {
    let service = service(Arc::new(MemorySink::new()), Arc::new(MemorySink::new()));

    let first = service.respond("why is the user endpoint returning 403 forbidden");
    let record = embedded_record(&first.text);
    assert_eq!(record["ID"], "X");
    assert_eq!(record["Contact"], "9XXXXXX210");

    let second = service.respond("what causes login to return 401");
    assert_eq!(second.index, Some(1));
    assert!(second.text.contains("xxxxx://xxx.xxxxxxx.xxx/xxxxx"));
    assert!(second.text.contains(r#""status": "***""#));
    let record = embedded_record(&second.text);
    assert_eq!(record["error"], "Invalid email or password");
    assert_eq!(record["status"], "***");
}

#[test]
fn test_unrelated_query_gets_fallback() {
    let audit = Arc::new(MemorySink::new());
    let service = service(audit.clone(), Arc::new(MemorySink::new()));

    assert_eq!(service.answer("weather tomorrow"), NO_MATCH_MESSAGE);
    assert_eq!(service.answer(""), NO_MATCH_MESSAGE);
    assert_eq!(audit.len(), 2);
}

#[test]
fn test_journals_never_hold_raw_urls() {
    let audit = Arc::new(MemorySink::new());
    let feedback = Arc::new(MemorySink::new());
    let service = service(audit.clone(), feedback.clone());

    let query = "Why is https://api.example.com/user/101 returning 403?";
    service.answer(query);
    service.record_feedback(query, "helpful").unwrap();

    for record in audit.records().into_iter().chain(feedback.records()) {
        let line = record.to_string();
        assert!(!line.contains("api.example.com"), "leaked url in {line}");
    }
    assert!(matches!(
        &feedback.records()[0],
        LogRecord::Feedback { feedback, .. } if feedback == "helpful"
    ));
}

#[test]
fn test_concurrent_queries() {
    let audit = Arc::new(MemorySink::new());
    let service = Arc::new(service(audit.clone(), Arc::new(MemorySink::new())));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || {
                for _ in 0..25 {
                    let response = service.respond("403 forbidden user");
                    assert_eq!(response.index, Some(0));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(audit.len(), 100);
}
