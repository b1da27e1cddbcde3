use gwc_telemetry::{
    metrics, new_request_ids, record_deploy_latency_ms, record_deploy_success,
    record_rows_written,
};

#[test]
fn request_ids_non_empty() {
    let ids = new_request_ids();
    assert!(!ids.request_id.is_empty());
    assert!(!ids.trace_id.is_empty());
    assert_ne!(ids.request_id, ids.trace_id);
}

#[test]
fn deploy_counters_accumulate() {
    let before = metrics().snapshot();
    record_deploy_success();
    record_rows_written(7);
    record_deploy_latency_ms(12);
    let after = metrics().snapshot();
    assert!(after.deploy_success > before.deploy_success);
    assert!(after.rows_written >= before.rows_written + 7);
    assert!(after.deploy_latency_ms_count > before.deploy_latency_ms_count);
}
