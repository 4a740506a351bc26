use crate::{
    ClientConfig, OneClient, OneConnection, OneError, OnePassword, OneUrl, OneUsername,
    VmSelector,
    tests::fixtures::{one_response, pool_xml, vm_xml},
};
use chrono::Utc;
use std::time::{Duration, Instant};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, method, path},
};

fn create_test_connection(server_url: &str) -> OneConnection {
    OneConnection::new(
        OneUrl::new_unchecked(&format!("{}/RPC2", server_url)),
        OneUsername::new_unchecked("oneadmin".to_string()),
        OnePassword::new_unchecked("opennebula".to_string()),
    )
}

fn create_client(mock_server: &MockServer) -> OneClient {
    OneClient::with_connection(
        create_test_connection(&mock_server.uri()),
        ClientConfig::default(),
    )
    .unwrap()
}

async fn mount_pool(mock_server: &MockServer, vms: &[(u32, &str)]) {
    Mock::given(method("POST"))
        .and(path("/RPC2"))
        .and(body_string_contains("one.vmpool.info"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(one_response(true, &pool_xml(vms), 0)),
        )
        .expect(1)
        .mount(mock_server)
        .await;
}

async fn mount_detail(mock_server: &MockServer, id: u32, body: String, times: u64) {
    Mock::given(method("POST"))
        .and(path("/RPC2"))
        .and(body_string_contains("one.vm.info"))
        .and(body_string_contains(format!("<i4>{}</i4>", id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(one_response(true, &body, 0)))
        .expect(times)
        .mount(mock_server)
        .await;
}

async fn mount_delayed_detail(mock_server: &MockServer, id: u32, body: String, delay: Duration) {
    Mock::given(method("POST"))
        .and(path("/RPC2"))
        .and(body_string_contains("one.vm.info"))
        .and(body_string_contains(format!("<i4>{}</i4>", id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(one_response(true, &body, 0))
                .set_delay(delay),
        )
        .expect(1)
        .mount(mock_server)
        .await;
}

fn hours_ago(hours: i64) -> i64 {
    Utc::now().timestamp() - hours * 3600 - 60
}

#[tokio::test]
async fn test_vm_facts_all() {
    let mock_server = MockServer::start().await;
    let client = create_client(&mock_server);

    mount_pool(&mock_server, &[(7, "web-1"), (3, "db-1")]).await;
    mount_detail(&mock_server, 7, vm_xml(7, "web-1", 3, 3, hours_ago(26)), 1).await;
    mount_detail(&mock_server, 3, vm_xml(3, "db-1", 8, 0, hours_ago(1)), 1).await;

    let response = client.vm_facts(&VmSelector::All).await.unwrap();
    assert_eq!(response.vms.len(), 2);

    let web = &response.vms[0];
    assert_eq!(web.id, 7);
    assert_eq!(web.name, "web-1");
    assert_eq!(web.state, "ACTIVE");
    assert_eq!(web.lcm_state, Some("RUNNING"));
    assert_eq!(web.owner_id, 143);
    assert_eq!(web.owner_name, "ansible-test");
    assert_eq!(web.group_id, 1);
    assert_eq!(web.group_name, "one-users");
    assert_eq!(web.disk_size, "8192 MB");
    assert_eq!(web.memory, "2048 MB");
    assert_eq!(web.vcpu.as_deref(), Some("2"));
    assert_eq!(web.cpu, "1");
    assert_eq!(web.uptime_h, 26);
    assert_eq!(web.mode, "600");
    assert_eq!(web.labels, vec!["app", "prod"]);
    assert_eq!(web.attributes["HYPERVISOR"], "kvm");
    assert_eq!(web.networks.len(), 1);
    assert_eq!(web.networks[0].ip.as_deref(), Some("192.168.150.7"));
    assert_eq!(web.networks[0].name.as_deref(), Some("public"));

    let db = &response.vms[1];
    assert_eq!(db.state, "POWEROFF");
    assert_eq!(db.lcm_state, None);
    assert_eq!(db.uptime_h, 1);
}

#[tokio::test]
async fn test_vm_facts_json_payload() {
    let mock_server = MockServer::start().await;
    let client = create_client(&mock_server);

    mount_pool(&mock_server, &[(1, "stopped-vm")]).await;
    mount_detail(&mock_server, 1, vm_xml(1, "stopped-vm", 4, 3, hours_ago(0)), 1).await;

    let response = client.vm_facts(&VmSelector::All).await.unwrap();
    let json = serde_json::to_value(&response).unwrap();

    let root = json.as_object().unwrap();
    assert_eq!(root.len(), 1);
    assert_eq!(json["vms"][0]["state"], "STOPPED");
    assert!(json["vms"][0]["lcm_state"].is_null());
    assert_eq!(json["vms"][0]["mode"], "600");
    assert_eq!(json["vms"][0]["uptime_h"], 0);
}

#[tokio::test]
async fn test_vm_facts_keep_pool_order_when_details_finish_out_of_order() {
    let mock_server = MockServer::start().await;
    let client = create_client(&mock_server);

    mount_pool(&mock_server, &[(1, "slow"), (2, "medium"), (3, "fast")]).await;
    mount_delayed_detail(
        &mock_server,
        1,
        vm_xml(1, "slow", 3, 3, hours_ago(1)),
        Duration::from_millis(500),
    )
    .await;
    mount_delayed_detail(
        &mock_server,
        2,
        vm_xml(2, "medium", 3, 3, hours_ago(1)),
        Duration::from_millis(300),
    )
    .await;
    mount_detail(&mock_server, 3, vm_xml(3, "fast", 3, 3, hours_ago(1)), 1).await;

    let start = Instant::now();
    let response = client.vm_facts(&VmSelector::All).await.unwrap();
    let elapsed = start.elapsed();

    let names: Vec<&str> = response.vms.iter().map(|vm| vm.name.as_str()).collect();
    assert_eq!(names, vec!["slow", "medium", "fast"]);
    // Sequential fetches would take at least 800ms.
    assert!(elapsed < Duration::from_millis(750), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_vm_facts_by_ids() {
    let mock_server = MockServer::start().await;
    let client = create_client(&mock_server);

    mount_pool(&mock_server, &[(1, "a"), (2, "b"), (3, "c")]).await;
    mount_detail(&mock_server, 3, vm_xml(3, "c", 3, 3, hours_ago(2)), 1).await;
    mount_detail(&mock_server, 1, vm_xml(1, "a", 3, 3, hours_ago(2)), 1).await;
    mount_detail(&mock_server, 2, vm_xml(2, "b", 3, 3, hours_ago(2)), 0).await;

    let selector =
        VmSelector::from_params(Some(vec!["3".to_string(), "1".to_string()]), None).unwrap();
    let response = client.vm_facts(&selector).await.unwrap();

    let ids: Vec<u32> = response.vms.iter().map(|vm| vm.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn test_vm_facts_by_ids_not_found() {
    let mock_server = MockServer::start().await;
    let client = create_client(&mock_server);

    mount_pool(&mock_server, &[(1, "a")]).await;
    mount_detail(&mock_server, 1, vm_xml(1, "a", 3, 3, hours_ago(2)), 0).await;

    let selector = VmSelector::from_params(
        Some(vec!["1".to_string(), "40".to_string(), "41".to_string()]),
        None,
    )
    .unwrap();
    let result = client.vm_facts(&selector).await;

    match result {
        Err(OneError::NotFound(msg)) => assert_eq!(msg, "There is no VM(s) with id(s)=40, 41"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_vm_facts_by_exact_name() {
    let mock_server = MockServer::start().await;
    let client = create_client(&mock_server);

    mount_pool(&mock_server, &[(1, "twin"), (2, "twin")]).await;
    mount_detail(&mock_server, 1, vm_xml(1, "twin", 3, 3, hours_ago(2)), 1).await;
    mount_detail(&mock_server, 2, vm_xml(2, "twin", 3, 3, hours_ago(2)), 0).await;

    let selector = VmSelector::from_params(None, Some("twin".to_string())).unwrap();
    let response = client.vm_facts(&selector).await.unwrap();
    assert_eq!(response.vms.len(), 1);
    assert_eq!(response.vms[0].id, 1);
}

#[tokio::test]
async fn test_vm_facts_by_exact_name_not_found() {
    let mock_server = MockServer::start().await;
    let client = create_client(&mock_server);

    mount_pool(&mock_server, &[(1, "a")]).await;

    let selector = VmSelector::from_params(None, Some("missing".to_string())).unwrap();
    let result = client.vm_facts(&selector).await;
    assert!(matches!(result, Err(OneError::NotFound(msg)) if msg == "There is no VM with name=missing"));
}

#[tokio::test]
async fn test_vm_facts_by_case_insensitive_pattern() {
    let mock_server = MockServer::start().await;
    let client = create_client(&mock_server);

    mount_pool(
        &mock_server,
        &[(1, "Foo1"), (2, "FOO2"), (3, "foo3"), (4, "barfoo")],
    )
    .await;
    for (id, name) in [(1, "Foo1"), (2, "FOO2"), (3, "foo3")] {
        mount_detail(&mock_server, id, vm_xml(id, name, 3, 3, hours_ago(1)), 1).await;
    }

    let selector = VmSelector::from_params(None, Some("~*foo.*".to_string())).unwrap();
    let response = client.vm_facts(&selector).await.unwrap();

    let names: Vec<&str> = response.vms.iter().map(|vm| vm.name.as_str()).collect();
    assert_eq!(names, vec!["Foo1", "FOO2", "foo3"]);
}

#[tokio::test]
async fn test_vm_facts_pattern_without_matches() {
    let mock_server = MockServer::start().await;
    let client = create_client(&mock_server);

    mount_pool(&mock_server, &[(1, "Foo1")]).await;

    let selector = VmSelector::from_params(None, Some("~foo.*".to_string())).unwrap();
    let response = client.vm_facts(&selector).await.unwrap();
    assert!(response.vms.is_empty());
}

#[tokio::test]
async fn test_vm_facts_authentication_failure() {
    let mock_server = MockServer::start().await;
    let client = create_client(&mock_server);

    Mock::given(method("POST"))
        .and(path("/RPC2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(one_response(
            false,
            "[one.vmpool.info] User couldn't be authenticated, aborting call.",
            256,
        )))
        .mount(&mock_server)
        .await;

    let result = client.vm_facts(&VmSelector::All).await;
    match result {
        Err(OneError::RemoteService(msg)) => assert!(msg.contains("authenticated")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_vm_facts_malformed_detail() {
    let mock_server = MockServer::start().await;
    let client = create_client(&mock_server);

    mount_pool(&mock_server, &[(1, "a")]).await;
    mount_detail(&mock_server, 1, "<VM><ID>1</ID></VM>".to_string(), 1).await;

    let result = client.vm_facts(&VmSelector::All).await;
    assert!(matches!(result, Err(OneError::Parse(_))));
}

#[tokio::test]
async fn test_vms_lists_pool() {
    let mock_server = MockServer::start().await;
    let client = create_client(&mock_server);

    mount_pool(&mock_server, &[(5, "x"), (6, "y")]).await;

    let pool = client.vms().await.unwrap();
    assert_eq!(pool.len(), 2);
    assert_eq!(pool[0].name, "x");
}

#[tokio::test]
async fn test_vm_detail_single() {
    let mock_server = MockServer::start().await;
    let client = create_client(&mock_server);

    mount_detail(&mock_server, 9, vm_xml(9, "solo", 5, 0, hours_ago(3)), 1).await;

    let detail = client.vm_detail(9).await.unwrap();
    assert_eq!(detail.name, "solo");
    assert_eq!(detail.state, 5);
    assert_eq!(detail.permissions.mode(), "600");
}
