mod common;

use anyhow::Result;
use common::TestServer;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn create_user(server: &TestServer, id: &str, username: &str, name: &str, role: &str) -> Result<Value> {
    let (status, body) = server
        .call(
            "users.create",
            json!({ "id": id, "username": username, "name": name, "role": role, "password": "hash" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    Ok(body["user"].clone())
}

#[tokio::test]
async fn user_lifecycle() -> Result<()> {
    let server = TestServer::start().await?;

    let user = create_user(&server, "u1", "ann", "Ann Admin", "admin").await?;
    assert_eq!(user["username"], "ann");
    assert_eq!(user["status"], "active");
    assert!(user.get("password").is_none());

    // Login lookup returns the full row
    let (_, body) = server.call("users.get_by_username", json!({"username": "ann"})).await?;
    assert_eq!(body["user"]["password"], "hash");

    let (_, body) = server.call("users.get_by_username", json!({"username": "nobody"})).await?;
    assert_eq!(body["ok"], true);
    assert_eq!(body["user"], Value::Null);

    let (status, body) = server
        .call("users.update", json!({"id": "u1", "status": "inactive", "password": "new"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["status"], "inactive");
    assert!(body["user"]["updated_at"].is_string());
    assert!(body["user"].get("password").is_none());

    let (_, body) = server.call("users.get_by_id", json!({"id": "u1"})).await?;
    assert_eq!(body["user"]["password"], "new");

    let (status, body) = server.call("users.delete", json!({"id": "u1"})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "deleted": true}));

    let (status, body) = server.call("users.delete", json!({"id": "u1"})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn user_validation_and_conflicts() -> Result<()> {
    let server = TestServer::start().await?;
    create_user(&server, "u1", "ann", "Ann", "admin").await?;

    let (status, body) = server.call("users.create", json!({"username": "ann", "name": "Other Ann"})).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, body) = server.call("users.create", json!({"name": "No Username"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = server
        .call("users.create", json!({"username": "root", "name": "Root", "role": "superuser"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server.call("users.update", json!({"status": "inactive"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server.call("users.update", json!({"id": "ghost", "name": "X"})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn generated_ids_are_uuids() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, body) = server.call("users.create", json!({"username": "bob", "name": "Bob"})).await?;
    let id = body["user"]["id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
    Ok(())
}

#[tokio::test]
async fn user_list_filters_and_pages() -> Result<()> {
    let server = TestServer::start().await?;
    create_user(&server, "u1", "ann", "Ann Admin", "admin").await?;
    create_user(&server, "u2", "bob", "Bob Builder", "employee").await?;
    create_user(&server, "u3", "cat", "Cat Carter", "employee").await?;

    let (status, body) = server.call("users.list", json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"], json!({"total": 3, "page": 1, "page_size": 50, "total_pages": 1}));
    assert!(body["users"][0].get("password").is_none());

    let (_, body) = server.call("users.list", json!({"role": "employee", "sort": "username", "sort_order": "asc"})).await?;
    let names: Vec<&str> = body["users"].as_array().unwrap().iter().map(|u| u["username"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["bob", "cat"]);

    let (_, body) = server.call("users.list", json!({"q": "build"})).await?;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["users"][0]["id"], "u2");

    let (_, body) = server
        .call("users.list", json!({"page": 2, "page_size": 2, "sort": "username", "sort_order": "asc"}))
        .await?;
    assert_eq!(body["meta"], json!({"total": 3, "page": 2, "page_size": 2, "total_pages": 2}));
    assert_eq!(body["users"].as_array().unwrap().len(), 1);
    assert_eq!(body["users"][0]["username"], "cat");

    // Unknown sort columns fall back to created_at; unknown keys are ignored
    let (status, body) = server
        .call("users.list", json!({"sort": "password", "password": "hash"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 3);

    let bad_filters = [
        json!({"page": 0}),
        json!({"page": i64::MAX, "page_size": 100}),
        json!({"page_size": 101}),
        json!({"role": "root"}),
        json!({"sort_order": "sideways"}),
    ];
    for bad in bad_filters {
        let (status, body) = server.call("users.list", bad.clone()).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "filters: {}", bad);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
    Ok(())
}

#[tokio::test]
async fn leads_join_owner_and_assignee() -> Result<()> {
    let server = TestServer::start().await?;
    create_user(&server, "u1", "ann", "Ann", "admin").await?;
    create_user(&server, "u2", "bob", "Bob", "employee").await?;

    let (status, body) = server
        .call(
            "leads.create",
            json!({
                "id": "l1",
                "client_company": "Acme Corp",
                "city": "Pune",
                "budget": 2500000.5,
                "owner_id": "u1",
                "assignee_id": "u2",
                "deal_closed": "No",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["lead"]["owner_name"], "Ann");
    assert_eq!(body["lead"]["assignee_name"], "Bob");
    assert_eq!(body["lead"]["budget"], 2500000.5);
    assert_eq!(body["lead"]["site_visit_required"], "No");

    server
        .call("leads.create", json!({"id": "l2", "client_company": "Globex", "city": "Mumbai", "owner_id": "u2"}))
        .await?;

    let (_, body) = server.call("leads.list", json!({"owner_or_assignee_id": "u2"})).await?;
    assert_eq!(body["meta"]["total"], 2);

    let (_, body) = server.call("leads.list", json!({"owner_or_assignee_id": "u1"})).await?;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["leads"][0]["id"], "l1");

    let (_, body) = server.call("leads.list", json!({"q": "glob"})).await?;
    assert_eq!(body["leads"][0]["id"], "l2");

    let (status, _) = server.call("leads.list", json!({"deal_closed": "Maybe"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server.call("leads.update", json!({"id": "l2", "deal_closed": "Yes"})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lead"]["deal_closed"], "Yes");
    assert_eq!(body["lead"]["owner_name"], "Bob");

    let (_, body) = server.call("leads.get_by_id", json!({"id": "missing"})).await?;
    assert_eq!(body["lead"], Value::Null);

    let (status, _) = server.call("leads.delete", json!({"id": "l1"})).await?;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = server.call("leads.list", json!({})).await?;
    assert_eq!(body["meta"]["total"], 1);
    Ok(())
}

#[tokio::test]
async fn pending_action_review_flow() -> Result<()> {
    let server = TestServer::start().await?;
    create_user(&server, "emp", "bob", "Bob", "employee").await?;
    create_user(&server, "adm", "ann", "Ann", "admin").await?;

    let (status, body) = server
        .call(
            "pending_actions.create",
            json!({
                "id": "pa1",
                "module": "leads",
                "type": "delete",
                "target_id": "l9",
                "data": {"client_company": "Acme", "reason": "duplicate"},
                "requested_by": "emp",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Pending action created");

    let (_, body) = server.call("pending_actions.get_by_id", json!({"id": "pa1"})).await?;
    let action = &body["pending_action"];
    assert_eq!(action["status"], "pending");
    assert_eq!(action["data"], json!({"client_company": "Acme", "reason": "duplicate"}));
    assert_eq!(action["requested_by_name"], "Bob");
    assert_eq!(action["approved_by_name"], Value::Null);

    let (status, _) = server
        .call("pending_actions.update", json!({"id": "pa1", "status": "done"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server
        .call(
            "pending_actions.update",
            json!({"id": "pa1", "status": "approved", "approved_by": "adm", "admin_notes": "ok"}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pending_action"]["status"], "approved");
    assert_eq!(body["pending_action"]["approved_by_name"], "Ann");
    assert_eq!(body["pending_action"]["admin_notes"], "ok");

    let (_, body) = server.call("pending_actions.list", json!({"status": "approved"})).await?;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["pending_actions"][0]["data"]["reason"], "duplicate");

    let (_, body) = server.call("pending_actions.list", json!({"status": "pending"})).await?;
    assert_eq!(body["meta"]["total"], 0);

    let (status, _) = server.call("pending_actions.create", json!({"module": "leads"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server.call("pending_actions.delete", json!({"id": "pa1"})).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.call("pending_actions.delete", json!({"id": "pa1"})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn documents_are_scoped_to_entities() -> Result<()> {
    let server = TestServer::start().await?;
    create_user(&server, "u1", "ann", "Ann", "admin").await?;

    for (id, entity, entity_id) in [("d1", "lead", "l1"), ("d2", "lead", "l1"), ("d3", "project", "p1")] {
        let (status, body) = server
            .call(
                "documents.create",
                json!({
                    "id": id,
                    "entity": entity,
                    "entity_id": entity_id,
                    "filename": format!("{}.pdf", id),
                    "file_size": 1024,
                    "uploaded_by": "u1",
                }),
            )
            .await?;
        assert_eq!(status, StatusCode::OK, "body: {}", body);
        assert_eq!(body["document"]["uploaded_by_name"], "Ann");
        assert_eq!(body["document"]["file_size"], 1024);
    }

    let (_, body) = server.call("documents.list", json!({"entity": "lead", "entity_id": "l1"})).await?;
    assert_eq!(body["meta"], json!({"total": 2, "page": 1, "page_size": 50}));

    let (_, body) = server.call("documents.list", json!({"id": "d3"})).await?;
    assert_eq!(body["documents"][0]["entity"], "project");

    let (status, _) = server.call("documents.create", json!({"entity": "lead"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server.call("documents.delete", json!({"id": "d1"})).await?;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = server.call("documents.list", json!({})).await?;
    assert_eq!(body["meta"]["total"], 2);
    Ok(())
}
