mod common;

use anyhow::Result;
use common::{TestServer, SECRET};
use crm_edge::client::{ClientError, EdgeClient};
use secrecy::SecretString;
use serde_json::json;

#[tokio::test]
async fn client_signs_and_unwraps_replies() -> Result<()> {
    let server = TestServer::start().await?;
    let client = EdgeClient::new(server.base_url.as_str(), SecretString::from(SECRET))?;

    let reply = client
        .call("users.create", &json!({"id": "u1", "username": "ann", "name": "Ann"}))
        .await?;
    assert_eq!(reply["ok"], true);
    assert_eq!(reply["user"]["id"], "u1");

    let reply = client.call("sql/users.list", &json!({"q": "ann"})).await?;
    assert_eq!(reply["meta"]["total"], 1);

    let health = client.health().await?;
    assert_eq!(health["status"], "healthy");
    Ok(())
}

#[tokio::test]
async fn client_maps_failure_envelopes() -> Result<()> {
    let server = TestServer::start().await?;

    let client = EdgeClient::new(server.base_url.as_str(), SecretString::from("wrong-secret"))?;
    match client.call("users.list", &json!({})).await {
        Err(ClientError::Api { code, status, .. }) => {
            assert_eq!(code, "INVALID_SIGNATURE");
            assert_eq!(status, 401);
        }
        other => panic!("expected api error, got {:?}", other),
    }

    let client = EdgeClient::new(server.base_url.as_str(), SecretString::from(SECRET))?;
    match client.call("users.delete", &json!({"id": "ghost"})).await {
        Err(ClientError::Api { code, status, .. }) => {
            assert_eq!(code, "NOT_FOUND");
            assert_eq!(status, 404);
        }
        other => panic!("expected api error, got {:?}", other),
    }
    Ok(())
}
