use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};

use super::error::{MongoDaoError, MongoResult};

/// Server selection bound applied when the URI does not set one.
const DEFAULT_SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a client and check with a single ping that the server answers.
///
/// Retrying is left to the storage supervisor.
pub async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(bounded_options(options))
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    database
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|source| MongoDaoError::InitialPing { source })?;

    Ok((client, database))
}

fn bounded_options(options: &ClientOptions) -> ClientOptions {
    let mut options = options.clone();
    options
        .server_selection_timeout
        .get_or_insert(DEFAULT_SERVER_SELECTION_TIMEOUT);
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn server_selection_gets_a_short_default() {
        let options = ClientOptions::parse("mongodb://localhost:27017")
            .await
            .unwrap();
        assert_eq!(
            bounded_options(&options).server_selection_timeout,
            Some(DEFAULT_SERVER_SELECTION_TIMEOUT)
        );
    }

    #[tokio::test]
    async fn explicit_server_selection_timeout_is_kept() {
        let options = ClientOptions::parse("mongodb://localhost:27017/?serverSelectionTimeoutMS=1500")
            .await
            .unwrap();
        assert_eq!(
            bounded_options(&options).server_selection_timeout,
            Some(Duration::from_millis(1_500))
        );
    }
}
