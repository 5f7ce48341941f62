//! Content Management API client: the read/write half used by ingestion.

use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::{debug, instrument};

use folio_shared::{
    ArtworkDraft, Asset, ContentStoreConfig, EntryRef, FolioError, PublishDefaults, Result,
    public_asset_url,
};

use crate::wire::{
    self, Collection, ManagementAsset, ManagementEntry, artwork_entry_body, check_status, decode,
};

/// Media type Contentful expects on management write requests.
const CMA_CONTENT_TYPE: &str = "application/vnd.contentful.management.v1+json";

/// Authenticated client scoped to one space/environment.
#[derive(Debug, Clone)]
pub struct ManagementClient {
    client: Client,
    base_url: String,
    space_id: String,
    environment_id: String,
    locale: String,
    token: String,
}

impl ManagementClient {
    /// Create a client. `locale` selects which localized file record of each
    /// asset is read.
    pub fn new(config: &ContentStoreConfig, locale: &str, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: wire::build_client()?,
            base_url: wire::normalize_base_url(&config.management_base_url)?,
            space_id: config.space_id.clone(),
            environment_id: config.environment_id.clone(),
            locale: locale.to_string(),
            token: token.into(),
        })
    }

    fn env_url(&self, path: &str) -> String {
        format!(
            "{}/spaces/{}/environments/{}{path}",
            self.base_url, self.space_id, self.environment_id
        )
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(&self.token)
    }

    /// Fetch one page of assets (`skip`/`limit` offset paging).
    #[instrument(skip(self))]
    pub async fn list_assets(&self, skip: usize, limit: usize) -> Result<Vec<Asset>> {
        let url = self.env_url("/assets");
        let response = self
            .authed(self.client.get(&url))
            .query(&[("limit", limit.to_string()), ("skip", skip.to_string())])
            .send()
            .await
            .map_err(|e| FolioError::Network(format!("{url}: {e}")))?;

        let response = check_status(response, "list assets").await?;
        let page: Collection<ManagementAsset> = decode(response, "list assets").await?;

        let assets: Vec<Asset> = page
            .items
            .into_iter()
            .map(|item| self.to_asset(item))
            .collect();
        debug!(count = assets.len(), "asset page fetched");
        Ok(assets)
    }

    fn to_asset(&self, item: ManagementAsset) -> Asset {
        let mut files = item.fields.file;
        let file = files.remove(&self.locale).unwrap_or_default();
        Asset {
            id: item.sys.id,
            url: public_asset_url(&file.url),
            file_name: file.file_name,
            content_type: file.content_type,
            created_at: item.sys.created_at,
        }
    }

    /// Entries of `content_type` whose `image` field links to `asset_id`.
    ///
    /// The management API also returns drafts, so an entry left unpublished
    /// by an interrupted run still counts.
    #[instrument(skip(self))]
    pub async fn entries_linking_asset(
        &self,
        content_type: &str,
        asset_id: &str,
    ) -> Result<Vec<EntryRef>> {
        let url = self.env_url("/entries");
        let response = self
            .authed(self.client.get(&url))
            .query(&[
                ("content_type", content_type),
                ("fields.image.sys.id", asset_id),
            ])
            .send()
            .await
            .map_err(|e| FolioError::Network(format!("{url}: {e}")))?;

        let response = check_status(response, "query entries").await?;
        let page: Collection<ManagementEntry> = decode(response, "query entries").await?;

        Ok(page.items.into_iter().map(entry_ref).collect())
    }

    /// Create a draft artwork entry.
    ///
    /// With `entry_id`, the entry is created under that id (`PUT`); a 409
    /// answer means it already exists and yields [`FolioError::Conflict`].
    /// Without it, the store assigns the id (`POST`).
    #[instrument(skip(self, defaults, draft), fields(asset_id = %draft.asset_id))]
    pub async fn create_entry(
        &self,
        defaults: &PublishDefaults,
        draft: &ArtworkDraft,
        entry_id: Option<&str>,
    ) -> Result<EntryRef> {
        let body = artwork_entry_body(defaults, draft);
        let payload = serde_json::to_vec(&body)
            .map_err(|e| FolioError::parse(format!("failed to serialize entry: {e}")))?;

        let (url, builder) = match entry_id {
            Some(id) => {
                let url = self.env_url(&format!("/entries/{id}"));
                let builder = self.client.put(&url);
                (url, builder)
            }
            None => {
                let url = self.env_url("/entries");
                let builder = self.client.post(&url);
                (url, builder)
            }
        };

        let response = self
            .authed(builder)
            .header("X-Contentful-Content-Type", &defaults.content_type_id)
            .header(reqwest::header::CONTENT_TYPE, CMA_CONTENT_TYPE)
            .body(payload)
            .send()
            .await
            .map_err(|e| FolioError::Network(format!("{url}: {e}")))?;

        if let Some(id) = entry_id {
            if response.status() == StatusCode::CONFLICT {
                return Err(FolioError::Conflict(id.to_string()));
            }
        }

        let response = check_status(response, "create entry").await?;
        let entry: ManagementEntry = decode(response, "create entry").await?;
        Ok(entry_ref(entry))
    }

    /// Publish a draft entry at its current version.
    #[instrument(skip(self), fields(entry_id = %entry.id))]
    pub async fn publish_entry(&self, entry: &EntryRef) -> Result<EntryRef> {
        let url = self.env_url(&format!("/entries/{}/published", entry.id));
        let response = self
            .authed(self.client.put(&url))
            .header("X-Contentful-Version", entry.version.to_string())
            .send()
            .await
            .map_err(|e| FolioError::Network(format!("{url}: {e}")))?;

        let response = check_status(response, "publish entry").await?;
        let published: ManagementEntry = decode(response, "publish entry").await?;
        Ok(entry_ref(published))
    }
}

fn entry_ref(entry: ManagementEntry) -> EntryRef {
    EntryRef {
        id: entry.sys.id,
        version: entry.sys.version.unwrap_or(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ENV_PATH: &str = "/spaces/space-1/environments/master";

    fn client_for(server: &MockServer) -> ManagementClient {
        let config = ContentStoreConfig {
            space_id: "space-1".into(),
            management_base_url: server.uri(),
            ..ContentStoreConfig::default()
        };
        ManagementClient::new(&config, "en-US", "cma-token").unwrap()
    }

    fn draft() -> ArtworkDraft {
        ArtworkDraft {
            asset_id: "asset-9".into(),
            title: "Paper Crane".into(),
            category: "Uncategorized".into(),
            description: "A folded crane in flight.".into(),
            featured: false,
        }
    }

    #[tokio::test]
    async fn list_assets_maps_localized_files() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{ENV_PATH}/assets")))
            .and(query_param("limit", "100"))
            .and(query_param("skip", "200"))
            .and(header("authorization", "Bearer cma-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total": 202,
                "skip": 200,
                "limit": 100,
                "items": [
                    {
                        "sys": { "id": "a1", "createdAt": "2024-05-01T10:00:00.000Z" },
                        "fields": { "file": { "en-US": {
                            "url": "//images.ctfassets.net/space-1/a1/fox.png",
                            "fileName": "fox.png",
                            "contentType": "image/png"
                        } } }
                    },
                    { "sys": { "id": "a2" }, "fields": {} }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let assets = client_for(&server).list_assets(200, 100).await.unwrap();

        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].id, "a1");
        assert_eq!(
            assets[0].url,
            "https://images.ctfassets.net/space-1/a1/fox.png"
        );
        assert_eq!(assets[0].file_name, "fox.png");
        assert_eq!(assets[0].content_type.as_deref(), Some("image/png"));
        assert!(assets[0].created_at.is_some());
        assert!(!assets[1].has_file());
    }

    #[tokio::test]
    async fn entries_linking_asset_filters_by_image_id() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{ENV_PATH}/entries")))
            .and(query_param("content_type", "artwork"))
            .and(query_param("fields.image.sys.id", "asset-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [ { "sys": { "id": "e1", "version": 3 } } ]
            })))
            .mount(&server)
            .await;

        let found = client_for(&server)
            .entries_linking_asset("artwork", "asset-9")
            .await
            .unwrap();

        assert_eq!(
            found,
            vec![EntryRef {
                id: "e1".into(),
                version: 3
            }]
        );
    }

    #[tokio::test]
    async fn create_entry_posts_localized_fields() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("{ENV_PATH}/entries")))
            .and(header("x-contentful-content-type", "artwork"))
            .and(header("content-type", CMA_CONTENT_TYPE))
            .and(body_partial_json(serde_json::json!({
                "fields": {
                    "title": { "en-US": "Paper Crane" },
                    "category": { "en-US": "Uncategorized" },
                    "featured": { "en-US": false },
                    "image": { "en-US": { "sys": { "type": "Link", "linkType": "Asset", "id": "asset-9" } } }
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "sys": { "id": "e-new", "version": 1 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let entry = client_for(&server)
            .create_entry(&PublishDefaults::default(), &draft(), None)
            .await
            .unwrap();

        assert_eq!(entry.id, "e-new");
        assert_eq!(entry.version, 1);
    }

    #[tokio::test]
    async fn create_entry_with_id_conflict() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(format!("{ENV_PATH}/entries/art-abc")))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "sys": { "type": "Error", "id": "VersionMismatch" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_entry(&PublishDefaults::default(), &draft(), Some("art-abc"))
            .await
            .unwrap_err();

        assert!(matches!(err, FolioError::Conflict(ref id) if id == "art-abc"));
    }

    #[tokio::test]
    async fn publish_sends_current_version() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(format!("{ENV_PATH}/entries/e-new/published")))
            .and(header("x-contentful-version", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sys": { "id": "e-new", "version": 2 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let published = client_for(&server)
            .publish_entry(&EntryRef {
                id: "e-new".into(),
                version: 1,
            })
            .await
            .unwrap();

        assert_eq!(published.version, 2);
    }

    #[tokio::test]
    async fn store_errors_carry_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{ENV_PATH}/assets")))
            .respond_with(ResponseTemplate::new(401).set_body_string("AccessTokenInvalid"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_assets(0, 100).await.unwrap_err();
        match err {
            FolioError::ContentStore { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("AccessTokenInvalid"));
            }
            other => panic!("expected ContentStore error, got {other:?}"),
        }
    }
}
