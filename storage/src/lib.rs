//storage holds the MongoDB schema & async CRUD for generated landscapes

pub mod models;

use crate::models::{LandscapeDoc, seed_key};
use bson::doc;
use futures_util::stream::TryStreamExt;
use mongodb::{Client, Collection, IndexModel, options::ClientOptions};
use tracing::debug;

pub struct LandscapeStore {
    col: Collection<LandscapeDoc>,
}

impl LandscapeStore {
    // Connect and make sure the (name, seed) index exists
    pub async fn init(uri: &str, db_name: &str, col_name: &str) -> mongodb::error::Result<Self> {
        let mut opts = ClientOptions::parse(uri).await?;
        opts.app_name = Some("nlm".to_string());
        let client = Client::with_options(opts)?;
        let col = client.database(db_name).collection(col_name);

        let index_model = IndexModel::builder()
            .keys(doc! { "name": 1, "seed": 1 })
            .build();
        col.create_index(index_model).await?;
        debug!(db = db_name, collection = col_name, "landscape store ready");

        Ok(Self { col })
    }

    pub async fn list_names(&self) -> mongodb::error::Result<Vec<String>> {
        let mut cursor = self.col.find(doc! {}).await?;
        let mut names = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            names.push(doc.name);
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    pub async fn read_by_name(&self, name: &str) -> mongodb::error::Result<Option<LandscapeDoc>> {
        self.col.find_one(doc! { "name": name }).await
    }

    // Store a landscape, replacing any earlier one with the same name and seed
    pub async fn create(&self, doc_obj: LandscapeDoc) -> mongodb::error::Result<()> {
        let filter = doc! { "name": &doc_obj.name, "seed": doc_obj.seed };
        let removed = self.col.delete_many(filter).await?;
        debug!(
            name = %doc_obj.name,
            replaced = removed.deleted_count,
            "storing landscape"
        );
        self.col.insert_one(doc_obj).await?;
        Ok(())
    }

    pub async fn read_by_seed(&self, seed: u64) -> mongodb::error::Result<Option<LandscapeDoc>> {
        self.col.find_one(doc! { "seed": seed_key(seed) }).await
    }

    // Delete every landscape generated from `seed` (clean-up)
    pub async fn delete_by_seed(&self, seed: u64) -> mongodb::error::Result<u64> {
        let result = self.col.delete_many(doc! { "seed": seed_key(seed) }).await?;
        Ok(result.deleted_count)
    }
}
