use anyhow::Result;
use bpaf::Bpaf;
use storefront_sdk::models::products::get_category_names;
use storefront_sdk::providers::catalog::Client;
use tracing::instrument;

use crate::utils::message;

// List the names of all categories
#[derive(Debug, Bpaf, Clone)]
pub struct Categories {
    /// Display the category names as a JSON array
    #[bpaf(long)]
    pub json: bool,
}

impl Categories {
    #[instrument(name = "categories", skip_all)]
    pub async fn handle(self, client: &Client) -> Result<()> {
        let names = get_category_names(client).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&names)?);
        } else if names.is_empty() {
            message::plain("No categories found.");
        } else {
            println!("{}", names.join("\n"));
        }
        Ok(())
    }
}
