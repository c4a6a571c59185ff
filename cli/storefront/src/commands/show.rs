use anyhow::Result;
use bpaf::Bpaf;
use indoc::formatdoc;
use serde::Serialize;
use storefront_sdk::models::presentation::{Priority, StockStatus};
use storefront_sdk::models::products::get_product;
use storefront_sdk::providers::catalog::{Client, Product};
use tracing::instrument;

// Show details of a single product
#[derive(Debug, Bpaf, Clone)]
pub struct Show {
    /// Display the product as JSON
    #[bpaf(long)]
    pub json: bool,

    /// Id of the product to show
    #[bpaf(positional("id"))]
    pub id: u64,
}

#[derive(Debug, Serialize)]
struct JsonProduct<'a> {
    #[serde(flatten)]
    product: &'a Product,
    stock_status: StockStatus,
    priority: Priority,
}

impl Show {
    #[instrument(name = "show", skip_all, fields(id = self.id))]
    pub async fn handle(self, client: &Client) -> Result<()> {
        let product = get_product(client, self.id).await?;

        if self.json {
            let json = JsonProduct {
                product: &product,
                stock_status: StockStatus::of(&product),
                priority: Priority::of(&product),
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        } else {
            print!("{}", render_details(&product));
        }
        Ok(())
    }
}

fn render_details(product: &Product) -> String {
    let description = if product.description.is_empty() {
        "No description available."
    } else {
        product.description.as_str()
    };
    let images = if product.images.is_empty() {
        "  (none)".to_string()
    } else {
        product
            .images
            .iter()
            .map(|image| format!("  {image}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    formatdoc! {"
        {title}
        Category:    {category}
        Price:       ${price:.2} ({priority} priority)

        {description}

        Product ID:  {id}
        Inventory:   {stock}
        Images:
        {images}
        ",
        title = product.title,
        category = product.category.name,
        price = product.price,
        priority = Priority::of(product),
        id = product.id,
        stock = StockStatus::of(product),
    }
}
