use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::products::Product;

/// Public product listing page.
pub fn listing(products: &[Product]) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Shop" }
                style { (PreEscaped(SHOP_CSS)) }
            }
            body {
                header class="shop-header" {
                    h1 { "Shop" }
                }
                main class="product-grid" {
                    @if products.is_empty() {
                        p class="empty" { em { "Nothing for sale yet — check back soon." } }
                    }
                    @for product in products {
                        article class="product-card" {
                            @if let Some(img) = &product.image_path {
                                img src=(img) alt=(product.description) loading="lazy";
                            } @else {
                                div class="no-image" { "No image" }
                            }
                            p { (product.description) }
                        }
                    }
                }
            }
        }
    }
}

const SHOP_CSS: &str = r#"
*, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }

:root {
  --bg:      #faf8f4;
  --surface: #ffffff;
  --border:  #e4dfd5;
  --text:    #2c2a26;
  --muted:   #8d8778;
}

body {
  font-family: Georgia, 'Times New Roman', serif;
  background: var(--bg);
  color: var(--text);
  -webkit-font-smoothing: antialiased;
}

.shop-header {
  padding: 2rem 1.5rem 1rem;
  border-bottom: 1px solid var(--border);
}
.shop-header h1 { font-size: 1.6rem; letter-spacing: -0.02em; }

.product-grid {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(240px, 1fr));
  gap: 1.25rem;
  padding: 1.5rem;
  max-width: 1100px;
  margin: 0 auto;
}

.product-card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: 10px;
  overflow: hidden;
}
.product-card img {
  display: block;
  width: 100%;
  aspect-ratio: 4 / 3;
  object-fit: cover;
}
.product-card .no-image {
  display: flex;
  align-items: center;
  justify-content: center;
  aspect-ratio: 4 / 3;
  background: var(--bg);
  color: var(--muted);
  font-size: 0.85rem;
}
.product-card p { padding: 0.875rem 1rem; }

.empty { padding: 2rem 0; color: var(--muted); }
"#;
